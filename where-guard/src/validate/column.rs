//! Identifier validation for names the builder splices verbatim.

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Validate that a string is a safe SQL identifier.
///
/// A valid SQL identifier:
/// - Starts with a letter (a-z, A-Z) or underscore
/// - Contains only letters, digits (0-9), and underscores
/// - Is not empty and not longer than 63 characters
///
/// # Examples
///
/// ```
/// use where_guard::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("orders"));
/// assert!(is_valid_sql_identifier("_private"));
///
/// assert!(!is_valid_sql_identifier(""));
/// assert!(!is_valid_sql_identifier("123abc"));
/// assert!(!is_valid_sql_identifier("shop.orders")); // use is_valid_qualified_identifier
/// assert!(!is_valid_sql_identifier("orders; DROP"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a possibly schema-qualified name such as `shop.orders`.
///
/// Every `.`-separated segment must pass [`is_valid_sql_identifier`].
///
/// ```
/// use where_guard::is_valid_qualified_identifier;
///
/// assert!(is_valid_qualified_identifier("shop.orders"));
/// assert!(is_valid_qualified_identifier("orders"));
/// assert!(!is_valid_qualified_identifier("shop..orders"));
/// assert!(!is_valid_qualified_identifier("shop.orders."));
/// ```
#[must_use]
pub fn is_valid_qualified_identifier(s: &str) -> bool {
    s.split('.').all(is_valid_sql_identifier)
}

/// Assert that a string is a valid, possibly qualified, SQL identifier.
///
/// # Panics
///
/// Panics with a descriptive error if the identifier is invalid.
/// This is intended for programmer errors (invalid table names in code),
/// not for user input validation.
///
/// ```should_panic
/// use where_guard::assert_valid_sql_identifier;
///
/// assert_valid_sql_identifier("orders; DROP TABLE", "table");
/// ```
#[inline]
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    assert!(
        is_valid_qualified_identifier(s),
        "Invalid SQL {context} name '{s}': each dot-separated segment must start with \
             letter/underscore, contain only ASCII alphanumeric/underscore, and be 1-63 chars"
    );
}
