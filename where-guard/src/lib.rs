// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # where-guard - Policy-checked SQL WHERE fragments
//!
//! Accepts a caller-supplied `WHERE` clause body, proves it is nothing more
//! than a boolean filter over literals, checks every referenced column
//! against a [`ValidatorRegistry`], and only then hands the original text to
//! a query builder.
//!
//! ## Quick Start
//!
//! ```
//! # use where_guard::prelude::*;
//! let registry = ValidatorRegistry::builder()
//!     .column("orders.status", "VARCHAR", ValueKind::String)
//!     .column("orders.total", "INTEGER", ValueKind::Int32)
//!     .build();
//! let parser = WhereParser::new(registry);
//!
//! let result = parser
//!     .parse_and_attach(
//!         "WHERE orders.status = 'open' AND orders.total > 100",
//!         select("orders").fields(&["id"]).limit(10),
//!     )
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(
//!     result.sql,
//!     "SELECT id FROM orders WHERE orders.status = 'open' AND orders.total > 100 LIMIT 10"
//! );
//! ```
//!
//! ## What is rejected
//!
//! | Input | Error |
//! |-------|-------|
//! | `a = 1 LIMIT 5` | [`ParseError::UnsupportedClause`] |
//! | `a = 1; DROP TABLE t` | [`ParseError::MultipleStatements`] |
//! | `a = 1 -- x` | [`ParseError::CommentNotAllowed`] |
//! | more than [`DEFAULT_MAX_TOKENS`] tokens | [`ParseError::TooManyTokens`] |
//! | `a IN (SELECT id FROM t)` | [`ValidationError::UnsupportedExpression`] |
//! | `a + 1` | [`ValidationError::UnsupportedOperator`] |
//! | `a + 1 = 2` | [`ValidationError::UnsupportedExpression`] |
//! | `orders.total = 'x'` (registered `Int32`) | [`ValidationError::ColumnRejected`] |
//!
//! ## Supported Operators
//!
//! | Operator | Notes |
//! |----------|-------|
//! | `=`, `<>`, `!=`, `<`, `<=`, `>`, `>=` | |
//! | `LIKE`, `NOT LIKE` | |
//! | `ILIKE`, `NOT ILIKE` | Postgres only |
//! | `~`, `!~`, `~*`, `!~*` | Postgres only |
//! | `IN (...)`, `NOT IN (...)` | literal lists |
//! | `BETWEEN`, `NOT BETWEEN` | |
//! | `IS NULL`, `IS NOT NULL` | |
//!
//! Only integer and string literals are passed to column checks. Other
//! literal kinds (floats, booleans, `NULL`) reach the check as `None`.

mod builder;
mod dialect;
mod gate;
mod parser;
mod policy;
mod registry;
mod validate;

pub use builder::{QueryBuilder, QueryResult, SortDir, SortField, select};
pub use dialect::{Dialect, Postgres, Sqlite};
pub use gate::{Clause, DEFAULT_MAX_TOKENS, ParseError, parse_filter_only};
pub use parser::{AuthorizedFilter, DEFAULT_MAX_DEPTH, Error, FilterSink, WhereParser};
pub use policy::{ColumnPolicy, PolicyConfig, PolicyError};
pub use registry::{
    CheckFn, ColumnDescriptor, Literal, RegistryBuilder, RuleViolation, ValidationRule,
    ValidatorRegistry, ValueKind, kind_check,
};
pub use validate::{
    ColumnPath, CompareOp, Comparison, FilterNode, LogicalOp, ValidationError,
    assert_valid_sql_identifier, is_valid_qualified_identifier, is_valid_sql_identifier, validate,
};

/// Prelude module for convenient imports.
///
/// ```
/// use where_guard::prelude::*;
/// let parser = WhereParser::new(ValidatorRegistry::new());
/// let result = parser.parse_and_attach("a = 1", select("t")).unwrap().build();
/// assert_eq!(result.sql, "SELECT * FROM t WHERE a = 1");
/// ```
pub mod prelude {
    pub use crate::{
        AuthorizedFilter, ColumnDescriptor, Dialect, Error, FilterSink, Literal, ParseError,
        Postgres, QueryBuilder, QueryResult, RuleViolation, SortDir, Sqlite, ValidationError,
        ValidationRule, ValidatorRegistry, ValueKind, WhereParser, kind_check, select,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_column_parser() -> WhereParser {
        WhereParser::new(
            ValidatorRegistry::builder()
                .column("t.c", "VARCHAR", ValueKind::String)
                .build(),
        )
    }

    #[test]
    fn test_empty_registry_allows_any_column() {
        let parser = WhereParser::new(ValidatorRegistry::new());
        let filter = parser.authorize("WHERE x.y = 1").unwrap();
        assert_eq!(filter.as_str(), "x.y = 1");
    }

    #[test]
    fn test_type_gate() {
        let parser = string_column_parser();
        assert!(parser.authorize("WHERE t.c = 'ok'").is_ok());
        assert!(matches!(
            parser.authorize("WHERE t.c = 5"),
            Err(Error::Validation(ValidationError::ColumnRejected { .. }))
        ));
    }

    #[test]
    fn test_failed_attach_returns_error_only() {
        let parser = string_column_parser();
        let result = parser.parse_and_attach("t.c = 5", select("t"));
        assert!(result.is_err());
    }

    #[test]
    fn test_clause_only_input() {
        let parser = WhereParser::new(ValidatorRegistry::new());
        assert!(matches!(
            parser.authorize("LIMIT 10"),
            Err(Error::Parse(ParseError::UnsupportedClause(_)))
        ));
        assert_eq!(
            parser.authorize(""),
            Err(Error::Parse(ParseError::MissingFilterClause))
        );
    }

    #[test]
    fn test_parser_shared_across_threads() {
        let parser = std::sync::Arc::new(string_column_parser());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = std::sync::Arc::clone(&parser);
                std::thread::spawn(move || {
                    let fragment = format!("t.c = 'v{i}'");
                    parser.authorize(&fragment).is_ok()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
