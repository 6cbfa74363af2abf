//! Property-based tests for filter authorization using proptest.
//!
//! Identifiers are generated with a `t_`/`c_` prefix so they never collide
//! with SQL keywords.

use proptest::prelude::*;
use where_guard::prelude::*;

fn table() -> impl Strategy<Value = String> {
    "t_[a-z0-9_]{0,10}"
}

fn column() -> impl Strategy<Value = String> {
    "c_[a-z0-9_]{0,10}"
}

fn string_literal() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 %_.]{0,16}".prop_map(|s| format!("'{s}'"))
}

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![any::<i64>().prop_map(|n| n.to_string()), string_literal()]
}

fn operator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["=", "<>", "!=", "<", "<=", ">", ">="])
}

fn comparison() -> impl Strategy<Value = String> {
    (table(), column(), operator(), literal())
        .prop_map(|(t, c, op, lit)| format!("{t}.{c} {op} {lit}"))
}

fn mixed_case(name: &str, mask: &[bool]) -> String {
    name.chars()
        .zip(mask.iter().chain(std::iter::repeat(&false)))
        .map(|(ch, upper)| if *upper { ch.to_ascii_uppercase() } else { ch })
        .collect()
}

// =============================================================================
// Registry opt-in
// =============================================================================

proptest! {
    /// With no rules, any structurally valid comparison is accepted
    #[test]
    fn empty_registry_accepts_any_column(cmp in comparison(), keyword in any::<bool>()) {
        let parser = WhereParser::new(ValidatorRegistry::new());
        let fragment = if keyword { format!("WHERE {cmp}") } else { cmp.clone() };

        let filter = parser.authorize(&fragment);
        prop_assert!(filter.is_ok(), "{} rejected: {:?}", fragment, filter);
        prop_assert_eq!(filter.unwrap().as_str(), cmp.as_str());
    }

    /// Combinations of valid comparisons stay valid
    #[test]
    fn combinations_accepted(
        parts in prop::collection::vec(comparison(), 1..6),
        use_or in any::<bool>()
    ) {
        let parser = WhereParser::new(ValidatorRegistry::new());
        let joiner = if use_or { " OR " } else { " AND " };
        let fragment = parts.join(joiner);
        prop_assert!(parser.authorize(&fragment).is_ok(), "{}", fragment);
    }
}

// =============================================================================
// Case-insensitive resolution
// =============================================================================

proptest! {
    /// A registered column is found whatever the casing on either side
    #[test]
    fn registry_lookup_ignores_case(
        t in table(),
        c in column(),
        register_mask in prop::collection::vec(any::<bool>(), 32),
        reference_mask in prop::collection::vec(any::<bool>(), 32),
        n in any::<i32>()
    ) {
        let name = format!("{t}.{c}");
        let registered = mixed_case(&name, &register_mask);
        let referenced = mixed_case(&name, &reference_mask);

        let parser = WhereParser::new(
            ValidatorRegistry::builder()
                .column(registered, "VARCHAR", ValueKind::String)
                .build(),
        );

        let fragment = format!("{referenced} = {n}");
        let result = parser.authorize(&fragment);
        prop_assert!(
            matches!(
                result,
                Err(Error::Validation(ValidationError::ColumnRejected { .. }))
            ),
            "{} should be resolved: {:?}", referenced, result
        );
    }

    /// Integer kinds accept exactly the literals that fit
    #[test]
    fn int32_gate_matches_range(n in any::<i64>()) {
        let parser = WhereParser::new(
            ValidatorRegistry::builder()
                .column("t.c", "INTEGER", ValueKind::Int32)
                .build(),
        );
        let accepted = parser.authorize(&format!("t.c = {n}")).is_ok();
        prop_assert_eq!(accepted, i32::try_from(n).is_ok());
    }
}

// =============================================================================
// Grammar closure
// =============================================================================

proptest! {
    /// Appending any non-filter clause is rejected by the gate
    #[test]
    fn trailing_clause_rejected(
        cmp in comparison(),
        clause in prop::sample::select(vec![
            "LIMIT 10",
            "OFFSET 3",
            "ORDER BY c_x",
            "GROUP BY c_x",
            "HAVING c_x = 1",
            "FOR UPDATE",
            "UNION SELECT 1",
        ])
    ) {
        let parser = WhereParser::new(ValidatorRegistry::new());
        let fragment = format!("{cmp} {clause}");
        let result = parser.authorize(&fragment);
        prop_assert!(
            matches!(result, Err(Error::Parse(ParseError::UnsupportedClause(_)))),
            "{} gave {:?}", fragment, result
        );
    }

    /// Arbitrary input never panics, and authorized text is always part of it
    #[test]
    fn arbitrary_input_never_panics(input in "\\PC{0,64}") {
        let parser = WhereParser::new(ValidatorRegistry::new());
        if let Ok(filter) = parser.authorize(&input) {
            prop_assert!(input.contains(filter.as_str()));
        }
    }

    /// Keyword stripping only touches the leading keyword
    #[test]
    fn where_inside_literal_untouched(
        t in table(),
        c in column(),
        before in "[a-z ]{0,5}",
        after in "[a-z ]{0,5}",
        upper in any::<bool>()
    ) {
        let word = if upper { "WHERE" } else { "where" };
        let body = format!("{t}.{c} = '{before}{word}{after}'");
        let parser = WhereParser::new(ValidatorRegistry::new());

        let bare = parser.authorize(&body).unwrap();
        prop_assert_eq!(bare.as_str(), body.as_str());

        let prefixed = format!("{word} {body}");
        let stripped = parser.authorize(&prefixed).unwrap();
        prop_assert_eq!(stripped.as_str(), body.as_str());
    }
}
