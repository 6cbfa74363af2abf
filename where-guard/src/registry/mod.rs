//! Case-insensitive registry of column validation rules.
//!
//! The registry is opt-in policy: a column without a rule is permitted and
//! unvalidated. Names are folded to lowercase on insertion and on lookup, so
//! `"Foo.Bar"`, `"foo.bar"` and `"FOO.BAR"` all resolve to the same rule.
//!
//! # Example
//!
//! ```
//! use where_guard::{ColumnDescriptor, ValidationRule, ValidatorRegistry, ValueKind};
//!
//! let registry = ValidatorRegistry::builder()
//!     .rule(ValidationRule::kind_checked(ColumnDescriptor::new(
//!         "Shop.Orders.Status",
//!         "VARCHAR",
//!         ValueKind::String,
//!     )))
//!     .build();
//!
//! assert!(registry.lookup("shop.orders.status").is_some());
//! assert!(registry.lookup("shop.orders.total").is_none());
//! ```

mod rule;
mod types;

pub use rule::{CheckFn, RuleViolation, ValidationRule, kind_check};
pub use types::{ColumnDescriptor, Literal, ValueKind};

use std::collections::HashMap;

/// Immutable mapping from folded column name to its validation rule.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    rules: HashMap<String, ValidationRule>,
}

impl ValidatorRegistry {
    /// An empty registry: every column passes unvalidated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from `(name, rule)` pairs.
    ///
    /// Duplicate names (after case folding) overwrite earlier entries.
    pub fn from_rules<I, K>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, ValidationRule)>,
        K: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .map(|(name, rule)| (fold(name.as_ref()), rule))
            .collect();
        Self { rules }
    }

    /// Find the rule for a column, ignoring case.
    #[must_use]
    pub fn lookup(&self, column: &str) -> Option<&ValidationRule> {
        let rule = self.rules.get(&fold(column));
        tracing::trace!(column, found = rule.is_some(), "registry lookup");
        rule
    }

    /// Number of registered columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no column is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: AsRef<str>> FromIterator<(K, ValidationRule)> for ValidatorRegistry {
    fn from_iter<I: IntoIterator<Item = (K, ValidationRule)>>(iter: I) -> Self {
        Self::from_rules(iter)
    }
}

impl FromIterator<ValidationRule> for ValidatorRegistry {
    fn from_iter<I: IntoIterator<Item = ValidationRule>>(iter: I) -> Self {
        Self::from_rules(
            iter.into_iter()
                .map(|rule| (rule.descriptor().name().to_string(), rule)),
        )
    }
}

/// Fluent builder for [`ValidatorRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    rules: Vec<(String, ValidationRule)>,
}

impl RegistryBuilder {
    /// Register a rule under its descriptor's name.
    #[must_use]
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push((rule.descriptor().name().to_string(), rule));
        self
    }

    /// Register a rule under an explicit name.
    #[must_use]
    pub fn rule_for(mut self, name: impl Into<String>, rule: ValidationRule) -> Self {
        self.rules.push((name.into(), rule));
        self
    }

    /// Register a column checked only by kind.
    #[must_use]
    pub fn column(self, name: impl Into<String>, db_type_name: impl Into<String>, kind: ValueKind) -> Self {
        self.rule(ValidationRule::kind_checked(ColumnDescriptor::new(
            name,
            db_type_name,
            kind,
        )))
    }

    /// Finish the registry.
    #[must_use]
    pub fn build(self) -> ValidatorRegistry {
        ValidatorRegistry::from_rules(self.rules)
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, kind: ValueKind) -> ValidationRule {
        ValidationRule::kind_checked(ColumnDescriptor::new(name, "ANY", kind))
    }

    #[test]
    fn test_empty_registry() {
        let registry = ValidatorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("anything").is_none());
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = ValidatorRegistry::builder()
            .rule(rule("Foo.Bar", ValueKind::Int32))
            .build();

        for name in ["Foo.Bar", "foo.bar", "FOO.BAR", "fOO.bAR"] {
            assert!(registry.lookup(name).is_some(), "{name} should resolve");
        }
    }

    #[test]
    fn test_duplicate_folded_names_last_wins() {
        let registry = ValidatorRegistry::from_rules([
            ("t.c", rule("t.c", ValueKind::String)),
            ("T.C", rule("T.C", ValueKind::Int64)),
        ]);

        assert_eq!(registry.len(), 1);
        let found = registry.lookup("t.c").unwrap();
        assert_eq!(found.descriptor().kind(), ValueKind::Int64);
    }

    #[test]
    fn test_rule_for_overrides_descriptor_name() {
        let registry = ValidatorRegistry::builder()
            .rule_for("alias.col", rule("real.col", ValueKind::Bool))
            .build();

        assert!(registry.lookup("alias.col").is_some());
        assert!(registry.lookup("real.col").is_none());
    }

    #[test]
    fn test_collect_from_rules() {
        let registry: ValidatorRegistry = [rule("a.x", ValueKind::Bool), rule("b.y", ValueKind::Float)]
            .into_iter()
            .collect();
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("B.Y").is_some());
    }

    #[test]
    fn test_builder_column_shorthand() {
        let registry = ValidatorRegistry::builder()
            .column("shop.orders.paid", "BOOLEAN", ValueKind::Bool)
            .build();
        let found = registry.lookup("shop.orders.paid").unwrap();
        assert_eq!(found.descriptor().db_type_name(), "BOOLEAN");
        assert!(found.check(Some(&Literal::Bool(true))).is_ok());
        assert!(found.check(Some(&Literal::Int(1))).is_err());
    }
}
