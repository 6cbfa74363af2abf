//! Validation rules: a column descriptor paired with a caller-owned check.

use super::types::{ColumnDescriptor, Literal};
use std::fmt;
use std::sync::Arc;

/// Signature of a column check.
///
/// The second argument is the observed value: `None` when the filter compares
/// the column with a literal kind that is not classified (floats, NULL, ...).
pub type CheckFn =
    dyn Fn(&ColumnDescriptor, Option<&Literal>) -> Result<(), RuleViolation> + Send + Sync;

/// Error returned by a column check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuleViolation {
    message: String,
}

impl RuleViolation {
    /// Create a violation with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The violation message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A column descriptor and the check applied to every value compared with it.
///
/// Cloning is cheap: the check is shared.
#[derive(Clone)]
pub struct ValidationRule {
    descriptor: ColumnDescriptor,
    check: Arc<CheckFn>,
}

impl ValidationRule {
    /// Create a rule with a custom check.
    ///
    /// # Example
    ///
    /// ```
    /// use where_guard::{ColumnDescriptor, Literal, RuleViolation, ValidationRule, ValueKind};
    ///
    /// let positive = ValidationRule::new(
    ///     ColumnDescriptor::new("shop.orders.total", "INTEGER", ValueKind::Int32),
    ///     |_desc, value| match value {
    ///         Some(Literal::Int(v)) if *v < 0 => Err(RuleViolation::new("must be positive")),
    ///         _ => Ok(()),
    ///     },
    /// );
    ///
    /// assert!(positive.check(Some(&Literal::Int(-1))).is_err());
    /// ```
    pub fn new<F>(descriptor: ColumnDescriptor, check: F) -> Self
    where
        F: Fn(&ColumnDescriptor, Option<&Literal>) -> Result<(), RuleViolation>
            + Send
            + Sync
            + 'static,
    {
        Self {
            descriptor,
            check: Arc::new(check),
        }
    }

    /// Create a rule that only enforces the descriptor's [`ValueKind`](super::ValueKind).
    #[must_use]
    pub fn kind_checked(descriptor: ColumnDescriptor) -> Self {
        Self::new(descriptor, kind_check)
    }

    /// The column this rule describes.
    #[must_use]
    pub const fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Run the check against an observed value.
    pub fn check(&self, value: Option<&Literal>) -> Result<(), RuleViolation> {
        (self.check)(&self.descriptor, value)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Ready-made check: the observed literal must fit the column's kind.
///
/// A missing value passes.
pub fn kind_check(descriptor: &ColumnDescriptor, value: Option<&Literal>) -> Result<(), RuleViolation> {
    match value {
        Some(literal) if !descriptor.kind().accepts(literal) => Err(RuleViolation::new(format!(
            "mismatched types: {} column cannot hold {} {literal}",
            descriptor.kind(),
            literal.kind_name(),
        ))),
        _ => Ok(()),
    }
}
