//! Registry validation of a classified filter.

use super::node::{Comparison, FilterNode};
use crate::registry::{Literal, RuleViolation, ValidatorRegistry};

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Operator outside the supported comparison set.
    #[error("unsupported operator `{operator}`")]
    UnsupportedOperator {
        /// The operator as written.
        operator: String,
    },
    /// Expression shape outside the filter grammar (functions, subqueries,
    /// arithmetic, non-literal operands, ...).
    #[error("unsupported expression `{expression}`")]
    UnsupportedExpression {
        /// The offending expression, re-rendered by the parser.
        expression: String,
    },
    /// A registered column refused the value it was compared with.
    #[error("column `{column}` rejected the filter")]
    ColumnRejected {
        /// The column as referenced in the filter.
        column: String,
        /// Reason given by the column's check.
        #[source]
        cause: RuleViolation,
    },
    /// Nesting depth exceeds maximum.
    #[error("filter nesting depth {actual} exceeds maximum {max}")]
    NestingTooDeep {
        /// The maximum allowed nesting depth.
        max: usize,
        /// The actual nesting depth encountered.
        actual: usize,
    },
}

/// Validate every column reference in `node` against `registry`.
///
/// Combinations are checked left to right and stop at the first failure.
/// Columns without a rule pass.
///
/// # Example
///
/// ```
/// use where_guard::{ColumnPath, CompareOp, Comparison, FilterNode, Literal};
/// use where_guard::{ValidatorRegistry, ValueKind, validate};
///
/// let registry = ValidatorRegistry::builder()
///     .column("t.c", "VARCHAR", ValueKind::String)
///     .build();
///
/// let node = FilterNode::Comparison(Comparison {
///     column: ColumnPath::new(["t", "c"]),
///     op: CompareOp::Eq,
///     operands: vec![Some(Literal::Int(5))],
/// });
///
/// assert!(validate(&node, &registry).is_err());
/// ```
pub fn validate(node: &FilterNode, registry: &ValidatorRegistry) -> Result<(), ValidationError> {
    match node {
        FilterNode::Combination { operands, .. } => operands
            .iter()
            .try_for_each(|operand| validate(operand, registry)),
        FilterNode::Comparison(cmp) => validate_comparison(cmp, registry),
        FilterNode::Column(path) => {
            let column = path.dotted();
            check(&column, registry, Some(&Literal::Bool(true)))
        },
    }
}

fn validate_comparison(cmp: &Comparison, registry: &ValidatorRegistry) -> Result<(), ValidationError> {
    let column = cmp.column.dotted();
    if cmp.operands.is_empty() {
        return check(&column, registry, None);
    }
    cmp.operands
        .iter()
        .try_for_each(|operand| check(&column, registry, operand.as_ref()))
}

fn check(
    column: &str,
    registry: &ValidatorRegistry,
    value: Option<&Literal>,
) -> Result<(), ValidationError> {
    let Some(rule) = registry.lookup(column) else {
        return Ok(());
    };
    rule.check(value)
        .map_err(|cause| ValidationError::ColumnRejected {
            column: column.to_string(),
            cause,
        })
}
