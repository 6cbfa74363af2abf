//! Expression validation for caller-supplied filters.
//!
//! Validation runs in two passes:
//! - classification turns the parser's expression tree into a [`FilterNode`],
//!   rejecting every shape outside the filter grammar
//! - [`validate`] walks the [`FilterNode`] and runs the registry's column checks
//!
//! Identifier helpers used by the query builder also live here.

mod column;
mod expression;
mod filter;
mod node;

pub(crate) use expression::classify;

pub use column::{
    assert_valid_sql_identifier, is_valid_qualified_identifier, is_valid_sql_identifier,
};
pub use filter::{ValidationError, validate};
pub use node::{ColumnPath, CompareOp, Comparison, FilterNode, LogicalOp};
