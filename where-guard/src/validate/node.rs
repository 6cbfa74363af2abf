//! Classified filter tree.
//!
//! A [`FilterNode`] is the restricted form of a parsed filter: boolean
//! combinations, comparisons of a column with literals, and bare column
//! references. Anything else never makes it into this tree.

use crate::registry::Literal;
use std::fmt;

/// Boolean connective of a [`FilterNode::Combination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// All operands must hold.
    And,
    /// At least one operand must hold.
    Or,
    /// Negation of a single operand.
    Not,
}

impl LogicalOp {
    /// SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

/// Comparison operator of a [`Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>` or `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `~`
    RegexMatch,
    /// `!~`
    RegexNotMatch,
    /// `~*`
    RegexIMatch,
    /// `!~*`
    RegexNotIMatch,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `ILIKE`
    ILike,
    /// `NOT ILIKE`
    NotILike,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
    /// `BETWEEN low AND high`
    Between,
    /// `NOT BETWEEN low AND high`
    NotBetween,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl CompareOp {
    /// SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::RegexMatch => "~",
            Self::RegexNotMatch => "!~",
            Self::RegexIMatch => "~*",
            Self::RegexNotIMatch => "!~*",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether this is one of the POSIX regex operators.
    #[must_use]
    pub const fn is_regex(self) -> bool {
        matches!(
            self,
            Self::RegexMatch | Self::RegexNotMatch | Self::RegexIMatch | Self::RegexNotIMatch
        )
    }

    /// Whether this is a case-insensitive LIKE.
    #[must_use]
    pub const fn is_ilike(self) -> bool {
        matches!(self, Self::ILike | Self::NotILike)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A possibly qualified column reference, e.g. `shop.orders.status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnPath {
    segments: Vec<String>,
}

impl ColumnPath {
    /// Build a path from its identifier segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Identifier segments in source order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments joined with `.`, the form used for registry lookups.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// A column compared with zero or more literals.
///
/// An operand is `None` when the literal is of a kind that is not
/// classified (floats, booleans, `NULL`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Column on the left-hand side.
    pub column: ColumnPath,
    /// Operator.
    pub op: CompareOp,
    /// Right-hand literals: one for binary operators, the list for `IN`,
    /// two for `BETWEEN`, none for `IS NULL`.
    pub operands: Vec<Option<Literal>>,
}

/// Node of a classified filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// `AND`/`OR` with two or more operands, or `NOT` with exactly one.
    Combination {
        /// Connective.
        op: LogicalOp,
        /// Operands in source order.
        operands: Vec<Self>,
    },
    /// Column compared with literals.
    Comparison(Comparison),
    /// Bare column used as a boolean.
    Column(ColumnPath),
}

impl FilterNode {
    /// Every column referenced by the filter, in source order.
    #[must_use]
    pub fn columns(&self) -> Vec<&ColumnPath> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnPath>) {
        match self {
            Self::Combination { operands, .. } => {
                for operand in operands {
                    operand.collect_columns(out);
                }
            },
            Self::Comparison(cmp) => out.push(&cmp.column),
            Self::Column(path) => out.push(path),
        }
    }
}
