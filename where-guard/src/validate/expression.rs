//! Classification of parsed expressions into [`FilterNode`]s.
//!
//! The parser hands back an arbitrary SQL expression tree. Only boolean
//! combinations, comparisons of a column with literals, and bare column
//! references are accepted; every other shape fails closed.

use super::filter::ValidationError;
use super::node::{ColumnPath, CompareOp, Comparison, FilterNode, LogicalOp};
use crate::dialect::Dialect;
use crate::registry::Literal;
use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator, Value};

/// Classify `expr` into a [`FilterNode`].
///
/// `max_depth` bounds the number of nested boolean combinations.
pub(crate) fn classify<D: Dialect>(
    expr: &Expr,
    dialect: &D,
    max_depth: usize,
) -> Result<FilterNode, ValidationError> {
    Classifier { dialect, max_depth }.node(expr, 0)
}

struct Classifier<'d, D> {
    dialect: &'d D,
    max_depth: usize,
}

impl<D: Dialect> Classifier<'_, D> {
    fn node(&self, expr: &Expr, depth: usize) -> Result<FilterNode, ValidationError> {
        match expr {
            Expr::Nested(inner) => self.node(inner, depth),
            Expr::BinaryOp {
                op: op @ (BinaryOperator::And | BinaryOperator::Or),
                ..
            } => {
                let depth = self.enter(depth)?;
                let logical = if *op == BinaryOperator::And {
                    LogicalOp::And
                } else {
                    LogicalOp::Or
                };
                let operands = flatten(expr, op)
                    .into_iter()
                    .map(|operand| self.node(operand, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FilterNode::Combination {
                    op: logical,
                    operands,
                })
            },
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                expr: inner,
            } => {
                let depth = self.enter(depth)?;
                Ok(FilterNode::Combination {
                    op: LogicalOp::Not,
                    operands: vec![self.node(inner, depth)?],
                })
            },
            Expr::BinaryOp { left, op, right } => {
                let cmp = binary_compare_op(op).ok_or_else(|| {
                    ValidationError::UnsupportedOperator {
                        operator: op.to_string(),
                    }
                })?;
                self.comparison(left, cmp, std::slice::from_ref(right.as_ref()))
            },
            Expr::Like {
                negated,
                expr: left,
                pattern,
                ..
            } => {
                let cmp = if *negated {
                    CompareOp::NotLike
                } else {
                    CompareOp::Like
                };
                self.comparison(left, cmp, std::slice::from_ref(pattern.as_ref()))
            },
            Expr::ILike {
                negated,
                expr: left,
                pattern,
                ..
            } => {
                let cmp = if *negated {
                    CompareOp::NotILike
                } else {
                    CompareOp::ILike
                };
                self.comparison(left, cmp, std::slice::from_ref(pattern.as_ref()))
            },
            Expr::InList {
                expr: left,
                list,
                negated,
                ..
            } => {
                let cmp = if *negated { CompareOp::NotIn } else { CompareOp::In };
                self.comparison(left, cmp, list)
            },
            Expr::Between {
                expr: left,
                negated,
                low,
                high,
                ..
            } => {
                let cmp = if *negated {
                    CompareOp::NotBetween
                } else {
                    CompareOp::Between
                };
                self.comparison(left, cmp, &[low.as_ref().clone(), high.as_ref().clone()])
            },
            Expr::IsNull(left) => self.comparison(left, CompareOp::IsNull, &[]),
            Expr::IsNotNull(left) => self.comparison(left, CompareOp::IsNotNull, &[]),
            Expr::AnyOp { .. } => Err(ValidationError::UnsupportedOperator {
                operator: "ANY".to_string(),
            }),
            Expr::AllOp { .. } => Err(ValidationError::UnsupportedOperator {
                operator: "ALL".to_string(),
            }),
            Expr::Identifier(_) | Expr::CompoundIdentifier(_) => column_path(expr)
                .map(FilterNode::Column)
                .ok_or_else(|| unsupported(expr)),
            _ => Err(unsupported(expr)),
        }
    }

    fn comparison(
        &self,
        left: &Expr,
        op: CompareOp,
        right: &[Expr],
    ) -> Result<FilterNode, ValidationError> {
        if (op.is_regex() && !self.dialect.supports_regex())
            || (op.is_ilike() && !self.dialect.supports_ilike())
        {
            return Err(ValidationError::UnsupportedOperator {
                operator: op.as_sql().to_string(),
            });
        }

        let column = column_path(left).ok_or_else(|| unsupported(left))?;
        let operands = right.iter().map(literal).collect::<Result<Vec<_>, _>>()?;
        Ok(FilterNode::Comparison(Comparison {
            column,
            op,
            operands,
        }))
    }

    fn enter(&self, depth: usize) -> Result<usize, ValidationError> {
        let next = depth + 1;
        if next > self.max_depth {
            return Err(ValidationError::NestingTooDeep {
                max: self.max_depth,
                actual: next,
            });
        }
        Ok(next)
    }
}

/// Collect the operands of a same-operator chain in source order.
///
/// Parenthesized sub-chains stay intact so they classify as their own node.
/// The walk uses an explicit stack since parsed chains are left-deep.
fn flatten<'e>(expr: &'e Expr, op: &BinaryOperator) -> Vec<&'e Expr> {
    let mut out = Vec::new();
    let mut pending = vec![expr];
    while let Some(next) = pending.pop() {
        match next {
            Expr::BinaryOp {
                left,
                op: inner,
                right,
            } if inner == op => {
                pending.push(right);
                pending.push(left);
            },
            _ => out.push(next),
        }
    }
    out
}

fn binary_compare_op(op: &BinaryOperator) -> Option<CompareOp> {
    let cmp = match op {
        BinaryOperator::Eq => CompareOp::Eq,
        BinaryOperator::NotEq => CompareOp::NotEq,
        BinaryOperator::Lt => CompareOp::Lt,
        BinaryOperator::LtEq => CompareOp::LtEq,
        BinaryOperator::Gt => CompareOp::Gt,
        BinaryOperator::GtEq => CompareOp::GtEq,
        BinaryOperator::PGRegexMatch => CompareOp::RegexMatch,
        BinaryOperator::PGRegexNotMatch => CompareOp::RegexNotMatch,
        BinaryOperator::PGRegexIMatch => CompareOp::RegexIMatch,
        BinaryOperator::PGRegexNotIMatch => CompareOp::RegexNotIMatch,
        BinaryOperator::PGLikeMatch => CompareOp::Like,
        BinaryOperator::PGNotLikeMatch => CompareOp::NotLike,
        BinaryOperator::PGILikeMatch => CompareOp::ILike,
        BinaryOperator::PGNotILikeMatch => CompareOp::NotILike,
        _ => return None,
    };
    Some(cmp)
}

fn column_path(expr: &Expr) -> Option<ColumnPath> {
    match expr {
        Expr::Nested(inner) => column_path(inner),
        Expr::Identifier(ident) => Some(ColumnPath::new([ident.value.as_str()])),
        Expr::CompoundIdentifier(idents) => {
            Some(ColumnPath::new(idents.iter().map(|ident| ident.value.as_str())))
        },
        _ => None,
    }
}

/// Observed value of a right-hand operand.
///
/// Only integer and string literals are recorded; other literal kinds yield
/// `None`. Anything that is not a literal is rejected.
fn literal(expr: &Expr) -> Result<Option<Literal>, ValidationError> {
    match expr {
        Expr::Nested(inner) => literal(inner),
        Expr::Value(v) => match &v.value {
            Value::Number(n, _) => Ok(n.parse::<i64>().ok().map(Literal::Int)),
            Value::SingleQuotedString(s)
            | Value::EscapedStringLiteral(s)
            | Value::NationalStringLiteral(s) => Ok(Some(Literal::String(s.clone()))),
            Value::DollarQuotedString(s) => Ok(Some(Literal::String(s.value.clone()))),
            Value::Placeholder(_) => Err(unsupported(expr)),
            _ => Ok(None),
        },
        Expr::UnaryOp {
            op: op @ (UnaryOperator::Minus | UnaryOperator::Plus),
            expr: inner,
        } => match inner.as_ref() {
            Expr::Value(v) => match &v.value {
                Value::Number(n, _) => {
                    let signed = if *op == UnaryOperator::Minus {
                        format!("-{n}")
                    } else {
                        n.clone()
                    };
                    Ok(signed.parse::<i64>().ok().map(Literal::Int))
                },
                _ => Err(unsupported(expr)),
            },
            _ => Err(unsupported(expr)),
        },
        _ => Err(unsupported(expr)),
    }
}

fn unsupported(expr: &Expr) -> ValidationError {
    ValidationError::UnsupportedExpression {
        expression: expr.to_string(),
    }
}
