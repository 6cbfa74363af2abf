//! Core types for the validator registry.

use serde::Deserialize;
use std::fmt;

/// The kind of value a column holds.
///
/// Kinds are matched against the literals found in a filter. Integer
/// literals carry an `i64`, so the narrower integer kinds accept a literal
/// only when it fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Boolean column, also the kind of a bare column reference.
    Bool,
    /// 16-bit integer (`SMALLINT`).
    Int16,
    /// 32-bit integer (`INTEGER`).
    Int32,
    /// 64-bit integer (`BIGINT`).
    Int64,
    /// Floating point or numeric column.
    Float,
    /// Text column (`VARCHAR`, `TEXT`, ...).
    String,
}

impl ValueKind {
    /// Whether a literal of this shape can be compared with a column of this kind.
    ///
    /// # Example
    ///
    /// ```
    /// use where_guard::{Literal, ValueKind};
    ///
    /// assert!(ValueKind::Int16.accepts(&Literal::Int(300)));
    /// assert!(!ValueKind::Int16.accepts(&Literal::Int(70_000)));
    /// assert!(!ValueKind::String.accepts(&Literal::Int(1)));
    /// ```
    #[must_use]
    pub fn accepts(self, literal: &Literal) -> bool {
        match (self, literal) {
            (Self::Bool, Literal::Bool(_))
            | (Self::String, Literal::String(_))
            | (Self::Int64 | Self::Float, Literal::Int(_)) => true,
            (Self::Int16, Literal::Int(v)) => i16::try_from(*v).is_ok(),
            (Self::Int32, Literal::Int(v)) => i32::try_from(*v).is_ok(),
            _ => false,
        }
    }

    /// Lowercase name, as used in policy files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal value observed on the right-hand side of a comparison.
///
/// `Bool(true)` is only produced for bare column references; boolean
/// literals written in a filter are not classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Integer literal that fits in `i64`.
    Int(i64),
    /// Quoted string literal, unescaped.
    String(String),
    /// Sentinel for a bare column reference.
    Bool(bool),
}

impl Literal {
    /// Short name of the literal's shape, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// Describes a column a policy knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    name: String,
    db_type_name: String,
    kind: ValueKind,
}

impl ColumnDescriptor {
    /// Create a descriptor.
    ///
    /// `name` is the fully-qualified column name (e.g. `"shop.orders.status"`),
    /// `db_type_name` is informational (e.g. `"VARCHAR"`).
    pub fn new(name: impl Into<String>, db_type_name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            db_type_name: db_type_name.into(),
            kind,
        }
    }

    /// Fully-qualified column name, as registered.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Database type name.
    #[must_use]
    pub fn db_type_name(&self) -> &str {
        &self.db_type_name
    }

    /// Value kind the column holds.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }
}
