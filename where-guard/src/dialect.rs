//! SQL dialect implementations for Postgres and `SQLite`.
//!
//! A dialect decides how the grammar gate tokenizes and parses a filter and
//! which operators the target database understands natively.

use sqlparser::dialect::{Dialect as SqlDialect, PostgreSqlDialect, SQLiteDialect};
use std::fmt;

static POSTGRES: PostgreSqlDialect = PostgreSqlDialect {};
static SQLITE: SQLiteDialect = SQLiteDialect {};

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy + fmt::Debug + Send + Sync {
    /// Human-readable dialect name (e.g., `postgres`).
    fn name(&self) -> &'static str;

    /// The parser dialect handed to `sqlparser`.
    fn parser_dialect(&self) -> &'static dyn SqlDialect;

    /// Whether the `~`, `!~`, `~*` and `!~*` regex operators are supported.
    fn supports_regex(&self) -> bool;

    /// Whether ILIKE is supported natively.
    fn supports_ilike(&self) -> bool;
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[inline]
    fn parser_dialect(&self) -> &'static dyn SqlDialect {
        &POSTGRES
    }

    #[inline]
    fn supports_regex(&self) -> bool {
        true
    }

    #[inline]
    fn supports_ilike(&self) -> bool {
        true
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[inline]
    fn parser_dialect(&self) -> &'static dyn SqlDialect {
        &SQLITE
    }

    #[inline]
    fn supports_regex(&self) -> bool {
        // SQLite ships no REGEXP implementation by default
        false
    }

    #[inline]
    fn supports_ilike(&self) -> bool {
        // SQLite LIKE is case-insensitive for ASCII by default
        false
    }
}
