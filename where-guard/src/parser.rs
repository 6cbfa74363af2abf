//! Top-level filter parser: grammar gate, classification, registry checks.

use crate::dialect::{Dialect, Postgres, Sqlite};
use crate::gate::{DEFAULT_MAX_TOKENS, Gated, ParseError, gate};
use crate::registry::ValidatorRegistry;
use crate::validate::{FilterNode, ValidationError, classify, validate};
use std::fmt;

/// Default bound on nested boolean combinations.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Any error returned by [`WhereParser`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The fragment is not a bare filter clause.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The filter uses an unsupported construct or violates the column policy.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Validates caller-supplied filter fragments against a column policy.
///
/// The parser owns an immutable [`ValidatorRegistry`] and is cheap to share
/// across threads.
///
/// # Example
///
/// ```
/// use where_guard::prelude::*;
///
/// let registry = ValidatorRegistry::builder()
///     .column("orders.status", "VARCHAR", ValueKind::String)
///     .build();
/// let parser = WhereParser::new(registry);
///
/// let query = parser
///     .parse_and_attach("WHERE orders.status = 'open'", select("orders"))
///     .unwrap()
///     .build();
/// assert_eq!(query.sql, "SELECT * FROM orders WHERE orders.status = 'open'");
///
/// assert!(parser.authorize("orders.status = 5").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct WhereParser<D: Dialect = Postgres> {
    dialect: D,
    registry: ValidatorRegistry,
    max_depth: usize,
    max_tokens: usize,
}

impl WhereParser<Postgres> {
    /// Parser for the Postgres dialect.
    #[must_use]
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self::with_dialect(Postgres, registry)
    }
}

impl WhereParser<Sqlite> {
    /// Parser for the `SQLite` dialect.
    #[must_use]
    pub fn sqlite(registry: ValidatorRegistry) -> Self {
        Self::with_dialect(Sqlite, registry)
    }
}

impl<D: Dialect> WhereParser<D> {
    /// Parser for any dialect.
    #[must_use]
    pub const fn with_dialect(dialect: D, registry: ValidatorRegistry) -> Self {
        Self {
            dialect,
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the maximum nesting of boolean combinations.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum number of tokens in a fragment.
    #[must_use]
    pub const fn max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// The column policy.
    pub const fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// The SQL dialect.
    pub fn dialect(&self) -> D {
        self.dialect
    }

    /// Run the grammar gate and the validator, returning the text to splice.
    ///
    /// The returned text is the exact slice of `fragment` that was parsed as
    /// the filter: a leading `WHERE` token, surrounding blanks and trailing
    /// `;` are dropped, nothing else is rewritten.
    pub fn authorize<'a>(&self, fragment: &'a str) -> Result<AuthorizedFilter<'a>, Error> {
        self.check(fragment).inspect_err(|err| {
            tracing::debug!(dialect = self.dialect.name(), error = %err, "filter rejected");
        })
    }

    /// Authorize `fragment` and attach it to `builder`.
    ///
    /// On failure the builder is dropped untouched.
    pub fn parse_and_attach<B: FilterSink>(&self, fragment: &str, builder: B) -> Result<B, Error> {
        let filter = self.authorize(fragment)?;
        Ok(builder.attach_filter(&filter))
    }

    fn check<'a>(&self, fragment: &'a str) -> Result<AuthorizedFilter<'a>, Error> {
        let Gated { expr, body } = gate(fragment, &self.dialect, self.max_tokens)?;
        let node = classify(&expr, &self.dialect, self.max_depth)?;
        validate(&node, &self.registry)?;
        Ok(AuthorizedFilter { text: body, node })
    }
}

/// A filter that passed the grammar gate and the column policy.
///
/// Only [`WhereParser::authorize`] creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedFilter<'a> {
    text: &'a str,
    node: FilterNode,
}

impl<'a> AuthorizedFilter<'a> {
    /// The filter text to splice after `WHERE`.
    pub const fn as_str(&self) -> &'a str {
        self.text
    }

    /// The classified filter.
    pub const fn node(&self) -> &FilterNode {
        &self.node
    }

    /// Consume into the classified filter.
    pub fn into_node(self) -> FilterNode {
        self.node
    }
}

impl fmt::Display for AuthorizedFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// A query builder that accepts authorized filters.
pub trait FilterSink: Sized {
    /// Attach `filter` as a `WHERE` condition.
    fn attach_filter(self, filter: &AuthorizedFilter<'_>) -> Self;
}
