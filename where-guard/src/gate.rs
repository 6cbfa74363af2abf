//! Grammar gate: accept a fragment only if it is a bare filter clause.
//!
//! The fragment is wrapped into the smallest complete statement,
//! `SELECT 1 WHERE <fragment>`, and parsed with the dialect's parser. The
//! resulting statement must be a single plain `SELECT` whose only clause is
//! the filter. Every other clause slot the parser knows about is checked
//! explicitly, then the statement's canonical text, with the filter taken
//! out, is compared with `SELECT 1` so clause kinds unknown to this module
//! are refused too.
//!
//! Whether a leading `WHERE` is present is decided from the dialect's own
//! token stream, and the text handed back for splicing is exactly the text
//! that followed `WHERE` in the parsed statement.

use crate::dialect::Dialect;
use sqlparser::ast::{Expr, GroupByExpr, Query, Select, SetExpr, Statement};
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Token, Tokenizer, TokenizerError, Whitespace};
use std::fmt;

/// Default bound on the number of tokens in a fragment.
///
/// Parsed expression trees are walked recursively, so the bound keeps a long
/// flat `AND` chain or operator chain from exhausting the stack.
pub const DEFAULT_MAX_TOKENS: usize = 512;

/// Keywords other than `WHERE` that start a clause rather than an expression.
///
/// A fragment starting with one of these is appended after `SELECT 1`
/// unchanged, so clause-only input is reported as a clause instead of a
/// syntax error.
const CLAUSE_KEYWORDS: &[&str] = &[
    "FROM",
    "GROUP",
    "HAVING",
    "ORDER",
    "LIMIT",
    "OFFSET",
    "FETCH",
    "FOR",
    "INTO",
    "WINDOW",
    "QUALIFY",
    "UNION",
    "EXCEPT",
    "INTERSECT",
    "SORT",
    "CLUSTER",
    "DISTRIBUTE",
    "LATERAL",
    "CONNECT",
    "PREWHERE",
];

const FILTER_KEYWORD: &str = "WHERE";

/// A statement clause other than the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Clause {
    /// `WITH` common table expressions.
    With,
    /// `DISTINCT` or `DISTINCT ON`.
    Distinct,
    /// `TOP n`.
    Top,
    /// Select list other than the constant `1`.
    Projection,
    /// `SELECT ... INTO`.
    Into,
    /// `FROM` and joins.
    From,
    /// Hive `LATERAL VIEW`.
    LateralView,
    /// ClickHouse `PREWHERE`.
    Prewhere,
    /// `GROUP BY`.
    GroupBy,
    /// `CLUSTER BY`.
    ClusterBy,
    /// `DISTRIBUTE BY`.
    DistributeBy,
    /// `SORT BY`.
    SortBy,
    /// `HAVING`.
    Having,
    /// Named `WINDOW` definitions.
    Window,
    /// `QUALIFY`.
    Qualify,
    /// `CONNECT BY` hierarchical queries.
    ConnectBy,
    /// `ORDER BY`.
    OrderBy,
    /// `LIMIT`, `OFFSET` or another modifier attached to the query.
    Modifier,
    /// `FETCH FIRST`.
    Fetch,
    /// `FOR UPDATE` and other row locks.
    Locking,
    /// `UNION`, `EXCEPT`, `INTERSECT`.
    SetOperation,
    /// Anything that made the statement differ from `SELECT 1 WHERE <expr>`.
    Other,
}

impl Clause {
    /// Human-readable clause name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::With => "WITH",
            Self::Distinct => "DISTINCT",
            Self::Top => "TOP",
            Self::Projection => "select list",
            Self::Into => "INTO",
            Self::From => "FROM",
            Self::LateralView => "LATERAL VIEW",
            Self::Prewhere => "PREWHERE",
            Self::GroupBy => "GROUP BY",
            Self::ClusterBy => "CLUSTER BY",
            Self::DistributeBy => "DISTRIBUTE BY",
            Self::SortBy => "SORT BY",
            Self::Having => "HAVING",
            Self::Window => "WINDOW",
            Self::Qualify => "QUALIFY",
            Self::ConnectBy => "CONNECT BY",
            Self::OrderBy => "ORDER BY",
            Self::Modifier => "LIMIT/OFFSET or another query modifier",
            Self::Fetch => "FETCH",
            Self::Locking => "FOR UPDATE/SHARE",
            Self::SetOperation => "set operation",
            Self::Other => "unrecognized clause",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the grammar gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Tokenizer or parser failure.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The fragment contains a `--` or `/* */` comment.
    #[error("comments are not allowed in a filter")]
    CommentNotAllowed,
    /// The fragment contains more than one statement.
    #[error("expected a single statement, found {count}")]
    MultipleStatements {
        /// Number of statements parsed.
        count: usize,
    },
    /// The statement is not a query.
    #[error("unsupported statement kind")]
    UnsupportedStatementKind,
    /// A clause other than the filter is present.
    #[error("unsupported clause: {0}")]
    UnsupportedClause(Clause),
    /// There is no filter expression.
    #[error("missing filter clause")]
    MissingFilterClause,
    /// The fragment has more tokens than allowed.
    #[error("filter has {actual} tokens, more than the maximum {max}")]
    TooManyTokens {
        /// Configured maximum.
        max: usize,
        /// Tokens found.
        actual: usize,
    },
}

impl From<ParserError> for ParseError {
    fn from(err: ParserError) -> Self {
        Self::Syntax(err.to_string())
    }
}

impl From<TokenizerError> for ParseError {
    fn from(err: TokenizerError) -> Self {
        Self::Syntax(err.to_string())
    }
}

/// Parse `fragment` and return its filter expression, unvalidated.
///
/// The fragment may start with `WHERE`. It must not contain comments, other
/// clauses, or more than one statement, and must not exceed
/// [`DEFAULT_MAX_TOKENS`] tokens.
///
/// # Example
///
/// ```
/// use where_guard::{Clause, ParseError, Postgres, parse_filter_only};
///
/// let expr = parse_filter_only("WHERE a.b = 1", &Postgres).unwrap();
/// assert_eq!(expr.to_string(), "a.b = 1");
///
/// assert_eq!(
///     parse_filter_only("LIMIT 10", &Postgres),
///     Err(ParseError::UnsupportedClause(Clause::Modifier)),
/// );
/// ```
pub fn parse_filter_only<D: Dialect>(fragment: &str, dialect: &D) -> Result<Expr, ParseError> {
    gate(fragment, dialect, DEFAULT_MAX_TOKENS).map(|gated| gated.expr)
}

/// A fragment that passed the gate.
#[derive(Debug)]
pub(crate) struct Gated<'a> {
    /// The filter expression.
    pub(crate) expr: Expr,
    /// The slice of the fragment that was parsed after `WHERE`, without
    /// surrounding blanks and trailing `;`.
    pub(crate) body: &'a str,
}

/// Run the gate with an explicit token budget.
pub(crate) fn gate<'a, D: Dialect>(
    fragment: &'a str,
    dialect: &D,
    max_tokens: usize,
) -> Result<Gated<'a>, ParseError> {
    let tokens = Tokenizer::new(dialect.parser_dialect(), fragment).tokenize()?;
    check_tokens(&tokens, max_tokens)?;

    let body = match leading(&tokens) {
        Leading::Expression => fragment,
        Leading::FilterKeyword => after_filter_keyword(fragment)?,
        Leading::Clause => {
            // Parsed only to report which clause or shape error applies.
            parse_statement(&format!("SELECT 1 {fragment}"), dialect)?;
            return Err(ParseError::UnsupportedClause(Clause::Other));
        },
    };

    let expr = parse_statement(&format!("SELECT 1 WHERE {body}"), dialect)?;
    Ok(Gated {
        expr,
        body: trim_body(body),
    })
}

fn check_tokens(tokens: &[Token], max_tokens: usize) -> Result<(), ParseError> {
    let mut count = 0;
    for token in tokens {
        match token {
            Token::Whitespace(
                Whitespace::SingleLineComment { .. } | Whitespace::MultiLineComment(_),
            ) => return Err(ParseError::CommentNotAllowed),
            Token::Whitespace(_) | Token::EOF => {},
            _ => count += 1,
        }
    }
    if count > max_tokens {
        return Err(ParseError::TooManyTokens {
            max: max_tokens,
            actual: count,
        });
    }
    Ok(())
}

enum Leading {
    Expression,
    FilterKeyword,
    Clause,
}

fn leading(tokens: &[Token]) -> Leading {
    let first = tokens
        .iter()
        .find(|token| !matches!(token, Token::Whitespace(_) | Token::EOF));

    match first {
        None | Some(Token::SemiColon) => Leading::Clause,
        Some(Token::Word(word)) if word.quote_style.is_none() => {
            let upper = word.value.to_ascii_uppercase();
            if upper == FILTER_KEYWORD {
                Leading::FilterKeyword
            } else if CLAUSE_KEYWORDS.contains(&upper.as_str()) {
                Leading::Clause
            } else {
                Leading::Expression
            }
        },
        Some(_) => Leading::Expression,
    }
}

/// The text after a leading `WHERE` token.
///
/// Everything before the keyword was tokenized as whitespace, and the
/// keyword token is exactly the five letters, so the cut lands on the
/// token's end.
fn after_filter_keyword(fragment: &str) -> Result<&str, ParseError> {
    match fragment.trim_start().split_at_checked(FILTER_KEYWORD.len()) {
        Some((head, rest)) if head.eq_ignore_ascii_case(FILTER_KEYWORD) => Ok(rest),
        _ => Err(ParseError::UnsupportedClause(Clause::Other)),
    }
}

/// Drop blanks around the body and trailing statement terminators.
///
/// Only characters that can never be part of a token are removed.
fn trim_body(body: &str) -> &str {
    body.trim_start_matches(is_blank)
        .trim_end_matches(|c: char| c == ';' || is_blank(c))
}

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Parse a synthesized statement and return its filter expression.
fn parse_statement<D: Dialect>(sql: &str, dialect: &D) -> Result<Expr, ParseError> {
    let mut statements = Parser::parse_sql(dialect.parser_dialect(), sql)?;

    if statements.len() > 1 {
        return Err(ParseError::MultipleStatements {
            count: statements.len(),
        });
    }
    let Some(statement) = statements.pop() else {
        return Err(ParseError::MissingFilterClause);
    };
    let Statement::Query(mut query) = statement else {
        return Err(ParseError::UnsupportedStatementKind);
    };

    // The filter is taken out before any rendering so the shape checks never
    // walk the expression tree.
    let selection = take_selection(&mut query)?;
    let select = check_query(&query)?;
    check_select(select)?;
    selection.ok_or(ParseError::MissingFilterClause)
}

fn take_selection(query: &mut Query) -> Result<Option<Expr>, ParseError> {
    match query.body.as_mut() {
        SetExpr::Select(select) => Ok(select.selection.take()),
        SetExpr::SetOperation { .. } => Err(ParseError::UnsupportedClause(Clause::SetOperation)),
        _ => Err(ParseError::UnsupportedClause(Clause::Other)),
    }
}

fn check_query(query: &Query) -> Result<&Select, ParseError> {
    let clauses = [
        (query.with.is_some(), Clause::With),
        (query.order_by.is_some(), Clause::OrderBy),
        (query.fetch.is_some(), Clause::Fetch),
        (!query.locks.is_empty(), Clause::Locking),
    ];
    reject_present(&clauses)?;

    let SetExpr::Select(select) = query.body.as_ref() else {
        return Err(ParseError::UnsupportedClause(Clause::Other));
    };

    // LIMIT, OFFSET and dialect-specific modifiers only show up in the
    // query's rendering, not the body's.
    if query.to_string() != query.body.to_string() {
        return Err(ParseError::UnsupportedClause(Clause::Modifier));
    }

    Ok(select)
}

/// Check a select whose filter has already been taken out.
fn check_select(select: &Select) -> Result<(), ParseError> {
    let grouped = !matches!(
        &select.group_by,
        GroupByExpr::Expressions(exprs, modifiers) if exprs.is_empty() && modifiers.is_empty()
    );
    let constant_projection = select.projection.len() == 1
        && select.projection.first().map(ToString::to_string).as_deref() == Some("1");

    let clauses = [
        (select.distinct.is_some(), Clause::Distinct),
        (select.top.is_some(), Clause::Top),
        (!constant_projection, Clause::Projection),
        (select.into.is_some(), Clause::Into),
        (!select.from.is_empty(), Clause::From),
        (!select.lateral_views.is_empty(), Clause::LateralView),
        (select.prewhere.is_some(), Clause::Prewhere),
        (grouped, Clause::GroupBy),
        (!select.cluster_by.is_empty(), Clause::ClusterBy),
        (!select.distribute_by.is_empty(), Clause::DistributeBy),
        (!select.sort_by.is_empty(), Clause::SortBy),
        (select.having.is_some(), Clause::Having),
        (!select.named_window.is_empty(), Clause::Window),
        (select.qualify.is_some(), Clause::Qualify),
        (select.connect_by.is_some(), Clause::ConnectBy),
    ];
    reject_present(&clauses)?;

    if select.to_string() != "SELECT 1" {
        return Err(ParseError::UnsupportedClause(Clause::Other));
    }

    Ok(())
}

fn reject_present(clauses: &[(bool, Clause)]) -> Result<(), ParseError> {
    match clauses.iter().find(|(present, _)| *present) {
        Some((_, clause)) => Err(ParseError::UnsupportedClause(*clause)),
        None => Ok(()),
    }
}
