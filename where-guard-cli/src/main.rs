//! `where-guard` command-line checker.
//!
//! Authorizes a filter fragment against an optional policy file and prints
//! the composed `SELECT` on stdout:
//!
//! ```bash
//! where-guard --policy columns.toml --table orders "WHERE orders.status = 'open'"
//! ```
//!
//! Rejected fragments print the error chain on stderr and exit non-zero.
//! Set `RUST_LOG=where_guard=debug` to see why a fragment was rejected.

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use where_guard::{
    Dialect, PolicyConfig, Postgres, Sqlite, ValidatorRegistry, WhereParser,
    is_valid_qualified_identifier, select,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum DialectArg {
    #[default]
    Postgres,
    Sqlite,
}

/// Check a SQL WHERE fragment against a column policy.
#[derive(Debug, Parser)]
#[command(name = "where-guard", version, about)]
struct Cli {
    /// Filter fragment, with or without a leading WHERE
    filter: String,

    /// Column policy file (.toml or .json); every column is allowed when omitted
    #[arg(short, long)]
    policy: Option<PathBuf>,

    /// SQL dialect used to parse the fragment
    #[arg(short, long, value_enum, default_value_t = DialectArg::Postgres)]
    dialect: DialectArg,

    /// Table for the composed SELECT
    #[arg(short, long, default_value = "t")]
    table: String,

    /// Optional LIMIT for the composed SELECT
    #[arg(long)]
    limit: Option<u32>,

    /// Maximum nesting of AND/OR/NOT
    #[arg(long, default_value_t = where_guard::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum number of tokens in the fragment
    #[arg(long, default_value_t = where_guard::DEFAULT_MAX_TOKENS)]
    max_tokens: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sql = run(&cli)?;
    println!("{sql}");
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    if !is_valid_qualified_identifier(&cli.table) {
        bail!("invalid table name '{}'", cli.table);
    }

    let registry = match &cli.policy {
        Some(path) => PolicyConfig::load(path)
            .with_context(|| format!("failed to load policy {}", path.display()))?
            .into_registry(),
        None => ValidatorRegistry::new(),
    };
    tracing::debug!(columns = registry.len(), dialect = ?cli.dialect, "registry ready");

    match cli.dialect {
        DialectArg::Postgres => compose(&WhereParser::with_dialect(Postgres, registry), cli),
        DialectArg::Sqlite => compose(&WhereParser::with_dialect(Sqlite, registry), cli),
    }
}

fn compose<D: Dialect>(parser: &WhereParser<D>, cli: &Cli) -> anyhow::Result<String> {
    let parser = parser
        .clone()
        .max_depth(cli.max_depth)
        .max_tokens(cli.max_tokens);
    let mut builder = parser
        .parse_and_attach(&cli.filter, select(cli.table.as_str()))
        .context("filter rejected")?;
    if let Some(limit) = cli.limit {
        builder = builder.limit(limit);
    }
    Ok(builder.build().sql)
}
