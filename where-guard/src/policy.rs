//! Column policy files.
//!
//! A policy lists the columns a filter may be checked against and the value
//! kind each accepts. It can be written in TOML:
//!
//! ```toml
//! [[columns]]
//! name = "shop.orders.status"
//! db_type = "VARCHAR"
//! kind = "string"
//!
//! [[columns]]
//! name = "shop.orders.total"
//! kind = "int32"
//! ```
//!
//! or in JSON with the same shape. Every column gets [`kind_check`].

use crate::registry::{ColumnDescriptor, ValidationRule, ValidatorRegistry, ValueKind, kind_check};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors from loading a policy.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PolicyError {
    /// Malformed TOML.
    #[error("invalid TOML policy: {0}")]
    Toml(#[from] toml::de::Error),
    /// Malformed JSON.
    #[error("invalid JSON policy: {0}")]
    Json(#[from] serde_json::Error),
    /// The policy file could not be read.
    #[error("cannot read policy file {}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file extension is neither `.toml` nor `.json`.
    #[error("unknown policy format for {}: expected .toml or .json", path.display())]
    UnknownFormat {
        /// Path with the unrecognized extension.
        path: PathBuf,
    },
}

/// A deserialized policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Registered columns.
    #[serde(default)]
    pub columns: Vec<ColumnPolicy>,
}

/// One column entry of a [`PolicyConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnPolicy {
    /// Fully-qualified column name.
    pub name: String,
    /// Informational database type name.
    #[serde(default)]
    pub db_type: String,
    /// Value kind the column accepts.
    pub kind: ValueKind,
}

impl PolicyConfig {
    /// Parse a TOML policy.
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse a JSON policy.
    pub fn from_json_str(s: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a policy file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, PolicyError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(PolicyError::UnknownFormat {
                    path: path.to_path_buf(),
                });
            },
        };

        let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&contents)?;
        tracing::debug!(path = %path.display(), columns = config.columns.len(), "policy loaded");
        Ok(config)
    }

    /// Build a registry where every column is checked by kind.
    #[must_use]
    pub fn into_registry(self) -> ValidatorRegistry {
        self.columns
            .into_iter()
            .map(|column| {
                ValidationRule::new(
                    ColumnDescriptor::new(column.name, column.db_type, column.kind),
                    kind_check,
                )
            })
            .collect()
    }
}
