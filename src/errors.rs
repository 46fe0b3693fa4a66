//! Error types for coverage aggregation.
//!
//! Fatal conditions get their own variant so callers can tell a malformed
//! profile apart from a missing one. Per-entry traversal failures are not
//! errors at all; the walker logs and skips them.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the coverage pipeline.
///
/// A `Parse` or `StatementMismatch` error aborts the whole run: coverage
/// numbers are never reported from a partially-trusted profile.
#[derive(Debug, Error)]
pub enum CovError {
    /// File system I/O failure on a specific path.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A profile line that does not match the cover-profile grammar.
    #[error("malformed profile line {line}: {message}: {text:?}")]
    Parse {
        /// 1-based line number within the concatenated profile input.
        line: usize,
        text: String,
        message: String,
    },

    /// The same statement range appeared with differing statement counts.
    #[error("statement count mismatch for {key}: expected {expected}, found {found}")]
    StatementMismatch {
        key: String,
        expected: u64,
        found: u64,
    },

    /// Invalid configuration, rejected before any traversal begins.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CovError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(line: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            text: text.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CovError>;
