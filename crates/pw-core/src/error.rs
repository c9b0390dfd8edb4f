//! Engine-wide base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so reference-data problems surface unchanged
//! through every layer.

use thiserror::Error;

/// The top-level error type for `pw-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {record} {name:?}: {reason}")]
    InvalidRecord {
        record: &'static str,
        name:   String,
        reason: String,
    },

    #[error("unknown tyre compound {0:?}")]
    UnknownCompound(String),

    #[error("duplicate tyre compound {0:?}")]
    DuplicateCompound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn circuit(name: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidRecord { record: "circuit", name: name.to_owned(), reason: reason.into() }
    }

    pub(crate) fn compound(name: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidRecord { record: "compound", name: name.to_owned(), reason: reason.into() }
    }
}

/// Shorthand result type for all `pw-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
