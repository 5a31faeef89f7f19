//! Error types for hierarchy analysis.

use thiserror::Error;

/// Errors that can occur while building or analyzing an issue hierarchy.
///
/// Missing optional issue fields are never errors. Only structurally
/// malformed input and invalid configuration are rejected.
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally malformed input was supplied.
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// The field or argument that was rejected.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration document could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidInput`].
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for hierarchy analysis operations.
pub type Result<T> = std::result::Result<T, Error>;
