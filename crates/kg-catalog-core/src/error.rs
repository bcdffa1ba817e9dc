//! Core error types shared across the catalog data model.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building or parsing core data-model values:
/// dependency URIs, schema versions, and the raw descriptor shape.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("parse error: {0}")]
    ParseError(String),

    #[error("invalid dependency reference: {0}")]
    InvalidDependencyReference(String),

    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, CoreError::ParseError(_))
    }
}
