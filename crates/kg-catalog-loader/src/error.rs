//! Errors raised while loading a catalog from a schema directory.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("i/o error reading schema directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse schema file '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("schema extends unknown base '{0}'")]
    InheritanceTargetMissing(String),

    #[error("required field missing in schema file '{path}': {field}")]
    RequiredFieldMissing { path: String, field: String },

    #[error("catalog validation failed: {0:?}")]
    Validation(Vec<String>),
}
