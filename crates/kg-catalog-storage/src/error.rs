//! Errors the storage contract's operations can raise. `health_check` and
//! `execute_query` deliberately do not raise — failure is reported inside
//! their result value instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("operation error: {0}")]
    Operation(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("validation error: {0}")]
    Validation(String),
}
