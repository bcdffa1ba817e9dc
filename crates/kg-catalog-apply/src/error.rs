//! Errors raised while extracting records from a validated descriptor or
//! orchestrating an apply run.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApplyError>;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("catalog load failed: {0}")]
    CatalogLoad(String),

    #[error("descriptor failed validation with {error_count} error(s)")]
    ValidationFailed { error_count: usize },

    #[error("storage operation failed for {entity_type}/{entity_id}: {source}")]
    Storage { entity_type: String, entity_id: String, source: kg_catalog_storage::StorageError },

    #[error("apply run was canceled")]
    Canceled,
}
