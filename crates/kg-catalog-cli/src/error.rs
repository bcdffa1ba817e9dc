//! CLI-level error taxonomy and the exit-code mapping from §7.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read file {path}: {source}")]
    FileRead { path: String, source: std::io::Error },

    #[error("failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("failed to load schema catalog: {0}")]
    SchemaLoad(String),

    #[error("storage connection failed: {0}")]
    StorageConnection(String),

    #[error("descriptor failed validation with {error_count} error(s)")]
    ValidationFailed { error_count: usize },

    #[error("storage operation failed: {0}")]
    StorageOperation(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("interrupted")]
    Interrupted,

    #[error("configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// The process exit code for this error, per §7's apply/validate
    /// contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::FileNotFound(_) | CliError::FileRead { .. } | CliError::YamlParse(_) | CliError::Config(_) => 2,
            CliError::ValidationFailed { .. } => 1,
            CliError::StorageConnection(_) | CliError::StorageOperation(_) => 3,
            CliError::SchemaLoad(_) | CliError::Internal(_) => 4,
            CliError::Interrupted => 130,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Internal(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::YamlParse(e.to_string())
    }
}

impl From<kg_catalog_apply::ApplyError> for CliError {
    fn from(e: kg_catalog_apply::ApplyError) -> Self {
        match e {
            kg_catalog_apply::ApplyError::CatalogLoad(msg) => CliError::SchemaLoad(msg),
            kg_catalog_apply::ApplyError::ValidationFailed { error_count } => CliError::ValidationFailed { error_count },
            kg_catalog_apply::ApplyError::Storage { entity_type, entity_id, source } => {
                CliError::StorageOperation(format!("{entity_type}/{entity_id}: {source}"))
            }
            kg_catalog_apply::ApplyError::Canceled => CliError::Interrupted,
        }
    }
}

pub fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    match error {
        CliError::FileNotFound(_) => eprintln!("  hint: check the descriptor path and try again"),
        CliError::SchemaLoad(_) => eprintln!("  hint: check --schema-dir points at the catalog's entity-schema tree"),
        CliError::StorageConnection(_) => eprintln!("  hint: check --server and that the storage backend is reachable"),
        _ => {}
    }
}
