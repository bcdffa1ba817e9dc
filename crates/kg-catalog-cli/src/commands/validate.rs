//! `kg-catalog validate <file>` — runs Layers 1–4 of the validation
//! pipeline against the loaded catalog (no storage handle, so reference
//! existence is never checked).

use std::path::PathBuf;

use clap::Args;
use kg_catalog_validation::ValidatorFactory;
use kg_catalog_validation::engine::validate_sync;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the descriptor YAML file to validate.
    #[arg(default_value = "knowledge-graph.yaml")]
    file: PathBuf,

    /// Promote warnings to errors.
    #[arg(long)]
    strict: bool,

    /// Output format for the diagnostic list.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

pub async fn run(args: ValidateArgs, config: &Config) -> Result<()> {
    if !args.file.exists() {
        return Err(CliError::FileNotFound(args.file.display().to_string()));
    }
    let yaml = std::fs::read_to_string(&args.file).map_err(|source| CliError::FileRead { path: args.file.display().to_string(), source })?;

    let catalog = kg_catalog_loader::load_catalog(&config.schema_dir).map_err(|e| CliError::SchemaLoad(e.to_string()))?;
    let factory = ValidatorFactory::new();

    let result = validate_sync(&yaml, &catalog, &factory, args.strict);

    let mut diagnostics = result.errors.clone();
    diagnostics.extend(result.warnings.clone());
    output::print_diagnostics(&diagnostics, args.format)?;

    if result.is_valid {
        output::print_success(&format!("{} is valid", args.file.display()));
        Ok(())
    } else {
        Err(CliError::ValidationFailed { error_count: result.errors.len() })
    }
}
