//! `kg-catalog schema export` — projects the loaded catalog into a
//! Draft-2020-12 JSON Schema document and wires it into the editor's
//! `yaml.schemas` association.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use kg_catalog_core::jsonschema;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output;

#[derive(Subcommand)]
pub enum SchemaCommand {
    /// Export the catalog as a JSON Schema document.
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// Where to write the generated JSON Schema document.
    #[arg(long, short, default_value = ".vscode/kg-schema.json")]
    output: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = true)]
    pretty: bool,

    /// Update .vscode/settings.json's `yaml.schemas` association.
    #[arg(long, default_value_t = true)]
    vscode: bool,
}

pub async fn execute(cmd: SchemaCommand, config: &Config) -> Result<()> {
    match cmd {
        SchemaCommand::Export(args) => export(args, config).await,
    }
}

async fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let catalog = kg_catalog_loader::load_catalog(&config.schema_dir).map_err(|e| CliError::SchemaLoad(e.to_string()))?;
    let document = jsonschema::export(&catalog);

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| CliError::FileRead { path: parent.display().to_string(), source })?;
        }
    }
    std::fs::write(&args.output, rendered).map_err(|source| CliError::FileRead { path: args.output.display().to_string(), source })?;

    output::print_success(&format!("exported catalog schema to {}", args.output.display()));

    if args.vscode {
        update_vscode_settings(&args.output)?;
        output::print_info("updated .vscode/settings.json's yaml.schemas association");
    }

    Ok(())
}

fn update_vscode_settings(schema_path: &PathBuf) -> Result<()> {
    let settings_path = PathBuf::from(".vscode/settings.json");
    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CliError::FileRead { path: parent.display().to_string(), source })?;
    }

    let mut settings: serde_json::Map<String, serde_json::Value> = if settings_path.exists() {
        let contents = std::fs::read_to_string(&settings_path).map_err(|source| CliError::FileRead { path: settings_path.display().to_string(), source })?;
        serde_json::from_str(&contents).unwrap_or_default()
    } else {
        serde_json::Map::new()
    };

    let mut yaml_schemas: BTreeMap<String, Vec<String>> =
        settings.get("yaml.schemas").and_then(|v| serde_json::from_value(v.clone()).ok()).unwrap_or_default();
    yaml_schemas.insert(schema_path.display().to_string(), vec!["*.yaml".to_string(), "*.yml".to_string()]);
    settings.insert("yaml.schemas".to_string(), serde_json::to_value(yaml_schemas)?);

    let rendered = serde_json::to_string_pretty(&settings)?;
    std::fs::write(&settings_path, rendered).map_err(|source| CliError::FileRead { path: settings_path.display().to_string(), source })?;
    Ok(())
}
