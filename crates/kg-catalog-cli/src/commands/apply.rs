//! `kg-catalog apply <file>` — validates the descriptor with a storage
//! handle attached (Layers 1–5) then lands it via the apply orchestrator.

use std::path::PathBuf;

use clap::Args;
use kg_catalog_apply::apply_descriptor;
use kg_catalog_storage::{GraphStore, MemoryGraphStore};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ApplyArgs {
    /// Path to the descriptor YAML file to apply.
    #[arg(default_value = "knowledge-graph.yaml")]
    file: PathBuf,

    /// Storage endpoint to report in output; the in-process reference
    /// store is always used for the actual write.
    #[arg(long)]
    server: Option<String>,

    /// Simulate the apply without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Output format for the run summary.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct ApplyReport {
    file: String,
    endpoint: String,
    dry_run: bool,
    created: usize,
    updated: usize,
    entities: Vec<String>,
}

pub async fn run(args: ApplyArgs, config: &Config) -> Result<()> {
    if !args.file.exists() {
        return Err(CliError::FileNotFound(args.file.display().to_string()));
    }
    let yaml = std::fs::read_to_string(&args.file).map_err(|source| CliError::FileRead { path: args.file.display().to_string(), source })?;

    let endpoint = args.server.clone().unwrap_or_else(|| config.storage.endpoint.clone());
    let storage = MemoryGraphStore::new();
    storage.connect().await.map_err(|e| CliError::StorageConnection(e.to_string()))?;

    let schema_dir = config.schema_dir.to_string_lossy().into_owned();
    let source_name = args.file.display().to_string();
    let cancellation = CancellationToken::new();

    let summary = tokio::select! {
        result = apply_descriptor(&storage, &schema_dir, &yaml, &source_name, args.dry_run, &cancellation) => result?,
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
            return Err(CliError::Interrupted);
        }
    };

    if let Some(dry_run) = &summary.dry_run {
        output::print_structured(dry_run, args.format)?;
        output::print_info(&format!("dry-run against {endpoint}: would create {}, would update {}", dry_run.would_create.len(), dry_run.would_update.len()));
        return Ok(());
    }

    let report = ApplyReport {
        file: args.file.display().to_string(),
        endpoint,
        dry_run: false,
        created: summary.created,
        updated: summary.updated,
        entities: summary.entities.iter().map(|e| format!("{}/{}", e.entity_type, e.entity_id)).collect(),
    };
    output::print_structured(&report, args.format)?;

    match summary.first_failure {
        Some(failure) => Err(CliError::StorageOperation(failure)),
        None => {
            output::print_success(&format!("applied {} ({} created, {} updated)", args.file.display(), summary.created, summary.updated));
            Ok(())
        }
    }
}
