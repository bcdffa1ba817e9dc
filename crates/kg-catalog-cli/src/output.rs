//! Output formatting for the `validate`, `apply` and `schema export`
//! commands: table, compact, json and yaml per §6.

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use kg_catalog_core::diagnostics::{Diagnostic, Severity};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Compact,
    Json,
    Yaml,
}

pub fn print_structured<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(data)?),
        OutputFormat::Table | OutputFormat::Compact => println!("{}", serde_json::to_string_pretty(data)?),
    }
    Ok(())
}

pub fn print_diagnostics(diagnostics: &[Diagnostic], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(diagnostics)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(diagnostics)?),
        OutputFormat::Compact => {
            for d in diagnostics {
                let location = match (&d.entity, &d.field) {
                    (Some(entity), Some(field)) => format!("{entity}.{field}"),
                    (Some(entity), None) => entity.clone(),
                    _ => "-".to_string(),
                };
                println!("{}\t{}\t{}\t{}", severity_label(d.severity), d.diagnostic_type, location, d.message);
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("severity"),
                Cell::new("type"),
                Cell::new("entity"),
                Cell::new("field"),
                Cell::new("message"),
                Cell::new("help"),
            ]);
            for d in diagnostics {
                table.add_row(vec![
                    severity_label(d.severity).to_string(),
                    d.diagnostic_type.clone(),
                    d.entity.clone().unwrap_or_default(),
                    d.field.clone().unwrap_or_default(),
                    d.message.clone(),
                    d.help.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

pub fn print_success(message: &str) {
    println!("ok: {message}");
}

pub fn print_info(message: &str) {
    println!("info: {message}");
}
