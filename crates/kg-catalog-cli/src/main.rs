//! # Knowledge Graph Catalog CLI
//!
//! Validates descriptors against the entity-schema catalog, applies them
//! to a storage backend, and exports the catalog as a JSON Schema
//! document for editor integration.

mod commands;
mod config;
mod error;
mod output;

use clap::{Parser, Subcommand};
use commands::{apply, schema, validate};
use error::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kg-catalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate and apply knowledge-graph descriptor catalogs")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true, env = "KG_CATALOG_CONFIG")]
    config: Option<String>,

    /// Directory containing the entity-schema YAML tree; overrides the config file.
    #[arg(long, global = true, env = "KG_CATALOG_SCHEMA_DIR")]
    schema_dir: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only).
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a descriptor file against the catalog.
    Validate(validate::ValidateArgs),

    /// Apply a descriptor file to storage.
    Apply(apply::ApplyArgs),

    /// Schema catalog operations.
    #[command(subcommand)]
    Schema(schema::SchemaCommand),

    /// Write a starter configuration file.
    Init {
        /// Directory containing the entity-schema YAML tree.
        #[arg(long, default_value = "schemas")]
        schema_dir: String,

        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },

    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => {}
        Err(e) => {
            error::print_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = config::load_config(cli.config.as_deref())?;
    if let Some(schema_dir) = cli.schema_dir {
        cfg.schema_dir = schema_dir.into();
    }

    match cli.command {
        Commands::Validate(args) => validate::run(args, &cfg).await,
        Commands::Apply(args) => apply::run(args, &cfg).await,
        Commands::Schema(cmd) => schema::execute(cmd, &cfg).await,
        Commands::Init { schema_dir, force } => {
            config::init_config(&schema_dir, force)?;
            println!("configuration initialized");
            println!("  schema dir:  {schema_dir}");
            println!("  config file: {}", config::config_path()?.display());
            Ok(())
        }
        Commands::Config => {
            println!("{}", serde_yaml::to_string(&cfg)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(false).without_time()).init();
}
