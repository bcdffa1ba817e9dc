//! Configuration loading for the CLI: a YAML file (`~/.config/kg-catalog/config.yaml`
//! by default) describing where the entity-schema tree lives and how to
//! reach the storage backend, per §6's storage configuration contract.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend_type: String,
    pub endpoint: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub credentials: Option<String>,
}

fn default_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend_type: "memory".to_string(),
            endpoint: "localhost:9080".to_string(),
            timeout_seconds: default_timeout(),
            max_retries: default_retries(),
            retry_delay_seconds: default_retry_delay(),
            use_tls: false,
            credentials: None,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.timeout_seconds) {
            return Err(CliError::Config(format!("timeout_seconds must be in 1..=300, got {}", self.timeout_seconds)));
        }
        if self.max_retries > 10 {
            return Err(CliError::Config(format!("max_retries must be in 0..=10, got {}", self.max_retries)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

impl Default for Config {
    fn default() -> Self {
        Self { schema_dir: default_schema_dir(), storage: StorageConfig::default() }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| CliError::Config("could not determine config directory".to_string()))?;
    Ok(config_dir.join("kg-catalog").join("config.yaml"))
}

pub fn load_config(path: Option<&str>) -> Result<Config> {
    let config_file = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        match config_path() {
            Ok(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        }
    };

    if !config_file.exists() {
        return Err(CliError::FileNotFound(config_file.display().to_string()));
    }

    let contents = fs::read_to_string(&config_file).map_err(|source| CliError::FileRead { path: config_file.display().to_string(), source })?;
    let config: Config = serde_yaml::from_str(&contents)?;
    config.storage.validate()?;
    Ok(config)
}

pub fn init_config(schema_dir: &str, force: bool) -> Result<()> {
    let config_file = config_path()?;

    if config_file.exists() && !force {
        return Err(CliError::Config(format!("config file already exists at {}; pass --force to overwrite", config_file.display())));
    }

    if let Some(parent) = config_file.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::FileRead { path: parent.display().to_string(), source })?;
    }

    let config = Config { schema_dir: PathBuf::from(schema_dir), ..Config::default() };
    let yaml = serde_yaml::to_string(&config)?;
    fs::write(&config_file, yaml).map_err(|source| CliError::FileRead { path: config_file.display().to_string(), source })?;
    Ok(())
}
