//! Expands external dependency URIs into package/version entities and a
//! `has_version` edge between them. Internal-URI targets are left to the
//! relationship processor.

use std::collections::HashMap;

use kg_catalog_core::uri::DependencyUri;
use kg_catalog_storage::GraphStore;

use crate::error::{ApplyError, Result};

const EXTERNAL_DEPENDENCY_PACKAGE: &str = "external_dependency_package";
const EXTERNAL_DEPENDENCY_VERSION: &str = "external_dependency_version";

fn auto_created_system_metadata() -> HashMap<String, serde_json::Value> {
    HashMap::from([
        ("auto_created".to_string(), serde_json::json!(true)),
        ("source".to_string(), serde_json::json!("dependency_processing")),
    ])
}

async fn upsert_package(storage: &dyn GraphStore, ecosystem: &str, package: &str) -> Result<String> {
    let package_id = DependencyUri::external_package_id(ecosystem, package);
    let metadata = HashMap::from([
        ("ecosystem".to_string(), serde_json::json!(ecosystem)),
        ("package_name".to_string(), serde_json::json!(package)),
    ]);
    storage
        .store_entity(EXTERNAL_DEPENDENCY_PACKAGE, &package_id, metadata, auto_created_system_metadata())
        .await
        .map_err(|source| ApplyError::Storage { entity_type: EXTERNAL_DEPENDENCY_PACKAGE.to_string(), entity_id: package_id.clone(), source })
}

async fn upsert_version(storage: &dyn GraphStore, ecosystem: &str, package: &str, version: &str) -> Result<String> {
    let version_id = DependencyUri::external_version_id(ecosystem, package, version);
    let metadata = HashMap::from([
        ("ecosystem".to_string(), serde_json::json!(ecosystem)),
        ("package_name".to_string(), serde_json::json!(package)),
        ("version".to_string(), serde_json::json!(version)),
    ]);
    storage
        .store_entity(EXTERNAL_DEPENDENCY_VERSION, &version_id, metadata, auto_created_system_metadata())
        .await
        .map_err(|source| ApplyError::Storage { entity_type: EXTERNAL_DEPENDENCY_VERSION.to_string(), entity_id: version_id.clone(), source })
}

/// Processes every external-URI target across `depends_on` lists,
/// upserting the package and version entities and linking them with
/// `has_version`. Non-external entries are skipped.
pub async fn process_dependencies(storage: &dyn GraphStore, depends_on: &[String]) -> Result<()> {
    for target in depends_on {
        let DependencyUri::External { ecosystem_raw, package, version } = DependencyUri::parse(target) else {
            continue;
        };
        if ecosystem_raw.is_empty() || package.is_empty() || version.is_empty() {
            continue;
        }

        let package_id = upsert_package(storage, &ecosystem_raw, &package).await?;
        let version_id = upsert_version(storage, &ecosystem_raw, &package, &version).await?;

        storage
            .create_relationship(EXTERNAL_DEPENDENCY_PACKAGE, &package_id, "has_version", EXTERNAL_DEPENDENCY_VERSION, &version_id)
            .await
            .map_err(|source| ApplyError::Storage { entity_type: EXTERNAL_DEPENDENCY_PACKAGE.to_string(), entity_id: package_id.clone(), source })?;
    }
    Ok(())
}
