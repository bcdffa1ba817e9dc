//! End-to-end scenarios exercising the full loader -> validation ->
//! apply pipeline against an in-process storage backend.

use std::fs;
use std::path::Path;

use kg_catalog_apply::apply_descriptor;
use kg_catalog_loader::load_catalog;
use kg_catalog_storage::{GraphStore, MemoryGraphStore};
use kg_catalog_validation::engine::validate_sync;
use kg_catalog_validation::ValidatorFactory;
use tokio_util::sync::CancellationToken;

fn write_repository_schema(dir: &Path) {
    let entity_dir = dir.join("repository");
    fs::create_dir_all(&entity_dir).unwrap();
    fs::write(
        entity_dir.join("1.0.0.yaml"),
        r#"
entity_type: repository
schema_version: "1.0.0"
required_metadata:
  owners:
    type: array
    items: string
dgraph_type: Repository
relationships:
  depends_on:
    target_types: ["external_dependency_version", "repository"]
"#,
    )
    .unwrap();
}

/// S1 — a well-formed single-repository descriptor validates and applies
/// cleanly with no diagnostics.
#[tokio::test]
async fn s1_valid_single_repository_applies_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    write_repository_schema(dir.path());

    let yaml = r#"
schema_version: "1.0.0"
namespace: "acme"
entity:
  repository:
    - payments-service:
        owners: ["team-payments@acme.example"]
"#;

    let catalog = load_catalog(dir.path()).unwrap();
    let factory = ValidatorFactory::new();
    let result = validate_sync(yaml, &catalog, &factory, false);
    assert!(result.is_valid, "expected valid descriptor, got {:?}", result.errors);

    let storage = MemoryGraphStore::new();
    let summary = apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml, "s1.yaml", false, &CancellationToken::new())
        .await
        .unwrap();
    assert!(summary.succeeded());
    assert_eq!(summary.created, 1);
}

/// S2 — an unsupported schema_version is a critical structural error and
/// the pipeline never reaches Layer 3.
#[tokio::test]
async fn s2_unsupported_schema_version_is_critical() {
    let dir = tempfile::tempdir().unwrap();
    write_repository_schema(dir.path());

    let yaml = r#"
schema_version: "2.0.0"
namespace: "acme"
entity:
  repository:
    - payments-service:
        owners: ["team-payments@acme.example"]
"#;

    let catalog = load_catalog(dir.path()).unwrap();
    let factory = ValidatorFactory::new();
    let result = validate_sync(yaml, &catalog, &factory, false);

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].diagnostic_type, "unsupported_schema_version");
}

/// S3 — a namespace that doesn't match the lowercase-dash-underscore
/// pattern is rejected with `invalid_namespace_format`.
#[tokio::test]
async fn s3_invalid_namespace_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_repository_schema(dir.path());

    let yaml = r#"
schema_version: "1.0.0"
namespace: "Invalid_NS"
entity:
  repository:
    - payments-service:
        owners: ["team-payments@acme.example"]
"#;

    let catalog = load_catalog(dir.path()).unwrap();
    let factory = ValidatorFactory::new();
    let result = validate_sync(yaml, &catalog, &factory, false);

    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|d| d.diagnostic_type == "invalid_namespace_format"));
}

/// S4 — an external dependency URI expands into a package entity, a
/// version entity, and a `has_version` edge between them.
#[tokio::test]
async fn s4_external_dependency_expands_into_package_and_version() {
    let dir = tempfile::tempdir().unwrap();
    write_repository_schema(dir.path());

    let yaml = r#"
schema_version: "1.0.0"
namespace: "acme"
entity:
  repository:
    - payments-service:
        owners: ["team-payments@acme.example"]
        relationships:
          depends_on: ["external://pypi/requests/2.31.0"]
"#;

    let storage = MemoryGraphStore::new();
    let summary = apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml, "s4.yaml", false, &CancellationToken::new())
        .await
        .unwrap();
    assert!(summary.succeeded());

    let metrics = storage.get_system_metrics().await.unwrap();
    assert_eq!(metrics.entity_counts.total, 3);
    assert!(storage.get_entity("external_dependency_package", "external://pypi/requests").await.unwrap().is_some());
    assert!(storage.get_entity("external_dependency_version", "external://pypi/requests/2.31.0").await.unwrap().is_some());

    let package_edges = storage.get_entity_relationships("external_dependency_package", "external://pypi/requests").await.unwrap();
    assert!(package_edges.iter().any(|r| r.relationship_name == "has_version"));

    let repo_edges = storage.get_entity_relationships("repository", "acme/payments-service").await.unwrap();
    let depends_on = repo_edges.iter().find(|r| r.relationship_name == "depends_on").unwrap();
    assert_eq!(depends_on.target_entities.len(), 1);
    assert_eq!(depends_on.target_entities[0].entity_id, "external://pypi/requests/2.31.0");
}

/// S5 — re-applying with a different dependency version moves the
/// `depends_on` edge to the new version without deleting the old one.
#[tokio::test]
async fn s5_reapply_moves_relationship_without_deleting_old_target() {
    let dir = tempfile::tempdir().unwrap();
    write_repository_schema(dir.path());

    let storage = MemoryGraphStore::new();
    let cancellation = CancellationToken::new();

    let yaml_v1 = r#"
schema_version: "1.0.0"
namespace: "acme"
entity:
  repository:
    - payments-service:
        owners: ["team-payments@acme.example"]
        relationships:
          depends_on: ["external://pypi/requests/2.31.0"]
"#;
    apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml_v1, "s5.yaml", false, &cancellation).await.unwrap();

    let yaml_v2 = r#"
schema_version: "1.0.0"
namespace: "acme"
entity:
  repository:
    - payments-service:
        owners: ["team-payments@acme.example"]
        relationships:
          depends_on: ["external://pypi/requests/2.32.0"]
"#;
    let summary = apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml_v2, "s5.yaml", false, &cancellation).await.unwrap();
    assert!(summary.succeeded());
    assert_eq!(summary.updated, 1);

    // old version entity survives
    assert!(storage.get_entity("external_dependency_version", "external://pypi/requests/2.31.0").await.unwrap().is_some());
    assert!(storage.get_entity("external_dependency_version", "external://pypi/requests/2.32.0").await.unwrap().is_some());

    let repo_edges = storage.get_entity_relationships("repository", "acme/payments-service").await.unwrap();
    let depends_on = repo_edges.iter().find(|r| r.relationship_name == "depends_on").unwrap();
    assert_eq!(depends_on.target_entities.len(), 1);
    assert_eq!(depends_on.target_entities[0].entity_id, "external://pypi/requests/2.32.0");
}

/// S6 — a schema where a field name collides with a relationship name is
/// rejected at catalog-load time, naming the entity and the conflict.
#[tokio::test]
async fn s6_field_relationship_name_conflict_fails_catalog_load() {
    let dir = tempfile::tempdir().unwrap();
    let entity_dir = dir.path().join("repository");
    fs::create_dir_all(&entity_dir).unwrap();
    fs::write(
        entity_dir.join("1.0.0.yaml"),
        r#"
entity_type: repository
schema_version: "1.0.0"
required_metadata:
  has_version:
    type: array
    items: string
dgraph_type: Repository
relationships:
  has_version:
    target_types: ["external_dependency_version"]
"#,
    )
    .unwrap();

    let err = load_catalog(dir.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("has_version"), "expected conflict name in error message, got: {message}");
}
