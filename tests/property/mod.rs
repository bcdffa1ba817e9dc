//! Property-based and generative tests for the invariants the pipeline
//! must hold regardless of the specific descriptor or catalog shape.

use std::fs;
use std::path::Path;

use kg_catalog_apply::apply_descriptor;
use kg_catalog_evolution::evolve;
use kg_catalog_loader::load_catalog;
use kg_catalog_storage::{GraphStore, MemoryGraphStore};
use kg_catalog_validation::engine::validate_sync;
use kg_catalog_validation::ValidatorFactory;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

fn write_schema(dir: &Path, name: &str, body: &str) {
    let entity_dir = dir.join(name);
    fs::create_dir_all(&entity_dir).unwrap();
    fs::write(entity_dir.join("1.0.0.yaml"), body).unwrap();
}

fn base_repository_schema() -> &'static str {
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
"#
}

// --- Catalog-level properties -------------------------------------------

/// Property 1 — every relationship's declared target_types is a subset of
/// the catalog's own entity types.
#[test]
fn p1_relationship_targets_are_known_entity_types() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());

    // external_dependency_version/package are seeded as built-ins by the
    // loader, so a plain repository schema already exercises the
    // property without declaring them explicitly.
    let catalog = load_catalog(dir.path()).unwrap();
    let known: std::collections::HashSet<&str> = catalog.entity_types().collect();
    for entity_type in catalog.entity_types() {
        let schema = catalog.get(entity_type).unwrap();
        for relationship in &schema.relationships {
            for target in &relationship.target_types {
                assert!(known.contains(target.as_str()), "relationship target '{target}' is not a known entity type");
            }
        }
    }
}

/// Property 2/3 — a schema with a field name that collides with a
/// relationship name fails catalog load rather than silently shadowing.
#[test]
fn p2_field_and_relationship_names_must_be_disjoint() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(
        dir.path(),
        "repository",
        r#"
entity_type: repository
schema_version: "1.0.0"
required_metadata:
  depends_on:
    type: array
    items: string
dgraph_type: Repository
relationships:
  depends_on:
    target_types: ["repository"]
"#,
    );

    assert!(load_catalog(dir.path()).is_err());
}

// --- Pipeline properties --------------------------------------------------

/// Property 4 — a syntactically invalid descriptor produces exactly one
/// `yaml_syntax_error` diagnostic and no materialized model.
#[test]
fn p4_syntax_error_is_single_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());
    let catalog = load_catalog(dir.path()).unwrap();
    let factory = ValidatorFactory::new();

    let result = validate_sync("not: valid: yaml: [", &catalog, &factory, false);
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].diagnostic_type, "yaml_syntax_error");
}

/// Property 5 — for a valid descriptor with no relationship references
/// needing backend lookups, `validate_sync` is as strict as `validate_async`
/// with an always-absent checker would be for everything up through
/// Layer 4 (both agree the descriptor is otherwise well-formed).
#[test]
fn p5_sync_validation_agrees_with_async_through_layer_four() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());
    let catalog = load_catalog(dir.path()).unwrap();
    let factory = ValidatorFactory::new();

    let yaml = r#"
schema_version: "1.0.0"
namespace: "demo"
entity:
  repository:
    - r1:
        owners: ["a@x.com"]
"#;
    let result = validate_sync(yaml, &catalog, &factory, false);
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
}

/// Property 6 — strict mode promotes every warning into an error.
#[test]
fn p6_strict_mode_promotes_all_warnings() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());
    let catalog = load_catalog(dir.path()).unwrap();
    let factory = ValidatorFactory::new();

    let yaml = r#"
schema_version: "1.0.0"
namespace: "demo"
entity:
  repository:
    - r1:
        owners: ["a@x.com", "b@y.com"]
"#;
    let lenient = validate_sync(yaml, &catalog, &factory, false);
    let strict = validate_sync(yaml, &catalog, &factory, true);

    assert_eq!(strict.errors.len(), lenient.errors.len() + lenient.warnings.len());
    assert!(strict.warnings.is_empty());
}

// --- Apply properties ------------------------------------------------------

/// Property 7 — applying the same descriptor twice yields exactly one
/// entity per id, and the second apply does not change its created_at.
#[tokio::test]
async fn p7_upsert_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());

    let storage = MemoryGraphStore::new();
    let yaml = r#"
schema_version: "1.0.0"
namespace: "demo"
entity:
  repository:
    - r1:
        owners: ["a@x.com"]
"#;
    let cancellation = CancellationToken::new();
    apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml, "p7.yaml", false, &cancellation).await.unwrap();
    let first = storage.get_entity("repository", "demo/r1").await.unwrap().unwrap();

    let second_summary = apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml, "p7.yaml", false, &cancellation).await.unwrap();
    assert_eq!(second_summary.updated, 1);
    let second = storage.get_entity("repository", "demo/r1").await.unwrap().unwrap();

    assert_eq!(first.created_at, second.created_at);
    let metrics = storage.get_system_metrics().await.unwrap();
    assert_eq!(metrics.entity_counts.by_type.get("repository"), Some(&1));
}

/// Property 8 — an entity's edge set for a relationship equals exactly
/// the descriptor's declared target set, including the empty set when the
/// descriptor omits the relationship entirely.
#[tokio::test]
async fn p8_relationship_replacement_matches_descriptor_exactly() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());

    let storage = MemoryGraphStore::new();
    let cancellation = CancellationToken::new();

    let with_dep = r#"
schema_version: "1.0.0"
namespace: "demo"
entity:
  repository:
    - r1:
        owners: ["a@x.com"]
        relationships:
          depends_on: ["external://pypi/requests/2.31.0"]
"#;
    apply_descriptor(&storage, dir.path().to_str().unwrap(), with_dep, "p8.yaml", false, &cancellation).await.unwrap();

    let without_dep = r#"
schema_version: "1.0.0"
namespace: "demo"
entity:
  repository:
    - r1:
        owners: ["a@x.com"]
"#;
    apply_descriptor(&storage, dir.path().to_str().unwrap(), without_dep, "p8.yaml", false, &cancellation).await.unwrap();

    let edges = storage.get_entity_relationships("repository", "demo/r1").await.unwrap();
    let depends_on = edges.iter().find(|r| r.relationship_name == "depends_on");
    assert!(depends_on.map(|d| d.target_entities.is_empty()).unwrap_or(true));
}

/// Property 9 — an external dependency reference always expands into a
/// package entity, a version entity, and a `has_version` edge.
#[tokio::test]
async fn p9_external_dependency_always_creates_package_and_version() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());

    let storage = MemoryGraphStore::new();
    let yaml = r#"
schema_version: "1.0.0"
namespace: "demo"
entity:
  repository:
    - r1:
        owners: ["a@x.com"]
        relationships:
          depends_on: ["external://npm/left-pad/1.3.0"]
"#;
    apply_descriptor(&storage, dir.path().to_str().unwrap(), yaml, "p9.yaml", false, &CancellationToken::new()).await.unwrap();

    assert!(storage.get_entity("external_dependency_package", "external://npm/left-pad").await.unwrap().is_some());
    assert!(storage.get_entity("external_dependency_version", "external://npm/left-pad/1.3.0").await.unwrap().is_some());
    let edges = storage.get_entity_relationships("external_dependency_package", "external://npm/left-pad").await.unwrap();
    assert!(edges.iter().any(|r| r.relationship_name == "has_version" && r.target_entities.len() == 1));
}

// --- Additive-evolution properties -----------------------------------------

/// Property 10 — diffing a catalog against an identical copy of itself
/// yields no changes and no violations.
#[test]
fn p10_identical_catalogs_diff_to_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_schema(dir.path(), "repository", base_repository_schema());
    let catalog = load_catalog(dir.path()).unwrap();

    let report = evolve(&catalog, &catalog);
    assert!(report.diff.is_empty());
    assert!(report.is_additive());
}

/// Property 11 — adding an optional field, an optional relationship, or a
/// brand-new entity type is classified as additive.
#[test]
fn p11_additive_changes_have_no_violations() {
    let old_dir = tempfile::tempdir().unwrap();
    write_schema(old_dir.path(), "repository", base_repository_schema());
    let old = load_catalog(old_dir.path()).unwrap();

    let new_dir = tempfile::tempdir().unwrap();
    write_schema(
        new_dir.path(),
        "repository",
        r#"
entity_type: repository
schema_version: "1.0.0"
required_metadata:
  owners:
    type: array
    items: string
optional_metadata:
  description:
    type: string
dgraph_type: Repository
relationships:
  depends_on:
    target_types: ["external_dependency_version", "repository"]
"#,
    );
    write_schema(
        new_dir.path(),
        "build_artifact",
        r#"
entity_type: build_artifact
schema_version: "1.0.0"
required_metadata:
  path:
    type: string
dgraph_type: BuildArtifact
"#,
    );
    let new = load_catalog(new_dir.path()).unwrap();

    let report = evolve(&old, &new);
    assert!(!report.diff.is_empty());
    assert!(report.is_additive(), "expected additive-only changes, got violations: {:?}", report.violations);
}

/// Property 12 — removing a required field is classified as a violation.
#[test]
fn p12_removing_a_required_field_is_a_violation() {
    let old_dir = tempfile::tempdir().unwrap();
    write_schema(old_dir.path(), "repository", base_repository_schema());
    let old = load_catalog(old_dir.path()).unwrap();

    let new_dir = tempfile::tempdir().unwrap();
    write_schema(
        new_dir.path(),
        "repository",
        r#"
entity_type: repository
schema_version: "1.0.0"
dgraph_type: Repository
"#,
    );
    let new = load_catalog(new_dir.path()).unwrap();

    let report = evolve(&old, &new);
    assert!(!report.is_additive());
}

// --- Generative coverage over namespace formatting -------------------------

proptest! {
    /// Any namespace matching the catalog's accepted pattern round-trips
    /// through validation without ever producing `invalid_namespace_format`.
    #[test]
    fn namespace_following_the_pattern_never_flags_format(
        first in "[a-z]",
        rest in "[a-z0-9_-]{0,12}",
    ) {
        let mut namespace = first.clone();
        namespace.push_str(&rest);
        // the pattern forbids a trailing separator
        let namespace = namespace.trim_end_matches(['-', '_']).to_string();
        let namespace = if namespace.is_empty() { first } else { namespace };

        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "repository", base_repository_schema());
        let catalog = load_catalog(dir.path()).unwrap();
        let factory = ValidatorFactory::new();

        let yaml = format!(
            "schema_version: \"1.0.0\"\nnamespace: \"{namespace}\"\nentity:\n  repository:\n    - r1:\n        owners: [\"a@x.com\"]\n"
        );
        let result = validate_sync(&yaml, &catalog, &factory, false);
        prop_assert!(!result.errors.iter().any(|d| d.diagnostic_type == "invalid_namespace_format"));
    }
}
