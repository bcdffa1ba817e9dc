//! # Catalog Evolution
//!
//! Enforces the additive-only discipline a loaded catalog must satisfy
//! across versions: [`validator::diff_catalogs`] detects structural
//! changes between two [`kg_catalog_core::schema::Catalog`] snapshots,
//! [`validator::find_additive_violations`] classifies which of those
//! changes break backward compatibility, and [`evolve`] ties the two
//! together with the version-bump rule from
//! [`kg_catalog_core::SchemaVersion::is_allowed_bump`]. [`project_entity`]
//! implements rollback by projection: dropping fields and relationships a
//! target schema version doesn't know about, without touching stored data.

pub mod error;
pub mod types;
pub mod validator;

use std::collections::HashMap;

use kg_catalog_core::schema::{Catalog, EntitySchema};

pub use error::{EvolutionError, Result};
pub use types::{AdditiveViolation, CatalogDiff, EntityTypeChange, FieldChange, RelationshipChange, ViolationKind};
pub use validator::{diff_catalogs, find_additive_violations};

/// The outcome of evolving a catalog from one snapshot to the next.
#[derive(Debug, Clone)]
pub struct EvolutionReport {
    pub diff: CatalogDiff,
    pub violations: Vec<AdditiveViolation>,
}

impl EvolutionReport {
    pub fn is_additive(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Diffs `old` against `new`, classifies the violations, and reports
/// whether the change set is additive-only. Does not itself enforce a
/// version bump; callers that have schema versions to compare should
/// follow up with [`enforce_version_bump`].
pub fn evolve(old: &Catalog, new: &Catalog) -> EvolutionReport {
    let diff = diff_catalogs(old, new);
    let violations = find_additive_violations(&diff);
    EvolutionReport { diff, violations }
}

/// Enforces that a catalog-level version bump is consistent with whether
/// the change set between `old` and `new` was additive-only.
pub fn enforce_version_bump(old: &EntitySchema, new: &EntitySchema, additive_only: bool) -> Result<()> {
    if old.schema_version.is_allowed_bump(&new.schema_version, additive_only) {
        Ok(())
    } else {
        Err(EvolutionError::DisallowedVersionBump {
            old: old.schema_version.to_string(),
            new: new.schema_version.to_string(),
            additive_only,
        })
    }
}

/// Runs [`evolve`] and returns an error carrying the violation count if
/// the change set was not additive-only.
pub fn require_additive(old: &Catalog, new: &Catalog) -> Result<EvolutionReport> {
    let report = evolve(old, new);
    if report.is_additive() {
        Ok(report)
    } else {
        Err(EvolutionError::NotAdditive {
            old: format!("{} entity type(s)", old.schemas.len()),
            new: format!("{} entity type(s)", new.schemas.len()),
            violations: report.violations.len(),
        })
    }
}

/// Rolls an entity record back to what a target schema version
/// understands: fields and relationship entries not declared in
/// `target_schema` are dropped from the returned copies. No stored data
/// is deleted; this only filters what's handed back to a caller pinned
/// to an older schema version.
pub fn project_entity(
    target_schema: &EntitySchema,
    fields: &HashMap<String, serde_json::Value>,
    relationships: &HashMap<String, Vec<String>>,
) -> (HashMap<String, serde_json::Value>, HashMap<String, Vec<String>>) {
    let known_fields = target_schema.field_names();
    let known_relationships = target_schema.relationship_names();

    let projected_fields = fields
        .iter()
        .filter(|(name, _)| known_fields.contains(name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let projected_relationships = relationships
        .iter()
        .filter(|(name, _)| known_relationships.contains(name.as_str()))
        .map(|(name, targets)| (name.clone(), targets.clone()))
        .collect();

    (projected_fields, projected_relationships)
}
