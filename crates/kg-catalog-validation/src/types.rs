//! Shared types for the validation pipeline: the "model" a successful
//! Layer 3 pass materializes, and the trait Layer 5 calls into for
//! reference-existence checks.

use std::collections::HashMap;

use kg_catalog_core::Descriptor;

pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1.0.0"];

/// One entity body that survived Layers 1–3, with relationship-named
/// metadata keys already folded in per the legacy-compatibility rule.
#[derive(Debug, Clone)]
pub struct ModelEntity {
    pub entity_type: String,
    pub entity_name: String,
    pub fields: HashMap<String, serde_json::Value>,
    pub legacy_depends_on: Vec<String>,
    pub relationships: HashMap<String, Vec<String>>,
}

/// The validated tree Layer 3 materializes. Only present when every
/// Layer 3 body check passed; its absence is what forces the pipeline to
/// exit without running Layers 4–5.
#[derive(Debug, Clone)]
pub struct ValidatedModel {
    pub schema_version: String,
    pub namespace: String,
    pub entities: Vec<ModelEntity>,
}

impl ValidatedModel {
    pub fn from_descriptor(descriptor: &Descriptor) -> Self {
        let entities = descriptor
            .iter_entities()
            .map(|(entity_type, entity_name, body)| ModelEntity {
                entity_type: entity_type.to_string(),
                entity_name: entity_name.to_string(),
                fields: body.fields.clone(),
                legacy_depends_on: body.legacy_depends_on.clone(),
                relationships: body.relationships.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            schema_version: descriptor.schema_version.clone(),
            namespace: descriptor.namespace.clone(),
            entities,
        }
    }
}

/// Layer 5's sole dependency: resolve whether a canonical internal entity
/// id is known to the backend. Implemented by storage-aware crates;
/// validation itself never talks to a backend.
pub trait EntityExistenceChecker {
    async fn entity_exists(&self, entity_type: &str, entity_id: &str) -> bool;
}

/// A checker that reports every reference as missing. Useful for tests
/// exercising the `reference_not_found` path without a real backend.
pub struct AlwaysAbsent;

impl EntityExistenceChecker for AlwaysAbsent {
    async fn entity_exists(&self, _entity_type: &str, _entity_id: &str) -> bool {
        false
    }
}
