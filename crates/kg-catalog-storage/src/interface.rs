//! The abstract storage contract the apply orchestrator and validation
//! pipeline's Layer 5 depend on.

use std::collections::HashMap;

use async_trait::async_trait;
use kg_catalog_core::schema::Catalog;

use crate::error::Result;
use crate::models::{DryRunResult, EntityData, HealthCheckResult, QueryResult, RelationshipData, SystemMetrics};

/// Backend-agnostic graph storage operations. Every method is retriable
/// except `disconnect`, `delete_entity`, `remove_relationship`,
/// `get_entity_relationships` and `dry_run_apply`, which either have no
/// meaningful retry semantics or are destructive and must not be
/// silently repeated by a caller.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self);

    async fn health_check(&self) -> HealthCheckResult;

    /// Loads schemas from `schema_dir`, builds the catalog, and projects
    /// the backing graph schema into the backend.
    async fn load_schemas(&self, schema_dir: &str) -> Result<Catalog>;

    /// Upserts keyed by `(entity_type, entity_id)`: if the id already
    /// exists its fields are updated and `created_at` is preserved;
    /// otherwise a new entity is created. Never creates a duplicate node
    /// for an id that already exists.
    async fn store_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        metadata: HashMap<String, serde_json::Value>,
        system_metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String>;

    async fn get_entity(&self, entity_type: &str, entity_id: &str) -> Result<Option<EntityData>>;

    async fn delete_entity(&self, entity_type: &str, entity_id: &str) -> Result<bool>;

    async fn list_entities(
        &self,
        entity_type: &str,
        filters: &HashMap<String, serde_json::Value>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EntityData>>;

    /// Checks existence by canonical id across all entity types. Used by
    /// Layer 5 reference-existence validation.
    async fn entity_exists(&self, entity_id: &str) -> Result<bool>;

    /// Must be safe to call when neither endpoint exists yet in the
    /// backend.
    async fn create_relationship(
        &self,
        source_entity_type: &str,
        source_entity_id: &str,
        relationship_type: &str,
        target_entity_type: &str,
        target_entity_id: &str,
    ) -> Result<bool>;

    async fn remove_relationship(
        &self,
        source_entity_type: &str,
        source_entity_id: &str,
        relationship_type: &str,
        target_entity_type: &str,
        target_entity_id: &str,
    ) -> Result<bool>;

    async fn remove_relationships_by_type(
        &self,
        source_entity_type: &str,
        source_entity_id: &str,
        relationship_type: &str,
    ) -> Result<usize>;

    async fn get_entity_relationships(&self, entity_type: &str, entity_id: &str) -> Result<Vec<RelationshipData>>;

    async fn get_system_metrics(&self) -> Result<SystemMetrics>;

    /// Never raises; a backend failure is reported inside the result.
    async fn execute_query(&self, query: &str, variables: Option<&HashMap<String, serde_json::Value>>) -> QueryResult;

    /// Simulates applying `records` without writing anything. `records`
    /// carries the same shape the apply orchestrator extracts: each
    /// entry has `entity_type` and `entity_id` keys plus the candidate
    /// metadata under `metadata`.
    async fn dry_run_apply(&self, records: &[HashMap<String, serde_json::Value>]) -> DryRunResult;
}
