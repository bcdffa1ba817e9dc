//! In-memory reference implementation of [`GraphStore`], used by the CLI's
//! local mode and by the orchestrator's and validation pipeline's tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use kg_catalog_core::schema::Catalog;

use crate::error::Result;
use crate::interface::GraphStore;
use crate::models::{
    DryRunEntityOperation, DryRunOperation, DryRunResult, EntityCounts, EntityData, HealthCheckResult, HealthStatus,
    IssueSeverity, QueryResult, RelationshipData, RelationshipTarget, SystemMetrics, ValidationIssue,
};
use crate::schema_projection::project_catalog;

#[derive(Debug, Clone)]
struct StoredEntity {
    metadata: HashMap<String, serde_json::Value>,
    system_metadata: HashMap<String, serde_json::Value>,
    relationships: HashMap<String, Vec<String>>,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    connected: bool,
    entities: HashMap<String, HashMap<String, StoredEntity>>,
    catalog: Option<Catalog>,
}

/// Holds everything in a `parking_lot::RwLock`-guarded map; no real I/O.
pub struct MemoryGraphStore {
    store: RwLock<Store>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self { store: RwLock::new(Store::default()) }
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn to_entity_data(entity_type: &str, entity_id: &str, stored: &StoredEntity) -> EntityData {
    EntityData {
        id: entity_id.to_string(),
        entity_type: entity_type.to_string(),
        metadata: stored.metadata.clone(),
        relationships: stored.relationships.clone(),
        system_metadata: stored.system_metadata.clone(),
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn connect(&self) -> Result<()> {
        self.store.write().connected = true;
        Ok(())
    }

    async fn disconnect(&self) {
        self.store.write().connected = false;
    }

    async fn health_check(&self) -> HealthCheckResult {
        let store = self.store.read();
        let mut info = HashMap::new();
        let entity_count: usize = store.entities.values().map(|m| m.len()).sum();
        info.insert("entities_stored".to_string(), serde_json::json!(entity_count));
        info.insert("schema_types".to_string(), serde_json::json!(store.catalog.as_ref().map(|c| c.schemas.len()).unwrap_or(0)));

        HealthCheckResult {
            status: if store.connected { HealthStatus::Healthy } else { HealthStatus::Disconnected },
            response_time_ms: 0.0,
            backend_version: Some("memory-1.0.0".to_string()),
            info,
        }
    }

    async fn load_schemas(&self, schema_dir: &str) -> Result<Catalog> {
        let catalog = kg_catalog_loader::load_catalog(schema_dir)
            .map_err(|e| crate::error::StorageError::Operation(e.to_string()))?;
        // Projecting the backing schema is a precondition for storage
        // readiness even though this backend has no predicate DDL to send.
        let _backing = project_catalog(&catalog);
        self.store.write().catalog = Some(catalog.clone());
        Ok(catalog)
    }

    async fn store_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        metadata: HashMap<String, serde_json::Value>,
        system_metadata: HashMap<String, serde_json::Value>,
    ) -> Result<String> {
        let now = Utc::now();
        let mut store = self.store.write();
        let type_map = store.entities.entry(entity_type.to_string()).or_default();

        match type_map.get_mut(entity_id) {
            Some(existing) => {
                existing.metadata = metadata;
                existing.system_metadata = system_metadata;
                existing.updated_at = now;
            }
            None => {
                type_map.insert(
                    entity_id.to_string(),
                    StoredEntity {
                        metadata,
                        system_metadata,
                        relationships: HashMap::new(),
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(entity_id.to_string())
    }

    async fn get_entity(&self, entity_type: &str, entity_id: &str) -> Result<Option<EntityData>> {
        let store = self.store.read();
        Ok(store
            .entities
            .get(entity_type)
            .and_then(|m| m.get(entity_id))
            .map(|stored| to_entity_data(entity_type, entity_id, stored)))
    }

    async fn delete_entity(&self, entity_type: &str, entity_id: &str) -> Result<bool> {
        let mut store = self.store.write();
        Ok(store.entities.get_mut(entity_type).map(|m| m.remove(entity_id).is_some()).unwrap_or(false))
    }

    async fn list_entities(
        &self,
        entity_type: &str,
        filters: &HashMap<String, serde_json::Value>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<EntityData>> {
        let store = self.store.read();
        let Some(type_map) = store.entities.get(entity_type) else {
            return Ok(Vec::new());
        };

        let matching: Vec<EntityData> = type_map
            .iter()
            .filter(|(_, stored)| {
                filters.iter().all(|(field, value)| {
                    stored.metadata.get(field) == Some(value) || stored.system_metadata.get(field) == Some(value)
                })
            })
            .map(|(id, stored)| to_entity_data(entity_type, id, stored))
            .collect();

        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn entity_exists(&self, entity_id: &str) -> Result<bool> {
        let store = self.store.read();
        Ok(store.entities.values().any(|m| m.contains_key(entity_id)))
    }

    async fn create_relationship(
        &self,
        source_entity_type: &str,
        source_entity_id: &str,
        relationship_type: &str,
        _target_entity_type: &str,
        target_entity_id: &str,
    ) -> Result<bool> {
        let mut store = self.store.write();
        let type_map = store.entities.entry(source_entity_type.to_string()).or_default();
        let entity = type_map.entry(source_entity_id.to_string()).or_insert_with(|| StoredEntity {
            metadata: HashMap::new(),
            system_metadata: HashMap::new(),
            relationships: HashMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        let targets = entity.relationships.entry(relationship_type.to_string()).or_default();
        if !targets.contains(&target_entity_id.to_string()) {
            targets.push(target_entity_id.to_string());
        }
        Ok(true)
    }

    async fn remove_relationship(
        &self,
        source_entity_type: &str,
        source_entity_id: &str,
        relationship_type: &str,
        _target_entity_type: &str,
        target_entity_id: &str,
    ) -> Result<bool> {
        let mut store = self.store.write();
        let Some(entity) = store.entities.get_mut(source_entity_type).and_then(|m| m.get_mut(source_entity_id)) else {
            return Ok(false);
        };
        let Some(targets) = entity.relationships.get_mut(relationship_type) else {
            return Ok(false);
        };
        let before = targets.len();
        targets.retain(|t| t != target_entity_id);
        Ok(targets.len() != before)
    }

    async fn remove_relationships_by_type(
        &self,
        source_entity_type: &str,
        source_entity_id: &str,
        relationship_type: &str,
    ) -> Result<usize> {
        let mut store = self.store.write();
        let Some(entity) = store.entities.get_mut(source_entity_type).and_then(|m| m.get_mut(source_entity_id)) else {
            return Ok(0);
        };
        Ok(entity.relationships.remove(relationship_type).map(|v| v.len()).unwrap_or(0))
    }

    async fn get_entity_relationships(&self, entity_type: &str, entity_id: &str) -> Result<Vec<RelationshipData>> {
        let store = self.store.read();
        let Some(entity) = store.entities.get(entity_type).and_then(|m| m.get(entity_id)) else {
            return Ok(Vec::new());
        };

        Ok(entity
            .relationships
            .iter()
            .map(|(name, targets)| RelationshipData {
                relationship_name: name.clone(),
                target_entities: targets
                    .iter()
                    .map(|target_id| RelationshipTarget { entity_type: "unknown".to_string(), entity_id: target_id.clone() })
                    .collect(),
            })
            .collect())
    }

    async fn get_system_metrics(&self) -> Result<SystemMetrics> {
        let store = self.store.read();
        let mut by_type = HashMap::new();
        let mut total = 0;
        let mut total_relationships = 0;
        for (entity_type, entities) in &store.entities {
            by_type.insert(entity_type.clone(), entities.len());
            total += entities.len();
            for entity in entities.values() {
                total_relationships += entity.relationships.values().map(|v| v.len()).sum::<usize>();
            }
        }

        Ok(SystemMetrics {
            entity_counts: EntityCounts { by_type, total },
            total_relationships,
            storage_size_estimate_bytes: 0,
            last_updated: Utc::now(),
            backend_info: HashMap::from([("backend".to_string(), serde_json::json!("memory"))]),
        })
    }

    async fn execute_query(&self, query: &str, variables: Option<&HashMap<String, serde_json::Value>>) -> QueryResult {
        if query.to_lowercase().contains("error") {
            return QueryResult { success: false, data: serde_json::Value::Null, time_ms: 0.0, error: Some("query error".to_string()) };
        }
        QueryResult {
            success: true,
            data: serde_json::json!({"query": query, "variables": variables.cloned().unwrap_or_default()}),
            time_ms: 0.0,
            error: None,
        }
    }

    async fn dry_run_apply(&self, records: &[HashMap<String, serde_json::Value>]) -> DryRunResult {
        let store = self.store.read();
        let mut result = DryRunResult::default();

        for record in records {
            let entity_type = record.get("entity_type").and_then(|v| v.as_str());
            let entity_id = record.get("entity_id").and_then(|v| v.as_str());

            let (Some(entity_type), Some(entity_id)) = (entity_type, entity_id) else {
                result.issues.push(ValidationIssue {
                    severity: IssueSeverity::Error,
                    message: "record missing entity_type or entity_id".to_string(),
                });
                continue;
            };

            let exists = store.entities.get(entity_type).map(|m| m.contains_key(entity_id)).unwrap_or(false);
            let operation = DryRunEntityOperation { entity_type: entity_type.to_string(), entity_id: entity_id.to_string(), operation: if exists {
                DryRunOperation::Update
            } else {
                DryRunOperation::Create
            } };

            if exists {
                result.would_update.push(operation);
            } else {
                result.would_create.push(operation);
            }
        }

        result.summary.insert("would_create".to_string(), result.would_create.len());
        result.summary.insert("would_update".to_string(), result.would_update.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_entity_upserts_instead_of_duplicating() {
        let store = MemoryGraphStore::new();
        store.connect().await.unwrap();

        let first = store.store_entity("repository", "org/repo", HashMap::new(), HashMap::new()).await.unwrap();
        let second = store
            .store_entity(
                "repository",
                "org/repo",
                HashMap::from([("description".to_string(), serde_json::json!("updated"))]),
                HashMap::new(),
            )
            .await
            .unwrap();

        assert_eq!(first, second);
        let entities = store.list_entities("repository", &HashMap::new(), 50, 0).await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].metadata.get("description"), Some(&serde_json::json!("updated")));
        assert_eq!(entities[0].created_at, entities[0].created_at);
    }

    #[tokio::test]
    async fn store_entity_preserves_created_at_across_updates() {
        let store = MemoryGraphStore::new();
        store.store_entity("repository", "org/repo", HashMap::new(), HashMap::new()).await.unwrap();
        let first = store.get_entity("repository", "org/repo").await.unwrap().unwrap();

        store.store_entity("repository", "org/repo", HashMap::new(), HashMap::new()).await.unwrap();
        let second = store.get_entity("repository", "org/repo").await.unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn remove_relationships_by_type_counts_removed() {
        let store = MemoryGraphStore::new();
        store.create_relationship("repository", "org/repo", "depends_on", "external_dependency_version", "a").await.unwrap();
        store.create_relationship("repository", "org/repo", "depends_on", "external_dependency_version", "b").await.unwrap();

        let removed = store.remove_relationships_by_type("repository", "org/repo", "depends_on").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.remove_relationships_by_type("repository", "org/repo", "depends_on").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn entity_exists_checks_across_all_types() {
        let store = MemoryGraphStore::new();
        store.store_entity("repository", "org/repo", HashMap::new(), HashMap::new()).await.unwrap();
        assert!(store.entity_exists("org/repo").await.unwrap());
        assert!(!store.entity_exists("org/missing").await.unwrap());
    }

    #[tokio::test]
    async fn dry_run_apply_reports_create_vs_update() {
        let store = MemoryGraphStore::new();
        store.store_entity("repository", "org/existing", HashMap::new(), HashMap::new()).await.unwrap();

        let records = vec![
            HashMap::from([
                ("entity_type".to_string(), serde_json::json!("repository")),
                ("entity_id".to_string(), serde_json::json!("org/existing")),
            ]),
            HashMap::from([
                ("entity_type".to_string(), serde_json::json!("repository")),
                ("entity_id".to_string(), serde_json::json!("org/new")),
            ]),
        ];

        let result = store.dry_run_apply(&records).await;
        assert_eq!(result.would_update.len(), 1);
        assert_eq!(result.would_create.len(), 1);
    }
}
