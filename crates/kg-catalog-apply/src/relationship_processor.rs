//! Replaces an entity's relationships of every schema-declared type with
//! exactly the targets the descriptor named for that type.

use std::collections::HashMap;

use kg_catalog_core::schema::{Catalog, RelationshipDefinition};
use kg_catalog_core::uri::DependencyUri;
use kg_catalog_storage::GraphStore;

use crate::error::{ApplyError, Result};

fn target_type_for(relationship: &RelationshipDefinition, target_id: &str) -> String {
    match DependencyUri::parse(target_id) {
        DependencyUri::External { .. } => {
            let segments = target_id.trim_start_matches("external://").split('/').count();
            if segments >= 3 {
                "external_dependency_version".to_string()
            } else {
                "external_dependency_package".to_string()
            }
        }
        DependencyUri::Internal { .. } => {
            if relationship.target_types.iter().any(|t| t == "repository") {
                "repository".to_string()
            } else {
                relationship.target_types.first().cloned().unwrap_or_else(|| "unknown".to_string())
            }
        }
        DependencyUri::None => relationship.target_types.first().cloned().unwrap_or_else(|| "unknown".to_string()),
    }
}

/// For every relationship the entity's schema declares, removes all
/// existing edges of that type and recreates exactly the targets named in
/// `descriptor_relationships`. A relationship declared in the schema but
/// absent from the descriptor ends up with an empty edge set.
pub async fn replace_relationships(
    storage: &dyn GraphStore,
    catalog: &Catalog,
    entity_type: &str,
    entity_id: &str,
    descriptor_relationships: &HashMap<String, Vec<String>>,
) -> Result<()> {
    let schema = catalog
        .get(entity_type)
        .ok_or_else(|| ApplyError::CatalogLoad(format!("no schema for entity type '{entity_type}'")))?;

    for relationship in &schema.relationships {
        storage
            .remove_relationships_by_type(entity_type, entity_id, &relationship.name)
            .await
            .map_err(|source| ApplyError::Storage { entity_type: entity_type.to_string(), entity_id: entity_id.to_string(), source })?;

        let targets = descriptor_relationships.get(&relationship.name).cloned().unwrap_or_default();
        for target_id in targets {
            let target_type = target_type_for(relationship, &target_id);
            storage
                .create_relationship(entity_type, entity_id, &relationship.name, &target_type, &target_id)
                .await
                .map_err(|source| ApplyError::Storage {
                    entity_type: entity_type.to_string(),
                    entity_id: entity_id.to_string(),
                    source,
                })?;
        }
    }

    Ok(())
}
