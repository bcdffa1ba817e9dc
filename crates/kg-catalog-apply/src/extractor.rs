//! Flattens a validated model into the ordered records the orchestrator
//! feeds to storage: `{entity_type, entity_id, metadata, relationships,
//! system_metadata}`.

use std::collections::HashMap;

use kg_catalog_validation::{ModelEntity, ValidatedModel};

#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub entity_type: String,
    pub entity_id: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub relationships: HashMap<String, Vec<String>>,
    pub system_metadata: HashMap<String, serde_json::Value>,
}

fn extract_one(namespace: &str, source_name: &str, entity: &ModelEntity) -> EntityRecord {
    let mut system_metadata = HashMap::new();
    system_metadata.insert("namespace".to_string(), serde_json::json!(namespace));
    system_metadata.insert("source_name".to_string(), serde_json::json!(source_name));

    let mut metadata = entity.fields.clone();
    let mut relationships = entity.relationships.clone();

    // The legacy inline `depends_on` array is a relationship-named key
    // that appears directly in the body rather than under the nested
    // `relationships` map; fold it into both so neither form is silently
    // dropped and a descriptor mixing the two gets the union of targets.
    if !entity.legacy_depends_on.is_empty() {
        let mut depends_on = relationships.remove("depends_on").unwrap_or_default();
        for target in &entity.legacy_depends_on {
            if !depends_on.contains(target) {
                depends_on.push(target.clone());
            }
        }
        metadata.insert("depends_on".to_string(), serde_json::json!(depends_on));
        relationships.insert("depends_on".to_string(), depends_on);
    }

    EntityRecord {
        entity_type: entity.entity_type.clone(),
        entity_id: format!("{namespace}/{}", entity.entity_name),
        metadata,
        relationships,
        system_metadata,
    }
}

/// Extracts one record per entity in descriptor order. `source_name`
/// identifies where the descriptor came from (a file path, typically) and
/// is carried into each record's system metadata.
pub fn extract_records(model: &ValidatedModel, source_name: &str) -> Vec<EntityRecord> {
    model.entities.iter().map(|entity| extract_one(&model.namespace, source_name, entity)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    #[test]
    fn builds_namespaced_entity_id_and_system_metadata() {
        let model = ValidatedModel {
            schema_version: "1.0.0".to_string(),
            namespace: "demo".to_string(),
            entities: vec![ModelEntity {
                entity_type: "repository".to_string(),
                entity_name: "r1".to_string(),
                fields: StdHashMap::from([("owners".to_string(), serde_json::json!(["a@x.com"]))]),
                legacy_depends_on: vec![],
                relationships: StdHashMap::from([("depends_on".to_string(), vec!["external://pypi/requests/2.31.0".to_string()])]),
            }],
        };

        let records = extract_records(&model, "descriptors/demo.yaml");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_id, "demo/r1");
        assert_eq!(records[0].system_metadata.get("namespace"), Some(&serde_json::json!("demo")));
        assert_eq!(records[0].relationships.get("depends_on").unwrap().len(), 1);
    }

    #[test]
    fn legacy_inline_depends_on_is_merged_into_metadata_and_relationships() {
        let model = ValidatedModel {
            schema_version: "1.0.0".to_string(),
            namespace: "demo".to_string(),
            entities: vec![ModelEntity {
                entity_type: "repository".to_string(),
                entity_name: "r1".to_string(),
                fields: StdHashMap::from([("owners".to_string(), serde_json::json!(["a@x.com"]))]),
                legacy_depends_on: vec!["external://pypi/requests/2.31.0".to_string()],
                relationships: StdHashMap::new(),
            }],
        };

        let records = extract_records(&model, "descriptors/demo.yaml");
        let record = &records[0];
        assert_eq!(record.metadata.get("depends_on"), Some(&serde_json::json!(["external://pypi/requests/2.31.0"])));
        assert_eq!(record.relationships.get("depends_on").unwrap(), &vec!["external://pypi/requests/2.31.0".to_string()]);
    }

    #[test]
    fn legacy_and_nested_depends_on_are_unioned_without_duplicates() {
        let model = ValidatedModel {
            schema_version: "1.0.0".to_string(),
            namespace: "demo".to_string(),
            entities: vec![ModelEntity {
                entity_type: "repository".to_string(),
                entity_name: "r1".to_string(),
                fields: StdHashMap::new(),
                legacy_depends_on: vec!["external://pypi/requests/2.31.0".to_string()],
                relationships: StdHashMap::from([("depends_on".to_string(), vec!["external://pypi/requests/2.31.0".to_string(), "external://npm/left-pad/1.3.0".to_string()])]),
            }],
        };

        let records = extract_records(&model, "descriptors/demo.yaml");
        let depends_on = records[0].relationships.get("depends_on").unwrap();
        assert_eq!(depends_on.len(), 2);
    }
}
