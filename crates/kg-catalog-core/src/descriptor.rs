//! The raw shape of a user-authored descriptor document, prior to
//! validation. Layer 1 (syntax) produces this from YAML bytes; Layer 3
//! (field format) is what turns it into a "model" the later layers trust.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level descriptor document. `entity` is keyed by entity type; an
/// `IndexMap` keeps those types in the order they were written, so
/// cross-type apply order matches the document instead of a hash order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub schema_version: String,
    pub namespace: String,
    pub entity: IndexMap<String, Vec<HashMap<String, EntityBody>>>,
}

/// One entity's declared fields and relationships. `legacy_depends_on`
/// captures the deprecated inline `depends_on` array; `relationships` is
/// the preferred nested form. A single entity body may carry both; the
/// descriptor extractor unions the two into one `depends_on` target set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityBody {
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,

    #[serde(default, rename = "depends_on", skip_serializing_if = "Vec::is_empty")]
    pub legacy_depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<HashMap<String, Vec<String>>>,
}

impl Descriptor {
    /// Iterate `(entity_type, entity_name, body)` triples in document
    /// order, matching the ordering guarantee the apply orchestrator
    /// relies on.
    pub fn iter_entities(&self) -> impl Iterator<Item = (&str, &str, &EntityBody)> {
        self.entity.iter().flat_map(|(entity_type, list)| {
            list.iter().flat_map(move |single_key_map| {
                single_key_map
                    .iter()
                    .map(move |(name, body)| (entity_type.as_str(), name.as_str(), body))
            })
        })
    }

    /// True when every entry under `entity` is a list of single-key maps,
    /// as the root schema requires.
    pub fn entities_are_single_key_maps(&self) -> bool {
        self.entity
            .values()
            .all(|list| list.iter().all(|m| m.len() == 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iterates_entities_preserving_document_order() {
        let mut repo_list = Vec::new();
        let mut m1 = HashMap::new();
        m1.insert(
            "r1".to_string(),
            EntityBody {
                fields: HashMap::from([("owners".to_string(), json!(["a@x.com"]))]),
                legacy_depends_on: vec![],
                relationships: None,
            },
        );
        repo_list.push(m1);

        let mut entity = IndexMap::new();
        entity.insert("repository".to_string(), repo_list);

        let descriptor = Descriptor {
            schema_version: "1.0.0".into(),
            namespace: "demo".into(),
            entity,
        };

        let names: Vec<&str> = descriptor.iter_entities().map(|(_, name, _)| name).collect();
        assert_eq!(names, vec!["r1"]);
    }

    #[test]
    fn iterates_entity_types_in_insertion_order() {
        let mut entity = IndexMap::new();
        entity.insert("service".to_string(), vec![HashMap::from([("s1".to_string(), EntityBody::default())])]);
        entity.insert("repository".to_string(), vec![HashMap::from([("r1".to_string(), EntityBody::default())])]);
        entity.insert("team".to_string(), vec![HashMap::from([("t1".to_string(), EntityBody::default())])]);

        let descriptor = Descriptor {
            schema_version: "1.0.0".into(),
            namespace: "demo".into(),
            entity,
        };

        let types: Vec<&str> = descriptor.iter_entities().map(|(entity_type, _, _)| entity_type).collect();
        assert_eq!(types, vec!["service", "repository", "team"]);
    }

    #[test]
    fn detects_multi_key_map_violation() {
        let mut bad_map = HashMap::new();
        bad_map.insert("r1".to_string(), EntityBody::default());
        bad_map.insert("r2".to_string(), EntityBody::default());

        let mut entity = IndexMap::new();
        entity.insert("repository".to_string(), vec![bad_map]);

        let descriptor = Descriptor {
            schema_version: "1.0.0".into(),
            namespace: "demo".into(),
            entity,
        };
        assert!(!descriptor.entities_are_single_key_maps());
    }
}
