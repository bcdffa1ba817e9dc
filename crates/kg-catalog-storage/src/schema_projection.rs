//! Projects a loaded catalog's field definitions into the backend's
//! backing graph schema: predicate declarations plus a per-entity-type
//! list of the predicates it carries.

use std::collections::HashMap;

use kg_catalog_core::schema::Catalog;
use kg_catalog_core::types::SemanticType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateType {
    String,
    Int,
    Bool,
    StringList,
    Datetime,
}

impl PredicateType {
    fn from_semantic(semantic: SemanticType) -> Self {
        match semantic {
            SemanticType::String => PredicateType::String,
            SemanticType::Integer => PredicateType::Int,
            SemanticType::Boolean => PredicateType::Bool,
            SemanticType::Array => PredicateType::StringList,
            SemanticType::Object => PredicateType::String,
            SemanticType::Datetime => PredicateType::Datetime,
        }
    }

    /// Whether this predicate type receives an exact index in the
    /// projected schema.
    fn is_exact_indexed(self) -> bool {
        matches!(self, PredicateType::String | PredicateType::Int | PredicateType::Bool)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BackingSchema {
    pub predicates: HashMap<String, PredicateType>,
    pub exact_indices: Vec<String>,
    /// entity_type -> ordered field-predicate names it declares.
    pub type_declarations: HashMap<String, Vec<String>>,
}

/// Projects the union of every entity type's field names into predicate
/// declarations, plus `entity_id`/`entity_type` indices and one type
/// declaration per entity type.
pub fn project_catalog(catalog: &Catalog) -> BackingSchema {
    let mut schema = BackingSchema::default();

    schema.predicates.insert("entity_id".to_string(), PredicateType::String);
    schema.predicates.insert("entity_type".to_string(), PredicateType::String);
    schema.exact_indices.push("entity_id".to_string());
    schema.exact_indices.push("entity_type".to_string());

    for entity_schema in catalog.schemas.values() {
        let mut predicate_names: Vec<String> = entity_schema.all_fields().map(|f| f.name.clone()).collect();
        predicate_names.sort();
        predicate_names.dedup();

        for field in entity_schema.all_fields() {
            let predicate_type = PredicateType::from_semantic(field.field_type);
            schema.predicates.entry(field.name.clone()).or_insert(predicate_type);
            if predicate_type.is_exact_indexed() && !schema.exact_indices.contains(&field.name) {
                schema.exact_indices.push(field.name.clone());
            }
        }

        schema.type_declarations.insert(entity_schema.entity_type.clone(), predicate_names);
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use kg_catalog_core::schema::{EntitySchema, FieldDefinition, SchemaPolicies};
    use kg_catalog_core::SchemaVersion;
    use std::collections::HashSet;

    #[test]
    fn projects_predicate_types_from_semantic_types() {
        let schema = EntitySchema {
            entity_type: "repository".into(),
            schema_version: SchemaVersion::new(1, 0, 0),
            extends: None,
            description: None,
            required_fields: vec![FieldDefinition::new("owners", SemanticType::Array, true)],
            optional_fields: vec![FieldDefinition::new("stars", SemanticType::Integer, false)],
            readonly_fields: vec![],
            relationships: vec![],
            validation_rules: HashMap::new(),
            backing_type: "Repository".into(),
            backing_predicates: HashMap::new(),
            policies: SchemaPolicies::default(),
            allow_custom_fields: false,
        };
        let mut schemas = HashMap::new();
        schemas.insert(schema.entity_type.clone(), schema);
        let catalog = Catalog::new(schemas, HashSet::new());

        let backing = project_catalog(&catalog);
        assert_eq!(backing.predicates.get("owners"), Some(&PredicateType::StringList));
        assert_eq!(backing.predicates.get("stars"), Some(&PredicateType::Int));
        assert!(backing.exact_indices.contains(&"stars".to_string()));
        assert!(!backing.exact_indices.contains(&"owners".to_string()));
        assert!(backing.type_declarations.contains_key("repository"));
    }
}
