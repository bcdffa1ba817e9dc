//! The catalog's schema data structures: field and relationship
//! definitions, entity schemas, and the catalog that holds them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::{Cardinality, DeprecationInfo, Direction, SemanticType, ValidationTag};
use crate::versioning::SchemaVersion;

/// Extra constraints layered onto a field beyond its semantic type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub pattern: Option<String>,
    pub allowed_values: Option<Vec<String>>,
    pub items: Option<SemanticType>,
}

/// A field as declared in an entity schema. Immutable once the catalog
/// has finished loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: SemanticType,
    pub required: bool,
    pub validation: Option<ValidationTag>,
    pub constraints: FieldConstraints,
    pub indexed: bool,
    pub deprecation: DeprecationInfo,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: SemanticType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
            validation: None,
            constraints: FieldConstraints::default(),
            indexed: false,
            deprecation: DeprecationInfo::default(),
        }
    }

    pub fn with_validation(mut self, tag: ValidationTag) -> Self {
        self.validation = Some(tag);
        self
    }

    pub fn with_constraints(mut self, constraints: FieldConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// A relationship as declared in an entity schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    pub name: String,
    pub target_types: Vec<String>,
    pub cardinality: Cardinality,
    pub direction: Direction,
    pub deprecation: DeprecationInfo,
}

impl RelationshipDefinition {
    pub fn new(
        name: impl Into<String>,
        target_types: Vec<String>,
        cardinality: Cardinality,
        direction: Direction,
    ) -> Self {
        Self {
            name: name.into(),
            target_types,
            cardinality,
            direction,
            deprecation: DeprecationInfo::default(),
        }
    }
}

/// Governance / deletion / auto-creation policy tags carried on an entity
/// schema; these are opaque strings from the loader's perspective and
/// interpreted by collaborators (storage, CLI reporting).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaPolicies {
    pub governance: Option<String>,
    pub deletion_policy: Option<String>,
    pub auto_creation: Option<String>,
}

/// A fully loaded entity schema. Produced by the loader; never mutated
/// after the catalog it belongs to has been built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    pub schema_version: SchemaVersion,
    pub extends: Option<String>,
    pub description: Option<String>,
    pub required_fields: Vec<FieldDefinition>,
    pub optional_fields: Vec<FieldDefinition>,
    pub readonly_fields: Vec<FieldDefinition>,
    pub relationships: Vec<RelationshipDefinition>,
    pub validation_rules: HashMap<String, serde_json::Value>,
    pub backing_type: String,
    pub backing_predicates: HashMap<String, String>,
    pub policies: SchemaPolicies,
    pub allow_custom_fields: bool,
}

impl EntitySchema {
    /// All field definitions across the three disjoint groups.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.required_fields
            .iter()
            .chain(self.optional_fields.iter())
            .chain(self.readonly_fields.iter())
    }

    pub fn field_names(&self) -> HashSet<&str> {
        self.all_fields().map(|f| f.name.as_str()).collect()
    }

    pub fn relationship_names(&self) -> HashSet<&str> {
        self.relationships.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.all_fields().find(|f| f.name == name)
    }

    pub fn find_relationship(&self, name: &str) -> Option<&RelationshipDefinition> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Field names that appear in more than one of the three groups, or
    /// that collide with a relationship name. Empty means the schema
    /// satisfies the disjointness invariants of the data model.
    pub fn name_conflicts(&self) -> Vec<String> {
        let mut seen: HashMap<&str, u32> = HashMap::new();
        for f in self.all_fields() {
            *seen.entry(f.name.as_str()).or_insert(0) += 1;
        }
        let mut conflicts: Vec<String> = seen
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(name, _)| name.to_string())
            .collect();

        let field_names = self.field_names();
        for rel in &self.relationships {
            if field_names.contains(rel.name.as_str()) {
                conflicts.push(rel.name.clone());
            }
        }
        conflicts.sort();
        conflicts.dedup();
        conflicts
    }
}

/// The loaded, validated set of [`EntitySchema`]s keyed by entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub schemas: HashMap<String, EntitySchema>,
    pub loaded_at: DateTime<Utc>,
    pub base_derived: HashSet<String>,
}

impl Catalog {
    pub fn new(schemas: HashMap<String, EntitySchema>, base_derived: HashSet<String>) -> Self {
        Self {
            schemas,
            loaded_at: Utc::now(),
            base_derived,
        }
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    pub fn get(&self, entity_type: &str) -> Option<&EntitySchema> {
        self.schemas.get(entity_type)
    }

    pub fn contains_type(&self, entity_type: &str) -> bool {
        self.schemas.contains_key(entity_type)
    }
}
