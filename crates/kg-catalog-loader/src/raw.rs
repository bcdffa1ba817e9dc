//! Raw, pre-validation YAML shapes for base and entity schema files.
//! These mirror the schema file format on disk; [`crate::build`] turns
//! them into [`kg_catalog_core::EntitySchema`] values.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBaseSchema {
    #[serde(default)]
    pub schema_type: Option<String>,
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub governance: Option<String>,
    #[serde(default)]
    pub readonly_metadata: HashMap<String, RawFieldConfig>,
    #[serde(default)]
    pub validation_rules: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub deletion_policy: Option<String>,
    #[serde(default)]
    pub allow_custom_fields: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntitySchema {
    pub entity_type: String,
    pub schema_version: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_metadata: HashMap<String, RawFieldConfig>,
    #[serde(default)]
    pub optional_metadata: HashMap<String, RawFieldConfig>,
    #[serde(default)]
    pub readonly_metadata: HashMap<String, RawFieldConfig>,
    #[serde(default)]
    pub relationships: HashMap<String, RawRelationshipConfig>,
    #[serde(default)]
    pub validation_rules: HashMap<String, serde_json::Value>,
    pub dgraph_type: String,
    #[serde(default)]
    pub dgraph_predicates: HashMap<String, String>,
    #[serde(default)]
    pub governance: Option<String>,
    #[serde(default)]
    pub deletion_policy: Option<String>,
    #[serde(default)]
    pub auto_creation: Option<String>,
    #[serde(default)]
    pub allow_custom_fields: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFieldConfig {
    #[serde(default = "default_field_type")]
    pub r#type: String,
    #[serde(default)]
    pub validation: Option<String>,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min_items: Option<usize>,
    #[serde(default)]
    pub max_items: Option<usize>,
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub items: Option<String>,
}

fn default_field_type() -> String {
    "string".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRelationshipConfig {
    #[serde(default)]
    pub target_types: Vec<String>,
    #[serde(default = "default_cardinality")]
    pub cardinality: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_cardinality() -> String {
    "one_to_many".to_string()
}

fn default_direction() -> String {
    "outbound".to_string()
}
