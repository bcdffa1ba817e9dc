//! Projects a [`Catalog`] into a Draft 2020-12 JSON Schema document, for
//! IDE integration. Pure projection, no storage dependency — the catalog
//! is the only input.

use serde_json::{json, Value};

use crate::schema::{Catalog, EntitySchema, FieldDefinition};
use crate::types::SemanticType;

fn field_schema(field: &FieldDefinition) -> Value {
    let mut schema = match field.field_type {
        SemanticType::String => json!({ "type": "string" }),
        SemanticType::Integer => json!({ "type": "integer" }),
        SemanticType::Boolean => json!({ "type": "boolean" }),
        SemanticType::Datetime => json!({ "type": "string", "format": "date-time" }),
        SemanticType::Array => json!({ "type": "array" }),
        SemanticType::Object => json!({ "type": "object" }),
    };
    let obj = schema.as_object_mut().unwrap();

    if let Some(max) = field.constraints.max_length {
        obj.insert("maxLength".to_string(), json!(max));
    }
    if let Some(min) = field.constraints.min_length {
        obj.insert("minLength".to_string(), json!(min));
    }
    if let Some(pattern) = &field.constraints.pattern {
        obj.insert("pattern".to_string(), json!(pattern));
    }
    if let Some(allowed) = &field.constraints.allowed_values {
        obj.insert("enum".to_string(), json!(allowed));
    }
    if matches!(field.field_type, SemanticType::Array) {
        if let Some(min) = field.constraints.min_items {
            obj.insert("minItems".to_string(), json!(min));
        }
        if let Some(max) = field.constraints.max_items {
            obj.insert("maxItems".to_string(), json!(max));
        }
        if let Some(items_type) = field.constraints.items {
            obj.insert("items".to_string(), json!({ "type": items_type.to_string() }));
        }
    }
    schema
}

/// Builds the `entityDef` sub-schema for one entity type, excluding
/// readonly fields (they are server-managed, never authored).
fn entity_def(schema: &EntitySchema) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for field in schema.required_fields.iter().chain(schema.optional_fields.iter()) {
        properties.insert(field.name.clone(), field_schema(field));
        if field.required {
            required.push(field.name.clone());
        }
    }

    let mut def = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        def.as_object_mut()
            .unwrap()
            .insert("required".to_string(), json!(required));
    }
    if !schema.allow_custom_fields {
        def.as_object_mut()
            .unwrap()
            .insert("additionalProperties".to_string(), json!(false));
    }
    def
}

/// Projects the catalog into a complete Draft 2020-12 document whose
/// top-level shape mirrors the descriptor format: `namespace` and
/// `entity`, where `entity` is closed over the catalog's known entity
/// types and each is an array of single-key `{entity_name: entityDef}`
/// maps.
pub fn export(catalog: &Catalog) -> Value {
    let mut entity_properties = serde_json::Map::new();
    let mut defs = serde_json::Map::new();

    defs.insert(
        "externalReference".to_string(),
        json!({
            "type": "string",
            "pattern": r"^external://[^/]+/.+/[^/]+$"
        }),
    );
    defs.insert(
        "internalReference".to_string(),
        json!({
            "type": "string",
            "pattern": r"^internal://.+/.+$"
        }),
    );

    for (entity_type, schema) in &catalog.schemas {
        entity_properties.insert(
            entity_type.clone(),
            json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "patternProperties": {
                        "^.+$": entity_def(schema)
                    },
                    "minProperties": 1,
                    "maxProperties": 1,
                    "additionalProperties": false
                }
            }),
        );
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["namespace", "entity"],
        "properties": {
            "namespace": {
                "type": "string",
                "pattern": "^[a-z]([a-z0-9_-]*[a-z0-9])?$"
            },
            "entity": {
                "type": "object",
                "properties": entity_properties,
                "additionalProperties": false
            }
        },
        "$defs": defs
    })
}
