//! Dynamic validator factory: compiles each loaded [`EntitySchema`] into
//! an immutable per-field check program and caches it by
//! `(entity_type, schema_version)`, as the design notes require.

use std::collections::HashMap;
use std::sync::Arc;

use kg_catalog_core::schema::{Catalog, EntitySchema, FieldDefinition};
use kg_catalog_core::types::{SemanticType, ValidationTag};
use kg_catalog_core::{Diagnostic, SchemaVersion};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;

static EMAIL_DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// A compiled, immutable validator for one entity type's body shape.
pub struct EntityValidator {
    entity_type: String,
    required: Vec<FieldDefinition>,
    optional: Vec<FieldDefinition>,
    readonly: Vec<FieldDefinition>,
    allow_custom_fields: bool,
}

impl EntityValidator {
    fn from_schema(schema: &EntitySchema) -> Self {
        Self {
            entity_type: schema.entity_type.clone(),
            required: schema.required_fields.clone(),
            optional: schema.optional_fields.clone(),
            readonly: schema.readonly_fields.clone(),
            allow_custom_fields: schema.allow_custom_fields,
        }
    }

    fn all_known_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.required.iter().chain(self.optional.iter()).chain(self.readonly.iter())
    }

    /// Validates one entity body (a JSON object tree) and returns every
    /// diagnostic found. Readonly fields are not checked against the body
    /// — they are server-managed and never authored.
    pub fn validate_body(&self, body: &serde_json::Map<String, serde_json::Value>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for field in &self.required {
            match body.get(&field.name) {
                None => diagnostics.push(
                    Diagnostic::error("missing_required_field", format!("missing required field '{}'", field.name))
                        .with_field(&field.name)
                        .with_entity(&self.entity_type)
                        .with_help(format!("add a value for '{}'", field.name)),
                ),
                Some(value) => diagnostics.extend(check_field(field, value, &self.entity_type)),
            }
        }

        for field in &self.optional {
            if let Some(value) = body.get(&field.name) {
                diagnostics.extend(check_field(field, value, &self.entity_type));
            }
        }

        if !self.allow_custom_fields {
            let known: std::collections::HashSet<&str> =
                self.all_known_fields().map(|f| f.name.as_str()).collect();
            for key in body.keys() {
                if key == "relationships" || key == "depends_on" {
                    continue;
                }
                if !known.contains(key.as_str()) {
                    diagnostics.push(
                        Diagnostic::error("extra_forbidden", format!("unknown field '{key}'"))
                            .with_field(key)
                            .with_entity(&self.entity_type)
                            .with_help("remove the field or declare it in the schema"),
                    );
                }
            }
        }

        diagnostics
    }
}

fn check_field(field: &FieldDefinition, value: &serde_json::Value, entity_type: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if !type_matches(field.field_type, value) {
        diagnostics.push(
            Diagnostic::error(
                "invalid_field_type",
                format!("field '{}' expected type {} but got {}", field.name, field.field_type, describe_json_type(value)),
            )
            .with_field(&field.name)
            .with_entity(entity_type),
        );
        return diagnostics;
    }

    match field.validation {
        Some(ValidationTag::Email) => {
            if let Some(s) = value.as_str() {
                if !EMAIL_DOMAIN_RE.is_match(s) {
                    diagnostics.push(
                        Diagnostic::error("invalid_field_format", format!("'{}' is not a valid email address", field.name))
                            .with_field(&field.name)
                            .with_entity(entity_type)
                            .with_help("use the form 'user@domain.tld'"),
                    );
                }
            }
        }
        Some(ValidationTag::Url) => {
            if let Some(s) = value.as_str() {
                if !(s.starts_with("http://") || s.starts_with("https://")) {
                    diagnostics.push(
                        Diagnostic::error("invalid_field_format", format!("'{}' must use the http or https scheme", field.name))
                            .with_field(&field.name)
                            .with_entity(entity_type)
                            .with_help("prefix the value with 'https://'"),
                    );
                }
            }
        }
        Some(ValidationTag::Enum) => {
            if let Some(s) = value.as_str() {
                if let Some(allowed) = &field.constraints.allowed_values {
                    if !allowed.iter().any(|a| a == s) {
                        diagnostics.push(
                            Diagnostic::error("invalid_field_format", format!("'{}' must be one of {:?}", field.name, allowed))
                                .with_field(&field.name)
                                .with_entity(entity_type),
                        );
                    }
                }
            }
        }
        None => {}
    }

    match field.field_type {
        SemanticType::String => {
            if let Some(s) = value.as_str() {
                if let Some(min) = field.constraints.min_length {
                    if s.len() < min {
                        diagnostics.push(
                            Diagnostic::error("invalid_field_length", format!("'{}' must be at least {} characters", field.name, min))
                                .with_field(&field.name)
                                .with_entity(entity_type),
                        );
                    }
                }
                if let Some(max) = field.constraints.max_length {
                    if s.len() > max {
                        diagnostics.push(
                            Diagnostic::error("invalid_field_length", format!("'{}' must be at most {} characters", field.name, max))
                                .with_field(&field.name)
                                .with_entity(entity_type),
                        );
                    }
                }
                if let Some(pattern) = &field.constraints.pattern {
                    if let Ok(re) = Regex::new(pattern) {
                        if !re.is_match(s) {
                            diagnostics.push(
                                Diagnostic::error("invalid_field_pattern", format!("'{}' does not match required pattern", field.name))
                                    .with_field(&field.name)
                                    .with_entity(entity_type),
                            );
                        }
                    }
                }
            }
        }
        SemanticType::Array => {
            if let Some(arr) = value.as_array() {
                if field.required && arr.is_empty() {
                    diagnostics.push(
                        Diagnostic::error("empty_required_array", format!("'{}' must not be empty", field.name))
                            .with_field(&field.name)
                            .with_entity(entity_type),
                    );
                }
                if let Some(min) = field.constraints.min_items {
                    if arr.len() < min {
                        diagnostics.push(
                            Diagnostic::error("invalid_field_length", format!("'{}' must have at least {} items", field.name, min))
                                .with_field(&field.name)
                                .with_entity(entity_type),
                        );
                    }
                }
                if let Some(max) = field.constraints.max_items {
                    if arr.len() > max {
                        diagnostics.push(
                            Diagnostic::error("invalid_field_length", format!("'{}' must have at most {} items", field.name, max))
                                .with_field(&field.name)
                                .with_entity(entity_type),
                        );
                    }
                }
                if let Some(item_type) = field.constraints.items {
                    for item in arr {
                        if !type_matches(item_type, item) {
                            diagnostics.push(
                                Diagnostic::error("invalid_field_type", format!("element of '{}' expected type {}", field.name, item_type))
                                    .with_field(&field.name)
                                    .with_entity(entity_type),
                            );
                        }
                    }
                }
            }
        }
        _ => {}
    }

    diagnostics
}

fn type_matches(expected: SemanticType, value: &serde_json::Value) -> bool {
    match expected {
        SemanticType::String | SemanticType::Datetime => value.is_string(),
        SemanticType::Integer => value.is_i64() || value.is_u64(),
        SemanticType::Boolean => value.is_boolean(),
        SemanticType::Array => value.is_array(),
        SemanticType::Object => value.is_object(),
    }
}

fn describe_json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Caches compiled [`EntityValidator`]s by `(entity_type, schema_version)`.
/// Cleared explicitly — there is no implicit TTL or LRU eviction.
#[derive(Default)]
pub struct ValidatorFactory {
    cache: RwLock<HashMap<(String, SchemaVersion), Arc<EntityValidator>>>,
}

impl ValidatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, catalog: &Catalog, entity_type: &str) -> Option<Arc<EntityValidator>> {
        let schema = catalog.get(entity_type)?;
        let key = (entity_type.to_string(), schema.schema_version);

        if let Some(existing) = self.cache.read().get(&key) {
            return Some(existing.clone());
        }

        let validator = Arc::new(EntityValidator::from_schema(schema));
        self.cache.write().insert(key, validator.clone());
        Some(validator)
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
