//! Inheritance resolution and raw-to-runtime schema conversion.

use std::collections::HashMap;

use kg_catalog_core::schema::{FieldConstraints, SchemaPolicies};
use kg_catalog_core::types::{Cardinality, Direction, SemanticType, ValidationTag};
use kg_catalog_core::versioning::SchemaVersion;
use kg_catalog_core::{EntitySchema, FieldDefinition, RelationshipDefinition};

use crate::error::{LoaderError, Result};
use crate::raw::{RawBaseSchema, RawEntitySchema, RawFieldConfig, RawRelationshipConfig};

/// Merges a base schema's inheritable data into an entity schema's raw
/// metadata maps. Entity values win on key conflict; `readonly_metadata`
/// and `validation_rules` are deep-merged, `governance` and
/// `allow_custom_fields` are always taken from the base, and
/// `deletion_policy` is inherited only when the entity did not set one.
pub fn resolve_inheritance(
    mut entity: RawEntitySchema,
    bases: &HashMap<String, RawBaseSchema>,
) -> Result<RawEntitySchema> {
    let Some(base_name) = entity.extends.clone() else {
        return Ok(entity);
    };
    let base = bases
        .get(&base_name)
        .ok_or_else(|| LoaderError::InheritanceTargetMissing(base_name.clone()))?;

    let mut readonly = base.readonly_metadata.clone();
    readonly.extend(entity.readonly_metadata.clone());
    entity.readonly_metadata = readonly;

    let mut rules = base.validation_rules.clone();
    rules.extend(entity.validation_rules.clone());
    entity.validation_rules = rules;

    if entity.deletion_policy.is_none() {
        entity.deletion_policy = base.deletion_policy.clone();
    }
    entity.governance = base.governance.clone();
    entity.allow_custom_fields = base.allow_custom_fields;

    Ok(entity)
}

fn parse_semantic_type(raw: &str) -> SemanticType {
    match raw {
        "integer" => SemanticType::Integer,
        "boolean" => SemanticType::Boolean,
        "datetime" => SemanticType::Datetime,
        "array" => SemanticType::Array,
        "object" => SemanticType::Object,
        _ => SemanticType::String,
    }
}

fn parse_validation_tag(raw: &str) -> Option<ValidationTag> {
    match raw {
        "email" => Some(ValidationTag::Email),
        "url" => Some(ValidationTag::Url),
        "enum" => Some(ValidationTag::Enum),
        _ => None,
    }
}

fn parse_cardinality(raw: &str) -> Cardinality {
    match raw {
        "one_to_one" => Cardinality::OneToOne,
        "many_to_many" => Cardinality::ManyToMany,
        _ => Cardinality::OneToMany,
    }
}

fn parse_direction(raw: &str) -> Direction {
    match raw {
        "inbound" => Direction::Inbound,
        "bidirectional" => Direction::Bidirectional,
        _ => Direction::Outbound,
    }
}

fn build_field(name: &str, config: &RawFieldConfig, required: bool) -> FieldDefinition {
    let field_type = parse_semantic_type(&config.r#type);
    let constraints = FieldConstraints {
        min_length: config.min_length,
        max_length: config.max_length,
        min_items: config.min_items,
        max_items: config.max_items,
        pattern: config.pattern.clone(),
        allowed_values: config.allowed_values.clone(),
        items: config.items.as_deref().map(parse_semantic_type),
    };

    let mut field = FieldDefinition::new(name, field_type, required).with_constraints(constraints);
    if let Some(tag) = config.validation.as_deref().and_then(parse_validation_tag) {
        field = field.with_validation(tag);
    }
    if config.indexed {
        field = field.indexed();
    }
    field
}

fn build_fields(
    fields: &HashMap<String, RawFieldConfig>,
    required: bool,
) -> Vec<FieldDefinition> {
    fields
        .iter()
        .map(|(name, config)| build_field(name, config, required))
        .collect()
}

fn build_relationships(
    relationships: &HashMap<String, RawRelationshipConfig>,
) -> Vec<RelationshipDefinition> {
    relationships
        .iter()
        .map(|(name, config)| {
            RelationshipDefinition::new(
                name.clone(),
                config.target_types.clone(),
                parse_cardinality(&config.cardinality),
                parse_direction(&config.direction),
            )
        })
        .collect()
}

/// Converts a fully inheritance-resolved raw schema into its runtime
/// form. The schema file's own path is carried only for error messages.
pub fn build_entity_schema(raw: RawEntitySchema, source_path: &str) -> Result<EntitySchema> {
    let schema_version = raw.schema_version.parse::<SchemaVersion>().map_err(|_| {
        LoaderError::RequiredFieldMissing {
            path: source_path.to_string(),
            field: "schema_version".to_string(),
        }
    })?;

    if raw.dgraph_type.is_empty() {
        return Err(LoaderError::RequiredFieldMissing {
            path: source_path.to_string(),
            field: "dgraph_type".to_string(),
        });
    }

    Ok(EntitySchema {
        entity_type: raw.entity_type,
        schema_version,
        extends: raw.extends,
        description: raw.description,
        required_fields: build_fields(&raw.required_metadata, true),
        optional_fields: build_fields(&raw.optional_metadata, false),
        readonly_fields: build_fields(&raw.readonly_metadata, false),
        relationships: build_relationships(&raw.relationships),
        validation_rules: raw.validation_rules,
        backing_type: raw.dgraph_type,
        backing_predicates: raw.dgraph_predicates,
        policies: SchemaPolicies {
            governance: raw.governance,
            deletion_policy: raw.deletion_policy,
            auto_creation: raw.auto_creation,
        },
        allow_custom_fields: raw.allow_custom_fields,
    })
}
