//! # Knowledge Graph Catalog Loader
//!
//! Reads a directory tree of versioned YAML schema files into a
//! [`kg_catalog_core::Catalog`], resolving `extends` inheritance against
//! base schemas and checking cross-schema consistency before the catalog
//! is ever handed to the validation pipeline.
//!
//! Directory layout:
//! ```text
//! <schema_dir>/
//!   _base/<base_name>/<semver>.yaml
//!   <entity_type>/<semver>.yaml
//! ```

pub mod build;
pub mod error;
pub mod raw;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use kg_catalog_core::schema::{Catalog, EntitySchema, SchemaPolicies};
use kg_catalog_core::types::{Cardinality, Direction, SemanticType};
use kg_catalog_core::versioning::SchemaVersion;
use kg_catalog_core::{FieldDefinition, RelationshipDefinition};

use build::{build_entity_schema, resolve_inheritance};
use error::{LoaderError, Result};
use raw::{RawBaseSchema, RawEntitySchema};

const BASE_DIR_NAME: &str = "_base";

const EXTERNAL_DEPENDENCY_PACKAGE: &str = "external_dependency_package";
const EXTERNAL_DEPENDENCY_VERSION: &str = "external_dependency_version";

/// The two entity types the dependency processor creates on the fly when
/// it expands an `external://` reference (`kg_catalog_apply::dependency_processor`).
/// They are registered here, the same way `backend/kg/core/schema_loader.py`
/// seeds its catalog with built-in schema entities, so a `depends_on`
/// relationship may legally target them even when no schema file on disk
/// declares them. A schema directory that defines its own version of
/// either type wins over the built-in.
fn built_in_schemas() -> HashMap<String, EntitySchema> {
    let package = EntitySchema {
        entity_type: EXTERNAL_DEPENDENCY_PACKAGE.to_string(),
        schema_version: SchemaVersion::new(1, 0, 0),
        extends: None,
        description: Some("An external package, identified by ecosystem and name.".to_string()),
        required_fields: vec![
            FieldDefinition::new("ecosystem", SemanticType::String, true),
            FieldDefinition::new("package_name", SemanticType::String, true),
        ],
        optional_fields: Vec::new(),
        readonly_fields: Vec::new(),
        relationships: vec![RelationshipDefinition::new(
            "has_version",
            vec![EXTERNAL_DEPENDENCY_VERSION.to_string()],
            Cardinality::OneToMany,
            Direction::Outbound,
        )],
        validation_rules: HashMap::new(),
        backing_type: "ExternalDependencyPackage".to_string(),
        backing_predicates: HashMap::new(),
        policies: SchemaPolicies::default(),
        allow_custom_fields: false,
    };

    let version = EntitySchema {
        entity_type: EXTERNAL_DEPENDENCY_VERSION.to_string(),
        schema_version: SchemaVersion::new(1, 0, 0),
        extends: None,
        description: Some("One version of an external package.".to_string()),
        required_fields: vec![
            FieldDefinition::new("ecosystem", SemanticType::String, true),
            FieldDefinition::new("package_name", SemanticType::String, true),
            FieldDefinition::new("version", SemanticType::String, true),
        ],
        optional_fields: Vec::new(),
        readonly_fields: Vec::new(),
        relationships: Vec::new(),
        validation_rules: HashMap::new(),
        backing_type: "ExternalDependencyVersion".to_string(),
        backing_predicates: HashMap::new(),
        policies: SchemaPolicies::default(),
        allow_custom_fields: false,
    };

    HashMap::from([(package.entity_type.clone(), package), (version.entity_type.clone(), version)])
}

/// Loads a catalog from `schema_dir`. A failed load must never mutate any
/// catalog the caller is already holding — callers reload by discarding
/// this result on error and keeping the previous [`Catalog`] in place.
pub fn load_catalog(schema_dir: impl AsRef<Path>) -> Result<Catalog> {
    let schema_dir = schema_dir.as_ref();
    let bases = load_base_schemas(schema_dir)?;
    let (mut schemas, base_derived) = load_entity_schemas(schema_dir, &bases)?;

    for (entity_type, schema) in built_in_schemas() {
        schemas.entry(entity_type).or_insert(schema);
    }

    let errors = validate_schema_consistency(&schemas);
    if !errors.is_empty() {
        return Err(LoaderError::Validation(errors));
    }

    tracing::info!(entity_types = schemas.len(), "loaded catalog");
    Ok(Catalog::new(schemas, base_derived))
}

fn load_base_schemas(schema_dir: &Path) -> Result<HashMap<String, RawBaseSchema>> {
    let base_dir = schema_dir.join(BASE_DIR_NAME);
    let mut bases = HashMap::new();
    if !base_dir.is_dir() {
        return Ok(bases);
    }

    for entry in std::fs::read_dir(&base_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let base_name = entry.file_name().to_string_lossy().to_string();
        if let Some(path) = highest_version_file(&entry.path())? {
            let contents = std::fs::read_to_string(&path)?;
            let parsed: RawBaseSchema =
                serde_yaml::from_str(&contents).map_err(|source| LoaderError::Yaml {
                    path: path.display().to_string(),
                    source,
                })?;
            bases.insert(base_name, parsed);
        }
    }
    Ok(bases)
}

fn load_entity_schemas(
    schema_dir: &Path,
    bases: &HashMap<String, RawBaseSchema>,
) -> Result<(HashMap<String, kg_catalog_core::EntitySchema>, HashSet<String>)> {
    let mut schemas = HashMap::new();
    let mut base_derived = HashSet::new();

    for entry in std::fs::read_dir(schema_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name() == BASE_DIR_NAME {
            continue;
        }

        let Some(path) = highest_version_file(&entry.path())? else {
            continue;
        };
        let contents = std::fs::read_to_string(&path)?;
        let raw: RawEntitySchema =
            serde_yaml::from_str(&contents).map_err(|source| LoaderError::Yaml {
                path: path.display().to_string(),
                source,
            })?;

        let extends = raw.extends.clone();
        let resolved = resolve_inheritance(raw, bases)?;
        let entity_schema = build_entity_schema(resolved, &path.display().to_string())?;

        if extends.is_some() {
            base_derived.insert(entity_schema.entity_type.clone());
        }
        schemas.insert(entity_schema.entity_type.clone(), entity_schema);
    }

    Ok((schemas, base_derived))
}

/// Picks the highest `<semver>.yaml` file directly inside `dir`. When more
/// than one version file exists for an entity type, the catalog — keyed
/// by entity_type alone — can only hold one; the highest semver file wins.
fn highest_version_file(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut best: Option<(SchemaVersion, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let Ok(version) = stem.parse::<SchemaVersion>() else {
            continue;
        };
        match &best {
            Some((best_version, _)) if *best_version >= version => {}
            _ => best = Some((version, path)),
        }
    }
    Ok(best.map(|(_, path)| path))
}

/// Cross-schema consistency checks run over the whole catalog at once, as
/// required by §4.1: target-type existence, field-name uniqueness, field
/// versus relationship name conflicts, and non-empty backing types.
pub fn validate_schema_consistency(
    schemas: &HashMap<String, kg_catalog_core::EntitySchema>,
) -> Vec<String> {
    let mut errors = Vec::new();

    for (entity_type, schema) in schemas {
        for relationship in &schema.relationships {
            for target_type in &relationship.target_types {
                if !schemas.contains_key(target_type) {
                    errors.push(format!(
                        "entity '{entity_type}' has relationship '{}' targeting unknown entity type '{target_type}'",
                        relationship.name
                    ));
                }
            }
        }

        let mut seen_field_names = HashSet::new();
        for field in schema.all_fields() {
            if !seen_field_names.insert(field.name.as_str()) {
                errors.push(format!("entity '{entity_type}' has duplicate field name '{}'", field.name));
            }
        }

        for conflict in schema.name_conflicts() {
            if schema.relationships.iter().any(|r| r.name == conflict)
                && schema.find_field(&conflict).is_some()
            {
                errors.push(format!(
                    "entity '{entity_type}' has naming conflict: '{conflict}' is defined as both a field and a relationship"
                ));
            }
        }

        if schema.backing_type.is_empty() {
            errors.push(format!("entity '{entity_type}' missing backing type"));
        }
    }

    errors
}
