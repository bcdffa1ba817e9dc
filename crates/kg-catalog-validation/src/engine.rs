//! The five-layer validation pipeline. Each layer runs only after the
//! previous one completes without a fatal condition; Layers 1 and 2 exit
//! immediately on their critical errors, Layer 3's absence of a model
//! short-circuits Layers 4–5.

use std::collections::HashMap;

use kg_catalog_core::schema::Catalog;
use kg_catalog_core::uri::DependencyUri;
use kg_catalog_core::{Descriptor, Diagnostic, ValidationResult};

use crate::factory::ValidatorFactory;
use crate::types::{EntityExistenceChecker, ValidatedModel, SUPPORTED_SCHEMA_VERSIONS};

const NAMESPACE_PATTERN: &str = r"^[a-z]([a-z0-9_-]*[a-z0-9])?$";

/// Layer 1 — parse YAML bytes into a [`Descriptor`]. Parse failure is
/// fatal for the whole pipeline: the caller must return immediately
/// rather than attempt any later layer.
pub fn parse_descriptor(yaml: &str) -> Result<Descriptor, Diagnostic> {
    if yaml.trim().is_empty() {
        return Err(Diagnostic::error("empty_yaml_content", "descriptor document is empty"));
    }
    serde_yaml::from_str(yaml).map_err(|err| {
        let mut diagnostic = Diagnostic::error("yaml_syntax_error", err.to_string());
        if let Some(location) = err.location() {
            diagnostic = diagnostic.with_position(location.line(), location.column());
        }
        diagnostic
    })
}

/// Layer 2 — structural checks over the parsed descriptor. `missing_required_field`
/// and `unsupported_schema_version` are critical: collect every Layer-2
/// error first, then stop before Layer 3 if any of those two appeared.
pub fn check_structure(descriptor: &Descriptor) -> (Vec<Diagnostic>, bool) {
    let mut diagnostics = Vec::new();
    let mut critical = false;

    if descriptor.schema_version.trim().is_empty() {
        diagnostics.push(Diagnostic::error("missing_required_field", "schema_version is required").with_field("schema_version"));
        critical = true;
    } else if !SUPPORTED_SCHEMA_VERSIONS.contains(&descriptor.schema_version.as_str()) {
        diagnostics.push(
            Diagnostic::error(
                "unsupported_schema_version",
                format!("schema_version '{}' is not supported", descriptor.schema_version),
            )
            .with_field("schema_version")
            .with_help(format!("use one of {SUPPORTED_SCHEMA_VERSIONS:?}")),
        );
        critical = true;
    }

    if descriptor.namespace.trim().is_empty() {
        diagnostics.push(Diagnostic::error("missing_required_field", "namespace is required").with_field("namespace"));
        critical = true;
    } else if !DependencyUri::is_namespace_valid(&descriptor.namespace) {
        diagnostics.push(
            Diagnostic::error("invalid_namespace_format", format!("namespace '{}' does not match {NAMESPACE_PATTERN}", descriptor.namespace))
                .with_field("namespace"),
        );
    }

    if !descriptor.entities_are_single_key_maps() {
        diagnostics.push(Diagnostic::error(
            "invalid_entity_structure",
            "each entity list entry must be a single-key map of entity_name to entity_body",
        ));
    }

    (diagnostics, critical)
}

/// Layer 3 — drive the per-entity body validator and materialize the
/// model on success.
pub fn check_field_format(
    descriptor: &Descriptor,
    catalog: &Catalog,
    factory: &ValidatorFactory,
) -> (Vec<Diagnostic>, Option<ValidatedModel>) {
    let mut diagnostics = Vec::new();

    for (entity_type, entity_name, body) in descriptor.iter_entities() {
        let Some(validator) = factory.get_or_build(catalog, entity_type) else {
            diagnostics.push(
                Diagnostic::error("unknown_entity_type", format!("unknown entity type '{entity_type}'"))
                    .with_entity(format!("{}/{}", descriptor.namespace, entity_name)),
            );
            continue;
        };

        let body_map: serde_json::Map<String, serde_json::Value> = body.fields.clone().into_iter().collect();
        for diagnostic in validator.validate_body(&body_map) {
            diagnostics.push(diagnostic.with_entity(format!("{}/{}", descriptor.namespace, entity_name)));
        }
    }

    if diagnostics.iter().any(Diagnostic::is_error) {
        (diagnostics, None)
    } else {
        (diagnostics, Some(ValidatedModel::from_descriptor(descriptor)))
    }
}

fn dependency_diagnostics(raw: &str, entity_ref: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    match DependencyUri::parse(raw) {
        DependencyUri::External { ecosystem_raw, package, version } => {
            if package.is_empty() {
                diagnostics.push(
                    Diagnostic::error("empty_package_name", format!("dependency '{raw}' has an empty package name"))
                        .with_entity(entity_ref),
                );
            }
            if version.is_empty() {
                diagnostics.push(
                    Diagnostic::error("empty_version", format!("dependency '{raw}' has an empty version"))
                        .with_entity(entity_ref),
                );
            }
            if ecosystem_raw.is_empty() {
                diagnostics.push(
                    Diagnostic::error("invalid_external_dependency", format!("'{raw}' is not a well-formed external:// reference"))
                        .with_entity(entity_ref),
                );
            } else {
                match kg_catalog_core::Ecosystem::parse(&ecosystem_raw) {
                    Some(eco) if eco.is_layer4_supported() => {}
                    _ => diagnostics.push(
                        Diagnostic::error("unsupported_ecosystem", format!("'{ecosystem_raw}' is not a supported ecosystem"))
                            .with_entity(entity_ref),
                    ),
                }
            }
        }
        DependencyUri::Internal { namespace, entity_name } => {
            if namespace.is_empty() || entity_name.is_empty() {
                diagnostics.push(
                    Diagnostic::error("invalid_internal_dependency", format!("'{raw}' is not a well-formed internal:// reference"))
                        .with_entity(entity_ref),
                );
            } else {
                if !DependencyUri::is_namespace_valid(&namespace) {
                    diagnostics.push(
                        Diagnostic::error("invalid_internal_namespace", format!("'{namespace}' is not a valid namespace"))
                            .with_entity(entity_ref),
                    );
                }
                if entity_name.is_empty() {
                    diagnostics.push(
                        Diagnostic::error("empty_entity_name", format!("'{raw}' has an empty entity name")).with_entity(entity_ref),
                    );
                }
            }
        }
        DependencyUri::None => {
            diagnostics.push(
                Diagnostic::error("invalid_dependency_reference", format!("'{raw}' is not a recognized dependency reference"))
                    .with_entity(entity_ref),
            );
        }
    }
    diagnostics
}

fn owner_domain(email: &str) -> Option<&str> {
    email.split('@').nth(1)
}

/// Layer 4 — business-logic checks over the materialized model: every
/// dependency reference is well-formed, entity names are unique per
/// type, and mixed owner email domains produce a warning (not an error).
pub fn check_business_logic(model: &ValidatedModel) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen_names: HashMap<&str, std::collections::HashSet<&str>> = HashMap::new();
    let mut domains: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for entity in &model.entities {
        let entity_ref = format!("{}/{}", model.namespace, entity.entity_name);

        for dep in &entity.legacy_depends_on {
            diagnostics.extend(dependency_diagnostics(dep, &entity_ref));
        }
        for targets in entity.relationships.values() {
            for target in targets {
                diagnostics.extend(dependency_diagnostics(target, &entity_ref));
            }
        }

        let names = seen_names.entry(entity.entity_type.as_str()).or_default();
        if !names.insert(entity.entity_name.as_str()) {
            diagnostics.push(
                Diagnostic::error(
                    "duplicate_entity_name",
                    format!("entity name '{}' is duplicated within type '{}'", entity.entity_name, entity.entity_type),
                )
                .with_entity(&entity_ref),
            );
        }

        if let Some(serde_json::Value::Array(owners)) = entity.fields.get("owners") {
            for owner in owners {
                if let Some(email) = owner.as_str() {
                    if let Some(domain) = owner_domain(email) {
                        domains.insert(domain);
                    }
                }
            }
        }
    }

    if domains.len() > 1 {
        diagnostics.push(Diagnostic::warning(
            "multiple_owner_domains",
            format!("owners span {} distinct email domains", domains.len()),
        ));
    }

    diagnostics
}

/// Layer 5 — reference existence. Only runs when a storage handle is
/// supplied; queries the canonical id of every `internal://` reference.
pub async fn check_reference_existence(model: &ValidatedModel, checker: &impl EntityExistenceChecker) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for entity in &model.entities {
        let entity_ref = format!("{}/{}", model.namespace, entity.entity_name);
        let mut all_refs = entity.legacy_depends_on.clone();
        for targets in entity.relationships.values() {
            all_refs.extend(targets.iter().cloned());
        }

        for raw in all_refs {
            if let DependencyUri::Internal { namespace, entity_name } = DependencyUri::parse(&raw) {
                if namespace.is_empty() || entity_name.is_empty() {
                    continue;
                }
                let canonical_id = DependencyUri::internal_entity_id(&namespace, &entity_name);
                if !checker.entity_exists("internal", &canonical_id).await {
                    diagnostics.push(
                        Diagnostic::error("reference_not_found", format!("internal reference '{canonical_id}' does not exist"))
                            .with_entity(&entity_ref),
                    );
                }
            }
        }
    }

    diagnostics
}

/// Runs Layers 1–4 only, as required for callers with no storage handle.
pub fn validate_sync(yaml: &str, catalog: &Catalog, factory: &ValidatorFactory, strict: bool) -> ValidationResult {
    let mut result = ValidationResult::success();

    let descriptor = match parse_descriptor(yaml) {
        Ok(descriptor) => descriptor,
        Err(diagnostic) => {
            result.add(diagnostic);
            return result;
        }
    };

    let (structure_diagnostics, critical) = check_structure(&descriptor);
    result.extend(structure_diagnostics);
    if critical {
        return result;
    }

    let (field_diagnostics, model) = check_field_format(&descriptor, catalog, factory);
    result.extend(field_diagnostics);
    let Some(model) = model else {
        if strict {
            result.promote_warnings();
        }
        return result;
    };

    result.extend(check_business_logic(&model));

    if strict {
        result.promote_warnings();
    }
    result
}

/// Runs all five layers; Layer 5 suspends on `entity_exists` calls.
pub async fn validate_async(
    yaml: &str,
    catalog: &Catalog,
    factory: &ValidatorFactory,
    checker: &impl EntityExistenceChecker,
    strict: bool,
) -> ValidationResult {
    let mut result = ValidationResult::success();

    let descriptor = match parse_descriptor(yaml) {
        Ok(descriptor) => descriptor,
        Err(diagnostic) => {
            result.add(diagnostic);
            return result;
        }
    };

    let (structure_diagnostics, critical) = check_structure(&descriptor);
    result.extend(structure_diagnostics);
    if critical {
        return result;
    }

    let (field_diagnostics, model) = check_field_format(&descriptor, catalog, factory);
    result.extend(field_diagnostics);
    let Some(model) = model else {
        if strict {
            result.promote_warnings();
        }
        return result;
    };

    result.extend(check_business_logic(&model));
    if result.has_errors() {
        if strict {
            result.promote_warnings();
        }
        return result;
    }

    result.extend(check_reference_existence(&model, checker).await);

    if strict {
        result.promote_warnings();
    }
    result
}
