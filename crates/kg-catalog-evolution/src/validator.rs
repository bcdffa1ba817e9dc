//! Catalog diffing and additive-only enforcement.

use std::collections::HashSet;

use kg_catalog_core::schema::Catalog;

use crate::types::{AdditiveViolation, CatalogDiff, EntityTypeChange, FieldChange, RelationshipChange, ViolationKind};

/// Diffs two catalogs. A "modify" on a field triggers when type, required,
/// or validation differs; on a relationship, when the target_types set or
/// cardinality differs.
pub fn diff_catalogs(old: &Catalog, new: &Catalog) -> CatalogDiff {
    let mut diff = CatalogDiff::default();

    let old_types: HashSet<&str> = old.entity_types().collect();
    let new_types: HashSet<&str> = new.entity_types().collect();

    for entity_type in new_types.difference(&old_types) {
        diff.entity_type_changes.push(EntityTypeChange::Added((*entity_type).to_string()));
    }
    for entity_type in old_types.difference(&new_types) {
        diff.entity_type_changes.push(EntityTypeChange::Removed((*entity_type).to_string()));
    }

    for entity_type in old_types.intersection(&new_types) {
        let old_schema = old.get(entity_type).unwrap();
        let new_schema = new.get(entity_type).unwrap();

        let old_field_names: HashSet<&str> = old_schema.field_names();
        let new_field_names: HashSet<&str> = new_schema.field_names();

        for name in new_field_names.difference(&old_field_names) {
            let field = new_schema.find_field(name).unwrap().clone();
            diff.field_changes.push(FieldChange::Added { entity_type: (*entity_type).to_string(), field });
        }
        for name in old_field_names.difference(&new_field_names) {
            let field = old_schema.find_field(name).unwrap().clone();
            diff.field_changes.push(FieldChange::Removed { entity_type: (*entity_type).to_string(), field });
        }
        for name in old_field_names.intersection(&new_field_names) {
            let old_field = old_schema.find_field(name).unwrap();
            let new_field = new_schema.find_field(name).unwrap();
            if old_field.field_type != new_field.field_type
                || old_field.required != new_field.required
                || old_field.validation != new_field.validation
            {
                diff.field_changes.push(FieldChange::Modified {
                    entity_type: (*entity_type).to_string(),
                    old: old_field.clone(),
                    new: new_field.clone(),
                });
            }
        }

        let old_rel_names: HashSet<&str> = old_schema.relationship_names();
        let new_rel_names: HashSet<&str> = new_schema.relationship_names();

        for name in new_rel_names.difference(&old_rel_names) {
            let relationship = new_schema.find_relationship(name).unwrap().clone();
            diff.relationship_changes.push(RelationshipChange::Added { entity_type: (*entity_type).to_string(), relationship });
        }
        for name in old_rel_names.difference(&new_rel_names) {
            let relationship = old_schema.find_relationship(name).unwrap().clone();
            diff.relationship_changes.push(RelationshipChange::Removed { entity_type: (*entity_type).to_string(), relationship });
        }
        for name in old_rel_names.intersection(&new_rel_names) {
            let old_rel = old_schema.find_relationship(name).unwrap();
            let new_rel = new_schema.find_relationship(name).unwrap();
            let old_targets: HashSet<&String> = old_rel.target_types.iter().collect();
            let new_targets: HashSet<&String> = new_rel.target_types.iter().collect();
            if old_targets != new_targets || old_rel.cardinality != new_rel.cardinality {
                diff.relationship_changes.push(RelationshipChange::Modified {
                    entity_type: (*entity_type).to_string(),
                    old: old_rel.clone(),
                    new: new_rel.clone(),
                });
            }
        }
    }

    diff
}

/// Maps a diff to the set of violations that make it non-additive. An
/// empty result means the change set may proceed.
pub fn find_additive_violations(diff: &CatalogDiff) -> Vec<AdditiveViolation> {
    let mut violations = Vec::new();

    for change in &diff.entity_type_changes {
        if let EntityTypeChange::Removed(entity_type) = change {
            violations.push(AdditiveViolation {
                kind: ViolationKind::EntityTypeRemoved,
                entity_type: entity_type.clone(),
                name: entity_type.clone(),
                message: format!("entity type '{entity_type}' was removed; deprecate instead"),
            });
        }
    }

    for change in &diff.field_changes {
        match change {
            FieldChange::Removed { .. } => violations.push(AdditiveViolation {
                kind: ViolationKind::FieldRemoved,
                entity_type: change.entity_type().to_string(),
                name: change.field_name().to_string(),
                message: format!("field '{}' was removed from '{}'; deprecate instead", change.field_name(), change.entity_type()),
            }),
            FieldChange::Added { entity_type, field } if field.required => violations.push(AdditiveViolation {
                kind: ViolationKind::RequiredFieldAdded,
                entity_type: entity_type.clone(),
                name: field.name.clone(),
                message: format!("new field '{}' on '{}' must be optional", field.name, entity_type),
            }),
            FieldChange::Modified { old, new, .. } if old.field_type != new.field_type => {
                violations.push(AdditiveViolation {
                    kind: ViolationKind::FieldTypeChanged,
                    entity_type: change.entity_type().to_string(),
                    name: change.field_name().to_string(),
                    message: format!("field '{}' on '{}' changed type", change.field_name(), change.entity_type()),
                })
            }
            FieldChange::Modified { old, new, .. } if !old.required && new.required => {
                violations.push(AdditiveViolation {
                    kind: ViolationKind::FieldMadeRequired,
                    entity_type: change.entity_type().to_string(),
                    name: change.field_name().to_string(),
                    message: format!("field '{}' on '{}' became required", change.field_name(), change.entity_type()),
                })
            }
            _ => {}
        }
    }

    for change in &diff.relationship_changes {
        match change {
            RelationshipChange::Removed { .. } => violations.push(AdditiveViolation {
                kind: ViolationKind::RelationshipRemoved,
                entity_type: change.entity_type().to_string(),
                name: change.relationship_name().to_string(),
                message: format!(
                    "relationship '{}' was removed from '{}'; deprecate instead",
                    change.relationship_name(),
                    change.entity_type()
                ),
            }),
            RelationshipChange::Modified { old, new, entity_type } => {
                let old_targets: HashSet<&String> = old.target_types.iter().collect();
                let new_targets: HashSet<&String> = new.target_types.iter().collect();
                if !old_targets.is_subset(&new_targets) {
                    violations.push(AdditiveViolation {
                        kind: ViolationKind::RelationshipTargetTypeSetShrunk,
                        entity_type: entity_type.clone(),
                        name: old.name.clone(),
                        message: format!("relationship '{}' on '{}' lost one or more target types", old.name, entity_type),
                    });
                }
            }
            RelationshipChange::Added { .. } => {}
        }
    }

    violations
}
