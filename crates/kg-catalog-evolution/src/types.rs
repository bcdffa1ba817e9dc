//! Change-set shapes produced by the catalog diff and consumed by the
//! additive-only validator.

use kg_catalog_core::{FieldDefinition, RelationshipDefinition};

#[derive(Debug, Clone)]
pub enum FieldChange {
    Added { entity_type: String, field: FieldDefinition },
    Removed { entity_type: String, field: FieldDefinition },
    Modified { entity_type: String, old: FieldDefinition, new: FieldDefinition },
}

impl FieldChange {
    pub fn entity_type(&self) -> &str {
        match self {
            FieldChange::Added { entity_type, .. }
            | FieldChange::Removed { entity_type, .. }
            | FieldChange::Modified { entity_type, .. } => entity_type,
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            FieldChange::Added { field, .. } | FieldChange::Removed { field, .. } => &field.name,
            FieldChange::Modified { old, .. } => &old.name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RelationshipChange {
    Added { entity_type: String, relationship: RelationshipDefinition },
    Removed { entity_type: String, relationship: RelationshipDefinition },
    Modified { entity_type: String, old: RelationshipDefinition, new: RelationshipDefinition },
}

impl RelationshipChange {
    pub fn entity_type(&self) -> &str {
        match self {
            RelationshipChange::Added { entity_type, .. }
            | RelationshipChange::Removed { entity_type, .. }
            | RelationshipChange::Modified { entity_type, .. } => entity_type,
        }
    }

    pub fn relationship_name(&self) -> &str {
        match self {
            RelationshipChange::Added { relationship, .. } | RelationshipChange::Removed { relationship, .. } => {
                &relationship.name
            }
            RelationshipChange::Modified { old, .. } => &old.name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EntityTypeChange {
    Added(String),
    Removed(String),
}

/// The full diff between two catalogs, in the shape the additive-only
/// validator inspects.
#[derive(Debug, Clone, Default)]
pub struct CatalogDiff {
    pub field_changes: Vec<FieldChange>,
    pub relationship_changes: Vec<RelationshipChange>,
    pub entity_type_changes: Vec<EntityTypeChange>,
}

impl CatalogDiff {
    pub fn is_empty(&self) -> bool {
        self.field_changes.is_empty() && self.relationship_changes.is_empty() && self.entity_type_changes.is_empty()
    }
}

/// A specific way in which a change set fails the additive-only rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    FieldRemoved,
    RelationshipRemoved,
    EntityTypeRemoved,
    RequiredFieldAdded,
    FieldTypeChanged,
    FieldMadeRequired,
    RelationshipTargetTypeSetShrunk,
}

#[derive(Debug, Clone)]
pub struct AdditiveViolation {
    pub kind: ViolationKind,
    pub entity_type: String,
    pub name: String,
    pub message: String,
}
