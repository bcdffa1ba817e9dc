//! Errors raised while diffing catalogs or enforcing additive-only evolution.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvolutionError>;

#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("catalog evolution from {old} to {new} is not additive-only: {violations} violation(s)")]
    NotAdditive { old: String, new: String, violations: usize },

    #[error("version bump from {old} to {new} is not allowed for an additive_only={additive_only} change set")]
    DisallowedVersionBump { old: String, new: String, additive_only: bool },

    #[error("entity type '{0}' not present in target catalog for rollback projection")]
    UnknownEntityTypeForProjection(String),
}
