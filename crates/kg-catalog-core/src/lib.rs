//! # Knowledge Graph Catalog Core
//!
//! Core data model for the knowledge graph descriptor catalog: entity
//! schemas, field and relationship definitions, dependency URI grammar,
//! the raw descriptor shape, and the diagnostics produced while
//! validating one against the other.
//!
//! This crate has no async runtime and no storage dependency — it is the
//! shared vocabulary every other crate in the workspace builds on.

pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod jsonschema;
pub mod schema;
pub mod types;
pub mod uri;
pub mod versioning;

pub use descriptor::{Descriptor, EntityBody};
pub use diagnostics::{Diagnostic, Severity, ValidationResult};
pub use error::{CoreError, Result};
pub use schema::{Catalog, EntitySchema, FieldDefinition, RelationshipDefinition};
pub use types::{Cardinality, DeprecationInfo, Direction, SemanticType, ValidationTag};
pub use uri::{DependencyUri, Ecosystem};
pub use versioning::SchemaVersion;
