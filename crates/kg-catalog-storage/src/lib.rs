//! # Knowledge Graph Storage Contract
//!
//! The abstract [`GraphStore`] trait the apply orchestrator and
//! validation pipeline's Layer 5 depend on, plus [`memory::MemoryGraphStore`]
//! — an in-process reference implementation used by the CLI's local mode
//! and throughout the test suite — and [`schema_projection`], the
//! deterministic mapping from a loaded catalog's field types to backend
//! predicate declarations.

pub mod error;
pub mod interface;
pub mod memory;
pub mod models;
pub mod schema_projection;

pub use error::{Result, StorageError};
pub use interface::GraphStore;
pub use memory::MemoryGraphStore;
pub use models::{
    DryRunEntityOperation, DryRunOperation, DryRunResult, EntityCounts, EntityData, HealthCheckResult, HealthStatus,
    IssueSeverity, QueryResult, RelationshipData, RelationshipTarget, SystemMetrics, ValidationIssue,
};
pub use schema_projection::{project_catalog, BackingSchema, PredicateType};
