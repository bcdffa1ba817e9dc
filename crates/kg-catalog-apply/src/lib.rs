//! # Catalog Apply
//!
//! Takes a descriptor that has already cleared the validation pipeline
//! and lands it in storage: extracting one record per entity, expanding
//! external dependency URIs into package/version nodes, and replacing
//! every schema-declared relationship with exactly the targets the
//! descriptor named.

pub mod dependency_processor;
pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod relationship_processor;

pub use error::{ApplyError, Result};
pub use extractor::{extract_records, EntityRecord};
pub use orchestrator::{apply_descriptor, ApplySummary, EntityApplyRecord, EntityOutcome};
