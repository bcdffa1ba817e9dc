//! Typed results returned from the storage contract.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Error,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub response_time_ms: f64,
    pub backend_version: Option<String>,
    pub info: HashMap<String, serde_json::Value>,
}

/// A stored entity as handed back by `get_entity`/`list_entities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub id: String,
    pub entity_type: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub relationships: HashMap<String, Vec<String>>,
    pub system_metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipTarget {
    pub entity_type: String,
    pub entity_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipData {
    pub relationship_name: String,
    pub target_entities: Vec<RelationshipTarget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityCounts {
    pub by_type: HashMap<String, usize>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub entity_counts: EntityCounts,
    pub total_relationships: usize,
    pub storage_size_estimate_bytes: usize,
    pub last_updated: DateTime<Utc>,
    pub backend_info: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub success: bool,
    pub data: serde_json::Value,
    pub time_ms: f64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DryRunOperation {
    Create,
    Update,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunEntityOperation {
    pub entity_type: String,
    pub entity_id: String,
    pub operation: DryRunOperation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DryRunResult {
    pub would_create: Vec<DryRunEntityOperation>,
    pub would_update: Vec<DryRunEntityOperation>,
    pub would_delete: Vec<DryRunEntityOperation>,
    pub issues: Vec<ValidationIssue>,
    pub summary: HashMap<String, usize>,
}
