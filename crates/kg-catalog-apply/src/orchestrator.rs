//! Ties the validation pipeline, descriptor extractor, dependency
//! processor and relationship processor together into one apply run.

use std::collections::HashMap;

use kg_catalog_storage::{DryRunResult, GraphStore};
use kg_catalog_validation::engine::{check_business_logic, check_field_format, check_reference_existence, check_structure, parse_descriptor};
use kg_catalog_validation::{EntityExistenceChecker, ValidatorFactory};
use tokio_util::sync::CancellationToken;

use crate::dependency_processor::process_dependencies;
use crate::error::{ApplyError, Result};
use crate::extractor::extract_records;
use crate::relationship_processor::replace_relationships;

struct StorageExistenceChecker<'a> {
    storage: &'a dyn GraphStore,
}

impl<'a> EntityExistenceChecker for StorageExistenceChecker<'a> {
    async fn entity_exists(&self, _entity_type: &str, entity_id: &str) -> bool {
        self.storage.entity_exists(entity_id).await.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct EntityApplyRecord {
    pub entity_type: String,
    pub entity_id: String,
    pub outcome: EntityOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub entities: Vec<EntityApplyRecord>,
    pub first_failure: Option<String>,
    pub dry_run: Option<DryRunResult>,
}

impl ApplySummary {
    pub fn succeeded(&self) -> bool {
        self.first_failure.is_none()
    }
}

/// Runs Layers 1–4 plus, if the descriptor still has no errors, Layer 5,
/// collecting the total error count and the materialized model. Mirrors
/// [`kg_catalog_validation::validate_async`]'s control flow but keeps the
/// model around for record extraction instead of discarding it.
async fn validate_and_extract(
    storage: &dyn GraphStore,
    catalog: &kg_catalog_core::schema::Catalog,
    yaml: &str,
) -> Result<kg_catalog_validation::ValidatedModel> {
    let factory = ValidatorFactory::new();

    let descriptor = parse_descriptor(yaml).map_err(|_| ApplyError::ValidationFailed { error_count: 1 })?;

    let (structure_diagnostics, critical) = check_structure(&descriptor);
    let mut error_count = structure_diagnostics.iter().filter(|d| d.is_error()).count();
    if critical {
        return Err(ApplyError::ValidationFailed { error_count });
    }

    let (field_diagnostics, model) = check_field_format(&descriptor, catalog, &factory);
    error_count += field_diagnostics.iter().filter(|d| d.is_error()).count();
    let Some(model) = model else {
        return Err(ApplyError::ValidationFailed { error_count });
    };

    let business_diagnostics = check_business_logic(&model);
    error_count += business_diagnostics.iter().filter(|d| d.is_error()).count();
    if error_count > 0 {
        return Err(ApplyError::ValidationFailed { error_count });
    }

    let checker = StorageExistenceChecker { storage };
    let reference_diagnostics = check_reference_existence(&model, &checker).await;
    error_count += reference_diagnostics.iter().filter(|d| d.is_error()).count();
    if error_count > 0 {
        return Err(ApplyError::ValidationFailed { error_count });
    }

    Ok(model)
}

/// Runs one apply: load the catalog, validate, extract records, and
/// either simulate (`dry_run`) or write them in descriptor order. Storage
/// errors on one entity stop processing of subsequent entities without
/// undoing the writes already made; `summary.first_failure` names the
/// entity that stopped the run.
pub async fn apply_descriptor(
    storage: &dyn GraphStore,
    schema_dir: &str,
    yaml: &str,
    source_name: &str,
    dry_run: bool,
    cancellation: &CancellationToken,
) -> Result<ApplySummary> {
    let catalog = storage.load_schemas(schema_dir).await.map_err(|e| ApplyError::CatalogLoad(e.to_string()))?;

    let model = validate_and_extract(storage, &catalog, yaml).await?;
    let records = extract_records(&model, source_name);

    if dry_run {
        let record_maps: Vec<HashMap<String, serde_json::Value>> = records
            .iter()
            .map(|record| {
                HashMap::from([
                    ("entity_type".to_string(), serde_json::json!(record.entity_type)),
                    ("entity_id".to_string(), serde_json::json!(record.entity_id)),
                    ("metadata".to_string(), serde_json::json!(record.metadata)),
                ])
            })
            .collect();
        let dry_run_result = storage.dry_run_apply(&record_maps).await;
        return Ok(ApplySummary { dry_run: Some(dry_run_result), ..Default::default() });
    }

    let mut summary = ApplySummary::default();

    for record in &records {
        if cancellation.is_cancelled() {
            return Err(ApplyError::Canceled);
        }

        let existed_before = storage
            .get_entity(&record.entity_type, &record.entity_id)
            .await
            .map_err(|source| ApplyError::Storage { entity_type: record.entity_type.clone(), entity_id: record.entity_id.clone(), source })
            .unwrap_or(None)
            .is_some();

        let store_result = storage
            .store_entity(&record.entity_type, &record.entity_id, record.metadata.clone(), record.system_metadata.clone())
            .await;

        if let Err(source) = store_result {
            summary.first_failure = Some(format!("{}/{}: {source}", record.entity_type, record.entity_id));
            break;
        }

        if let Some(depends_on) = record.relationships.get("depends_on") {
            if let Err(err) = process_dependencies(storage, depends_on).await {
                summary.first_failure = Some(format!("{}/{}: {err}", record.entity_type, record.entity_id));
                break;
            }
        }

        if let Err(err) = replace_relationships(storage, &catalog, &record.entity_type, &record.entity_id, &record.relationships).await {
            summary.first_failure = Some(format!("{}/{}: {err}", record.entity_type, record.entity_id));
            break;
        }

        let outcome = if existed_before { EntityOutcome::Updated } else { EntityOutcome::Created };
        match outcome {
            EntityOutcome::Created => summary.created += 1,
            EntityOutcome::Updated => summary.updated += 1,
        }
        summary.entities.push(EntityApplyRecord { entity_type: record.entity_type.clone(), entity_id: record.entity_id.clone(), outcome });
    }

    Ok(summary)
}
