//! The dedupe service entry point.
//!
//! [`dedupe_records`] wires the production collaborators (API embedder,
//! LLM comparator, LLM merger) from config and runs one request end to
//! end. [`dedupe_with`] is the same flow with injected collaborators,
//! the seam both the tests and any embedding host use.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use dedupit_core::{
    limits, DedupeConfig, DedupeResult, Embedder, PairwiseOracle, Record, RecordError,
    RecordMerger,
};
use dedupit_engine::{assemble_groups, Grouper, GrouperConfig};
use dedupit_intelligence::{embedder_for, LlmComparator, LlmMerger};

use crate::error::DedupeError;

/// Deduplicate a batch of records using the configured LLM stack.
///
/// Fails fast on size-limit or id violations before any model work.
/// The vector index and union-find forest live inside this call and are
/// released on every exit path, success or not.
pub async fn dedupe_records(
    records: Vec<Record>,
    config: &DedupeConfig,
) -> Result<DedupeResult, DedupeError> {
    let embedder = embedder_for(config)?;
    let oracle: Arc<dyn PairwiseOracle> = Arc::new(LlmComparator::from_config(config)?);
    let merger: Arc<dyn RecordMerger> = Arc::new(LlmMerger::from_config(config)?);
    dedupe_with(records, config, embedder, oracle, merger).await
}

/// Deduplicate a batch with explicitly provided collaborators.
pub async fn dedupe_with(
    records: Vec<Record>,
    config: &DedupeConfig,
    embedder: Arc<dyn Embedder>,
    oracle: Arc<dyn PairwiseOracle>,
    merger: Arc<dyn RecordMerger>,
) -> Result<DedupeResult, DedupeError> {
    limits::check_record_count(records.len())?;
    validate_ids(&records)?;
    if records.is_empty() {
        return Ok(DedupeResult::default());
    }

    let started = Instant::now();
    let grouper_config = GrouperConfig {
        max_neighbors: config.max_neighbors,
        oracle_chunk_size: config.oracle_chunk_size,
        ..GrouperConfig::default()
    };

    let mut grouper = Grouper::new(embedder, oracle, grouper_config);
    grouper.process_records(&records).await?;

    let groups = grouper.groups();
    let results = assemble_groups(grouper.index(), &groups, merger.as_ref()).await?;

    tracing::info!(
        target: "dedupit::service",
        records = records.len(),
        groups = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "dedupe request complete"
    );
    Ok(DedupeResult { groups: results })
}

/// Every id must be non-empty and unique within the batch.
fn validate_ids(records: &[Record]) -> Result<(), RecordError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.id.is_empty() {
            return Err(RecordError::EmptyId);
        }
        if !seen.insert(record.id.as_str()) {
            return Err(RecordError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedupit_core::FieldMap;

    fn record(id: &str) -> Record {
        Record::new(id, FieldMap::new())
    }

    #[test]
    fn test_validate_ids_accepts_unique_ids() {
        assert!(validate_ids(&[record("a"), record("b")]).is_ok());
    }

    #[test]
    fn test_validate_ids_rejects_empty_id() {
        let err = validate_ids(&[record("")]).unwrap_err();
        assert_eq!(err, RecordError::EmptyId);
    }

    #[test]
    fn test_validate_ids_rejects_duplicates() {
        let err = validate_ids(&[record("a"), record("a")]).unwrap_err();
        assert_eq!(err, RecordError::DuplicateId("a".to_string()));
    }
}
