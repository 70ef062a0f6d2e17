//! Group assembly: from a disjoint-set forest to merged group results.

use std::collections::BTreeMap;
use std::time::Instant;

use futures::future::join_all;

use dedupit_core::{FieldMap, GroupResult, RecordMerger};

use crate::index::VectorIndex;

use super::PipelineError;

/// Materialize the forest into merged groups.
///
/// Records are bucketed by their root id; singletons are dropped (a
/// record alone in its class is not a dedup result). Every surviving
/// group is merged concurrently through the [`RecordMerger`], exactly
/// one merger call per group. Results come back in root-id order, though
/// callers must not rely on any particular order.
pub async fn assemble_groups(
    index: &VectorIndex,
    groups: &BTreeMap<String, String>,
    merger: &dyn RecordMerger,
) -> Result<Vec<GroupResult>, PipelineError> {
    let started = Instant::now();

    let mut members: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, root) in groups {
        members.entry(root.as_str()).or_default().push(id.as_str());
    }

    let non_singletons: Vec<(&str, Vec<&str>)> = members
        .into_iter()
        .filter(|(_, ids)| ids.len() >= 2)
        .collect();

    let mut payloads: Vec<Vec<FieldMap>> = Vec::with_capacity(non_singletons.len());
    for (_, ids) in &non_singletons {
        let records = index.get(ids)?;
        payloads.push(records.into_iter().map(|r| r.data).collect());
    }

    let merged = join_all(payloads.iter().map(|group| merger.merge(group))).await;

    let mut results = Vec::with_capacity(non_singletons.len());
    for ((root, ids), merged_data) in non_singletons.into_iter().zip(merged) {
        results.push(GroupResult {
            group_id: root.to_string(),
            merged_data: merged_data?,
            record_ids: ids.into_iter().map(str::to_string).collect(),
        });
    }

    tracing::info!(
        target: "dedupit::pipeline",
        groups = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "group assembly complete"
    );
    Ok(results)
}
