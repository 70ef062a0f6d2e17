//! Grouping pipeline: from records to a populated disjoint-set forest.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use dedupit_core::{Embedder, FieldMap, PairwiseOracle, Record};

use crate::dsu::DisjointSetStore;
use crate::index::{BackendKind, StoreEntry, VectorIndex};

use super::PipelineError;

/// Pipeline tunables, carved out of the service config.
#[derive(Debug, Clone)]
pub struct GrouperConfig {
    /// `k` for the neighbor search
    pub max_neighbors: usize,
    /// Oracle calls issued per fan-out chunk
    pub oracle_chunk_size: usize,
    /// Index backend to build on
    pub backend: BackendKind,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self {
            max_neighbors: 3,
            oracle_chunk_size: 200,
            backend: BackendKind::default(),
        }
    }
}

/// A candidate pair awaiting an oracle verdict. Borrowed views into the
/// request's records and the neighbor hit lists.
struct CandidatePair<'a> {
    id_a: &'a str,
    id_b: &'a str,
    data_a: &'a FieldMap,
    data_b: &'a FieldMap,
}

/// Orchestrates one request's grouping pass.
///
/// The vector index and forest inside are scoped to this instance, which
/// is scoped to the request: dropping the grouper (on success, error, or
/// cancellation) releases everything.
pub struct Grouper {
    config: GrouperConfig,
    embedder: Arc<dyn Embedder>,
    oracle: Arc<dyn PairwiseOracle>,
    index: VectorIndex,
    dsu: DisjointSetStore,
}

impl Grouper {
    /// Create a grouper with an empty index sized to the embedder.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        oracle: Arc<dyn PairwiseOracle>,
        config: GrouperConfig,
    ) -> Self {
        let index = VectorIndex::new(embedder.dimension(), config.backend);
        Self {
            config,
            embedder,
            oracle,
            index,
            dsu: DisjointSetStore::new(),
        }
    }

    /// Run the full grouping pass for a batch of records.
    ///
    /// Steps: embed all projections, insert entries as singletons, run the
    /// batched self-excluded neighbor search, fan candidate pairs out to
    /// the oracle in bounded chunks (each chunk's calls run concurrently
    /// and are fully awaited before the next chunk starts, with verdicts
    /// re-aligned to their pair positions), then union every positive
    /// pair. An empty batch returns without touching the oracle.
    pub async fn process_records(&mut self, records: &[Record]) -> Result<(), PipelineError> {
        if records.is_empty() {
            return Ok(());
        }
        let started = Instant::now();

        // Embed and insert. Synchronous, runs to completion before any
        // oracle call is issued; nothing else mutates the index afterward.
        let texts: Vec<String> = records.iter().map(Record::projection_text).collect();
        let vectors = self.embedder.embed_batch(&texts)?;

        let entries: Vec<StoreEntry> = records
            .iter()
            .zip(&vectors)
            .map(|(record, vector)| StoreEntry {
                id: record.id.clone(),
                vector: vector.clone(),
                data: record.data.clone(),
            })
            .collect();
        self.index.insert_batch(entries)?;
        self.dsu.register(records.iter().map(|r| r.id.clone()))?;

        // Batched ANN, excluding each record from its own neighbor list
        let excludes: Vec<Option<&str>> = records.iter().map(|r| Some(r.id.as_str())).collect();
        let neighbors = self
            .index
            .knn_batch(&vectors, self.config.max_neighbors, &excludes)?;

        // Candidate pairs. The same logical pair can appear from both
        // endpoints' neighbor lists; duplicates are harmless and bounded
        // by 2 * k * n, so no dedup before the fan-out.
        let mut pairs = Vec::new();
        for (record, hits) in records.iter().zip(&neighbors) {
            for hit in hits {
                pairs.push(CandidatePair {
                    id_a: &record.id,
                    id_b: &hit.id,
                    data_a: &record.data,
                    data_b: &hit.data,
                });
            }
        }

        // Chunked fan-out. The chunk boundary is the back-pressure knob:
        // at most `oracle_chunk_size` verdicts are in flight at once.
        let chunk_size = self.config.oracle_chunk_size.max(1);
        let mut matches: Vec<(String, String)> = Vec::new();
        for chunk in pairs.chunks(chunk_size) {
            let verdicts = join_all(
                chunk
                    .iter()
                    .map(|pair| self.oracle.are_duplicates(pair.data_a, pair.data_b)),
            )
            .await;

            for (pair, verdict) in chunk.iter().zip(verdicts) {
                if verdict? {
                    matches.push((pair.id_a.to_string(), pair.id_b.to_string()));
                }
            }
        }

        let pair_count = pairs.len();
        let match_count = matches.len();
        self.dsu.batch_union(&matches)?;

        tracing::info!(
            target: "dedupit::pipeline",
            records = records.len(),
            pairs = pair_count,
            matches = match_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "grouping pass complete"
        );
        Ok(())
    }

    /// Every record's group id (root id) after the grouping pass.
    pub fn groups(&self) -> std::collections::BTreeMap<String, String> {
        self.dsu.groups()
    }

    /// The request-scoped index, for group assembly.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}
