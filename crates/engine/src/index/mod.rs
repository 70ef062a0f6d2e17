//! Request-scoped vector index.
//!
//! Stores `(id, vector, payload)` tuples and answers batched top-k
//! similarity queries with per-query exclusion. The index is created on
//! request entry, lives entirely in memory, and is dropped (on every exit
//! path, by ownership) when the request finishes.
//!
//! Structure:
//!
//! - **VectorIndex**: facade owning ids, payloads, and the embedding slab
//! - **IndexBackend**: swappable k-NN structure ([`BackendKind::Hnsw`] by
//!   default, [`BackendKind::BruteForce`] for exact search)
//!
//! Ordering contract: hits come back sorted by cosine similarity
//! descending (equivalently, distance ascending), ties broken by record
//! id ascending.

pub mod backend;
pub mod brute_force;
pub mod distance;
pub mod error;
pub mod hnsw;
mod slab;

use std::collections::HashMap;
use std::time::Instant;

use dedupit_core::{FieldMap, Record};

pub use backend::BackendKind;
pub use error::{IndexError, IndexResult};
pub use hnsw::HnswConfig;

use backend::IndexBackend;
use slab::VectorSlab;

/// One indexed entry: a record plus its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    /// Record id, unique within the index
    pub id: String,
    /// Embedding of the record's textual projection
    pub vector: Vec<f32>,
    /// The record's payload, carried through to hits
    pub data: FieldMap,
}

/// One k-NN result.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Id of the matched entry
    pub id: String,
    /// Payload of the matched entry
    pub data: FieldMap,
    /// Cosine similarity to the query (higher = more similar)
    pub score: f32,
}

#[derive(Debug)]
struct EntryMeta {
    id: String,
    data: FieldMap,
}

/// In-memory vector index over a fixed dimension.
pub struct VectorIndex {
    slab: VectorSlab,
    backend: Box<dyn IndexBackend>,
    entries: Vec<EntryMeta>,
    by_id: HashMap<String, u32>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("dimension", &self.slab.dimension())
            .field("len", &self.entries.len())
            .finish()
    }
}

impl VectorIndex {
    /// Create an empty index of fixed `dimension` on the given backend.
    pub fn new(dimension: usize, kind: BackendKind) -> Self {
        Self {
            slab: VectorSlab::new(dimension),
            backend: kind.create(),
            entries: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed vector dimension.
    pub fn dimension(&self) -> usize {
        self.slab.dimension()
    }

    /// Insert a batch of entries. Atomic: every entry is validated
    /// (dimension, id uniqueness within the batch and against the index)
    /// before the first one is stored, so a failed call leaves the index
    /// unchanged.
    pub fn insert_batch(&mut self, entries: Vec<StoreEntry>) -> IndexResult<()> {
        let started = Instant::now();

        for entry in &entries {
            if entry.vector.len() != self.slab.dimension() {
                return Err(IndexError::DimensionMismatch {
                    expected: self.slab.dimension(),
                    actual: entry.vector.len(),
                });
            }
            if self.by_id.contains_key(&entry.id) {
                return Err(IndexError::DuplicateId(entry.id.clone()));
            }
        }
        {
            let mut seen = HashMap::with_capacity(entries.len());
            for entry in &entries {
                if seen.insert(entry.id.as_str(), ()).is_some() {
                    return Err(IndexError::DuplicateId(entry.id.clone()));
                }
            }
        }

        let count = entries.len();
        for entry in entries {
            let slot = self.slab.push(&entry.vector)?;
            self.backend.insert(slot, &self.slab);
            self.by_id.insert(entry.id.clone(), slot);
            self.entries.push(EntryMeta {
                id: entry.id,
                data: entry.data,
            });
        }

        tracing::info!(
            target: "dedupit::index",
            inserted = count,
            total = self.entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "insert_batch complete"
        );
        Ok(())
    }

    /// Batched top-k query with one optional exclusion id per query.
    ///
    /// For each `queries[i]`, returns up to `k` hits sorted (similarity
    /// desc, id asc), never including the entry whose id equals
    /// `excludes[i]`. Querying an empty index yields empty hit lists.
    pub fn knn_batch(
        &self,
        queries: &[Vec<f32>],
        k: usize,
        excludes: &[Option<&str>],
    ) -> IndexResult<Vec<Vec<Hit>>> {
        if queries.len() != excludes.len() {
            return Err(IndexError::QueryBatchMismatch {
                queries: queries.len(),
                excludes: excludes.len(),
            });
        }

        let started = Instant::now();
        let mut results = Vec::with_capacity(queries.len());

        for (query, exclude) in queries.iter().zip(excludes) {
            if query.len() != self.slab.dimension() {
                return Err(IndexError::DimensionMismatch {
                    expected: self.slab.dimension(),
                    actual: query.len(),
                });
            }

            if self.entries.is_empty() {
                results.push(Vec::new());
                continue;
            }

            // Over-fetch by one so an excluded self-hit cannot shrink the
            // result below k
            let fetch = if exclude.is_some() { k + 1 } else { k };
            let scored = self.backend.search(query, fetch, &self.slab);

            let mut hits: Vec<Hit> = scored
                .into_iter()
                .map(|s| {
                    let meta = &self.entries[s.slot as usize];
                    Hit {
                        id: meta.id.clone(),
                        data: meta.data.clone(),
                        score: s.score,
                    }
                })
                .filter(|hit| Some(hit.id.as_str()) != *exclude)
                .collect();

            // Backend ties break by slot; the contract breaks them by id
            hits.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });
            hits.truncate(k);
            results.push(hits);
        }

        tracing::info!(
            target: "dedupit::index",
            queries = queries.len(),
            k,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "knn_batch complete"
        );
        Ok(results)
    }

    /// Point lookup by id, preserving request order.
    pub fn get(&self, ids: &[&str]) -> IndexResult<Vec<Record>> {
        ids.iter()
            .map(|id| {
                let slot = self
                    .by_id
                    .get(*id)
                    .ok_or_else(|| IndexError::NotFound((*id).to_string()))?;
                let meta = &self.entries[*slot as usize];
                Ok(Record::new(meta.id.clone(), meta.data.clone()))
            })
            .collect()
    }
}
