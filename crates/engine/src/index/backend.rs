//! Search backend trait for the vector index.
//!
//! The index owns the embeddings (in a [`VectorSlab`](super::slab::VectorSlab))
//! and the id/payload bookkeeping; a backend only maintains whatever
//! structure it needs to answer k-NN queries over slots. Two backends
//! exist: brute force (exact, O(n) per query) and HNSW (approximate,
//! O(log n) per query). Both are deterministic for a fixed insert
//! sequence and tie-break identically.

use std::cmp::Ordering;

use super::slab::VectorSlab;

/// A slot with its similarity score.
///
/// Natural ordering: higher score = `Greater`, ties broken so the lower
/// slot compares `Greater` (preferred). A `BinaryHeap<ScoredSlot>` pops
/// the best candidate first; `BinaryHeap<Reverse<ScoredSlot>>` pops the
/// worst result first for O(1) eviction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoredSlot {
    pub(crate) score: f32,
    pub(crate) slot: u32,
}

impl Eq for ScoredSlot {}

impl PartialOrd for ScoredSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

/// Sort hits for returning: score descending, slot ascending on ties.
pub(crate) fn sort_hits(hits: &mut [ScoredSlot]) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.slot.cmp(&b.slot))
    });
}

/// A swappable k-NN structure over the slots of a [`VectorSlab`].
pub(crate) trait IndexBackend: Send + Sync {
    /// Register the vector at `slot`; the slab already holds its data.
    /// Slots arrive in strictly increasing order.
    fn insert(&mut self, slot: u32, slab: &VectorSlab);

    /// Up to `k` nearest slots, sorted (score desc, slot asc).
    fn search(&self, query: &[f32], k: usize, slab: &VectorSlab) -> Vec<ScoredSlot>;
}

/// Which backend a [`VectorIndex`](super::VectorIndex) is built on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Approximate HNSW graph search
    #[default]
    Hnsw,
    /// Exact linear scan
    BruteForce,
}

impl BackendKind {
    pub(crate) fn create(self) -> Box<dyn IndexBackend> {
        match self {
            BackendKind::Hnsw => Box::new(super::hnsw::HnswBackend::default()),
            BackendKind::BruteForce => Box::new(super::brute_force::BruteForceBackend::new()),
        }
    }
}
