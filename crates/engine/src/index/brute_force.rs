//! Exact k-NN by linear scan.
//!
//! O(n) per query. Exact results make this the reference backend for
//! tests, and for batches this service accepts (n <= 100) it is
//! competitive with the graph in practice.

use super::backend::{sort_hits, IndexBackend, ScoredSlot};
use super::distance::cosine_similarity;
use super::slab::VectorSlab;

/// Linear-scan backend. Holds no state of its own; the slab is the index.
#[derive(Debug, Default)]
pub(crate) struct BruteForceBackend {
    len: u32,
}

impl BruteForceBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl IndexBackend for BruteForceBackend {
    fn insert(&mut self, slot: u32, _slab: &VectorSlab) {
        debug_assert_eq!(slot, self.len, "slots must arrive densely");
        self.len = slot + 1;
    }

    fn search(&self, query: &[f32], k: usize, slab: &VectorSlab) -> Vec<ScoredSlot> {
        if k == 0 || slab.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredSlot> = (0..self.len)
            .map(|slot| ScoredSlot {
                score: cosine_similarity(query, slab.get(slot)),
                slot,
            })
            .collect();
        sort_hits(&mut scored);
        scored.truncate(k);
        scored
    }
}
