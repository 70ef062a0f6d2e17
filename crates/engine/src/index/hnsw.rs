//! HNSW (Hierarchical Navigable Small World) search backend.
//!
//! Approximate nearest neighbor search with incremental inserts: the
//! index is populated and queried in the same request pass, so there is
//! no build/seal phase. Deterministic for a fixed insert sequence:
//!
//! - Fixed splitmix64 seed + monotonic counter for level assignment
//! - `BTreeSet` neighbor lists (sorted iteration)
//! - Tie-breaking: (score desc, slot asc)
//!
//! The graph stores only structure; embeddings stay in the index's
//! [`VectorSlab`](super::slab::VectorSlab) and are borrowed for distance
//! computation.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use super::backend::{sort_hits, IndexBackend, ScoredSlot};
use super::distance::cosine_similarity;
use super::slab::VectorSlab;

/// HNSW tuning parameters.
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Max connections per layer above 0; layer 0 allows `2 * m`
    pub m: usize,
    /// Build-time beam width
    pub ef_construction: usize,
    /// Search-time beam width (raised to `k` when `k` is larger)
    pub ef_search: usize,
    /// Level multiplier, `1 / ln(m)`
    ml: f64,
}

impl Default for HnswConfig {
    fn default() -> Self {
        let m = 16;
        Self {
            m,
            ef_construction: 200,
            ef_search: 50,
            ml: 1.0 / (m as f64).ln(),
        }
    }
}

impl HnswConfig {
    fn max_connections(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m * 2
        } else {
            self.m
        }
    }
}

/// A node in the graph: per-layer sorted neighbor sets.
#[derive(Debug)]
struct Node {
    /// neighbors[layer] = slots adjacent at that layer
    neighbors: Vec<BTreeSet<u32>>,
}

impl Node {
    fn new(max_layer: usize) -> Self {
        Self {
            neighbors: (0..=max_layer).map(|_| BTreeSet::new()).collect(),
        }
    }

    fn max_layer(&self) -> usize {
        self.neighbors.len() - 1
    }
}

/// HNSW backend. Nodes are addressed by the same dense slots as the slab.
#[derive(Debug)]
pub(crate) struct HnswBackend {
    config: HnswConfig,
    nodes: Vec<Node>,
    entry_point: Option<u32>,
    max_level: usize,
    rng_seed: u64,
    rng_counter: u64,
}

impl Default for HnswBackend {
    fn default() -> Self {
        Self::new(HnswConfig::default())
    }
}

impl HnswBackend {
    pub(crate) fn new(config: HnswConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            entry_point: None,
            max_level: 0,
            rng_seed: 42,
            rng_counter: 0,
        }
    }

    /// Deterministic level assignment: splitmix64 over a fixed seed and a
    /// monotonic counter, mapped through the exponential distribution.
    fn assign_level(&mut self) -> usize {
        self.rng_counter += 1;
        let hash = splitmix64(self.rng_seed.wrapping_add(self.rng_counter));
        let uniform = (hash as f64) / (u64::MAX as f64);
        let uniform = uniform.max(1e-15);
        (-uniform.ln() * self.config.ml) as usize
    }

    /// Beam search at one layer (SEARCH-LAYER): returns up to `ef` closest
    /// slots, sorted (score desc, slot asc).
    fn search_layer(
        &self,
        query: &[f32],
        entry: u32,
        ef: usize,
        layer: usize,
        slab: &VectorSlab,
    ) -> Vec<ScoredSlot> {
        let entry_score = cosine_similarity(query, slab.get(entry));

        let mut visited = BTreeSet::new();
        visited.insert(entry);

        // Candidates: max-heap, nearest popped first for expansion
        let mut candidates = BinaryHeap::new();
        candidates.push(ScoredSlot {
            score: entry_score,
            slot: entry,
        });

        // Results: min-heap via Reverse, worst on top for O(1) eviction
        let mut results: BinaryHeap<Reverse<ScoredSlot>> = BinaryHeap::new();
        results.push(Reverse(ScoredSlot {
            score: entry_score,
            slot: entry,
        }));

        while let Some(nearest) = candidates.pop() {
            let worst = results
                .peek()
                .map(|r| r.0.score)
                .unwrap_or(f32::NEG_INFINITY);
            if nearest.score < worst && results.len() >= ef {
                break;
            }

            if let Some(node) = self.nodes.get(nearest.slot as usize) {
                if layer < node.neighbors.len() {
                    for &neighbor in &node.neighbors[layer] {
                        if !visited.insert(neighbor) {
                            continue;
                        }

                        let score = cosine_similarity(query, slab.get(neighbor));
                        let worst = results
                            .peek()
                            .map(|r| r.0.score)
                            .unwrap_or(f32::NEG_INFINITY);

                        if results.len() < ef || score > worst {
                            candidates.push(ScoredSlot {
                                score,
                                slot: neighbor,
                            });
                            results.push(Reverse(ScoredSlot {
                                score,
                                slot: neighbor,
                            }));
                            if results.len() > ef {
                                results.pop();
                            }
                        }
                    }
                }
            }
        }

        let mut out: Vec<ScoredSlot> = results.into_iter().map(|r| r.0).collect();
        sort_hits(&mut out);
        out
    }

    /// Greedy descent from `from_layer` down to `to_layer`, moving to the
    /// globally best neighbor at each step (SEARCH-LAYER with ef = 1).
    fn greedy_descent(
        &self,
        query: &[f32],
        entry: u32,
        from_layer: usize,
        to_layer: usize,
        slab: &VectorSlab,
    ) -> u32 {
        let mut current = entry;

        for layer in (to_layer..=from_layer).rev() {
            loop {
                let mut best_score = cosine_similarity(query, slab.get(current));
                let mut best = current;

                let node = &self.nodes[current as usize];
                if layer < node.neighbors.len() {
                    for &neighbor in &node.neighbors[layer] {
                        let score = cosine_similarity(query, slab.get(neighbor));
                        if score > best_score || (score == best_score && neighbor < best) {
                            best_score = score;
                            best = neighbor;
                        }
                    }
                }

                if best == current {
                    break;
                }
                current = best;
            }
        }

        current
    }

    /// Re-trim a node's neighbor set at `layer` to its connection budget,
    /// keeping the closest.
    fn prune_neighbors(&mut self, slot: u32, layer: usize, max_connections: usize, slab: &VectorSlab) {
        let embedding = slab.get(slot);

        let mut scored: Vec<ScoredSlot> = self.nodes[slot as usize].neighbors[layer]
            .iter()
            .map(|&n| ScoredSlot {
                score: cosine_similarity(embedding, slab.get(n)),
                slot: n,
            })
            .collect();
        sort_hits(&mut scored);

        let keep: BTreeSet<u32> = scored
            .iter()
            .take(max_connections)
            .map(|s| s.slot)
            .collect();
        self.nodes[slot as usize].neighbors[layer] = keep;
    }
}

impl IndexBackend for HnswBackend {
    /// INSERT: greedy descent to the node's level, then beam search and
    /// bidirectional linking at each layer from that level down, pruning
    /// any neighbor that overflows its connection budget.
    fn insert(&mut self, slot: u32, slab: &VectorSlab) {
        debug_assert_eq!(slot as usize, self.nodes.len(), "slots must arrive densely");

        let level = self.assign_level();
        self.nodes.push(Node::new(level));

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(slot);
            self.max_level = level;
            return;
        };

        let embedding: Vec<f32> = slab.get(slot).to_vec();

        let mut current_entry = entry;
        if self.max_level > level {
            current_entry = self.greedy_descent(&embedding, entry, self.max_level, level + 1, slab);
        }

        let start_layer = level.min(self.max_level);
        for layer in (0..=start_layer).rev() {
            let candidates = self.search_layer(
                &embedding,
                current_entry,
                self.config.ef_construction,
                layer,
                slab,
            );

            // New node connects to its M closest candidates
            let selected: Vec<u32> = candidates
                .iter()
                .take(self.config.m)
                .map(|s| s.slot)
                .collect();

            for &neighbor in &selected {
                self.nodes[slot as usize].neighbors[layer].insert(neighbor);
            }

            // Reverse edges, pruning neighbors that exceed their budget
            let max_conn = self.config.max_connections(layer);
            for &neighbor in &selected {
                let node = &mut self.nodes[neighbor as usize];
                if layer < node.neighbors.len() {
                    node.neighbors[layer].insert(slot);
                    if node.neighbors[layer].len() > max_conn {
                        self.prune_neighbors(neighbor, layer, max_conn, slab);
                    }
                }
            }

            if let Some(closest) = candidates.first() {
                current_entry = closest.slot;
            }
        }

        if level > self.max_level {
            self.entry_point = Some(slot);
            self.max_level = level;
        }
    }

    fn search(&self, query: &[f32], k: usize, slab: &VectorSlab) -> Vec<ScoredSlot> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let entry = match self.entry_point {
            Some(slot) => slot,
            None => return Vec::new(),
        };

        let mut current_entry = entry;
        if self.max_level > 0 {
            current_entry = self.greedy_descent(query, entry, self.max_level, 1, slab);
        }

        let ef = self.config.ef_search.max(k);
        let mut hits = self.search_layer(query, current_entry, ef, 0, slab);
        hits.truncate(k);
        hits
    }
}

/// SplitMix64 mixer, the deterministic PRNG behind level assignment.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}
