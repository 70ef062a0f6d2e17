//! Deterministic hashing embedder for tests and offline runs.

use dedupit_core::{EmbedError, Embedder};

/// Embedder that hashes whitespace tokens into buckets.
///
/// No model, no network: each token lands in a bucket by FNV-1a hash and
/// the bucket counts are unit-normalized. Shared tokens between two texts
/// mean higher cosine similarity, which is all the neighbor search needs.
/// Deterministic across runs and platforms.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; self.dimension];
                for token in text.split_whitespace() {
                    let bucket = fnv1a(token.as_bytes()) as usize % self.dimension;
                    vector[bucket] += 1.0;
                }
                let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for x in &mut vector {
                        *x /= norm;
                    }
                }
                vector
            })
            .collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
