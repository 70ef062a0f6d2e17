//! Seam traits between the pipeline and its external capabilities.
//!
//! The grouping engine only ever sees these three contracts. Production
//! implementations (an embeddings endpoint and chat-completion clients)
//! live in `dedupit-intelligence`; tests substitute scripted ones.

use async_trait::async_trait;

use crate::error::{EmbedError, MergeError, OracleError};
use crate::record::FieldMap;

/// Maps record projections to fixed-dimension vectors.
///
/// Embedding is a synchronous, CPU/network-discrete step: the pipeline
/// runs it to completion before any oracle fan-out begins, so the trait
/// is deliberately not async. Implementations must be deterministic for a
/// fixed model and return unit-normalized vectors.
pub trait Embedder: Send + Sync {
    /// The dimension every returned vector has.
    fn dimension(&self) -> usize;

    /// Embed a batch of projection strings.
    ///
    /// The output has one vector per input, in input order, each of
    /// [`dimension`](Self::dimension) width.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

/// Decides whether two record payloads describe the same real-world entity.
///
/// Safe to invoke many times concurrently; the pipeline bounds the
/// parallelism, not the implementation.
#[async_trait]
pub trait PairwiseOracle: Send + Sync {
    /// Boolean same-entity verdict for a pair of payloads.
    async fn are_duplicates(&self, a: &FieldMap, b: &FieldMap) -> Result<bool, OracleError>;
}

/// Collapses a group of same-entity records into one canonical record.
#[async_trait]
pub trait RecordMerger: Send + Sync {
    /// Merge two or more records sharing a schema into one record with
    /// the same schema. A single-record input returns that record.
    async fn merge(&self, records: &[FieldMap]) -> Result<FieldMap, MergeError>;
}
