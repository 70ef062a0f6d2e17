//! Top-level error type for the service facade.

use thiserror::Error;

use dedupit_core::{EmbedError, LimitError, MergeError, OracleError, RecordError};
use dedupit_engine::PipelineError;

/// Anything a dedupe request can fail with.
///
/// The HTTP layer maps [`is_size_limit`](DedupeError::is_size_limit)
/// failures to 413 and everything else to 500; no partial results are
/// ever returned.
#[derive(Debug, Error)]
pub enum DedupeError {
    /// The request exceeds a size limit; rejected before any work
    #[error(transparent)]
    Limit(#[from] LimitError),

    /// A record violates the id invariants
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The embedder could not be initialized
    #[error(transparent)]
    Embed(#[from] EmbedError),

    /// An LLM client could not be initialized
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The merger could not be initialized
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// The grouping pipeline or group assembly failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl DedupeError {
    /// True for violations of the request size limits.
    pub fn is_size_limit(&self) -> bool {
        matches!(self, DedupeError::Limit(_))
    }
}
