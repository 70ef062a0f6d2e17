//! Error types for the vector index.

use thiserror::Error;

/// Result type alias for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Errors from the vector index. All of these indicate caller bugs and
/// are fatal for the request; none are retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A vector's length does not match the index dimension
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The index's fixed dimension
        expected: usize,
        /// The offending vector's length
        actual: usize,
    },

    /// An entry id appears twice, either within one batch or across batches
    #[error("duplicate entry id: {0}")]
    DuplicateId(String),

    /// A lookup referenced an id that was never inserted
    #[error("entry not found: {0}")]
    NotFound(String),

    /// A batched query's exclusion list does not line up with its queries
    #[error("query batch mismatch: {queries} queries but {excludes} exclusions")]
    QueryBatchMismatch {
        /// Number of query vectors
        queries: usize,
        /// Number of exclusion entries
        excludes: usize,
    },
}
