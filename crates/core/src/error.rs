//! Error types for the core contracts.
//!
//! Each seam trait gets its own `thiserror` enum so callers can
//! distinguish retryable conditions (oracle rate limits) from permanent
//! failures without string matching. The engine and facade wrap these in
//! their own enums; only the oracle's rate-limit kind is ever recovered
//! from locally.

use std::time::Duration;
use thiserror::Error;

/// Batch-level input violations, detected before any work happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A record arrived with an empty id
    #[error("record id must be non-empty")]
    EmptyId,

    /// Two records in one batch share an id
    #[error("duplicate record id: {0}")]
    DuplicateId(String),
}

/// Errors from the embedding model. All of these are fatal for the request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// The model could not be initialized (bad endpoint, bad model name)
    #[error("embedding model initialization failed: {0}")]
    Init(String),

    /// The embedding request failed in transit
    #[error("embedding request failed: {0}")]
    Request(String),

    /// The endpoint replied with something we could not use
    #[error("malformed embedding response: {0}")]
    Response(String),

    /// A returned vector does not match the declared dimension
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension {
        /// Dimension the embedder declared
        expected: usize,
        /// Dimension actually returned
        actual: usize,
    },
}

/// Errors from the pairwise oracle.
///
/// `RateLimited` is the only retryable kind; the client retries it with
/// exponential backoff before it ever reaches the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The provider rejected the call with a rate-limit signal
    #[error("oracle rate limited")]
    RateLimited {
        /// Provider-supplied wait hint, if any
        retry_after: Option<Duration>,
    },

    /// Credentials were rejected
    #[error("oracle authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure
    #[error("oracle request failed: {0}")]
    Network(String),

    /// The reply could not be extracted from the response envelope
    #[error("malformed oracle response: {0}")]
    Parse(String),

    /// The call exceeded its deadline
    #[error("oracle request timed out")]
    Timeout,
}

impl OracleError {
    /// True for the transient kind that the client retries with backoff.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, OracleError::RateLimited { .. })
    }
}

/// Errors from the record merger. Fatal for the request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The merger's reply was not a JSON object
    #[error("merger returned invalid JSON: {0}")]
    InvalidJson(String),

    /// The merge call itself failed
    #[error("merge request failed: {0}")]
    Request(String),
}
