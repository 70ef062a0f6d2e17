//! The dedupe pipeline.
//!
//! [`Grouper`] drives one request through embed → insert → batched ANN →
//! bounded oracle fan-out → batch union; [`assemble_groups`] then
//! flattens the forest and merges every non-singleton group. Both halves
//! are generic over the seam traits in `dedupit-core`.

pub mod assembler;
pub mod grouper;

use thiserror::Error;

use dedupit_core::{EmbedError, MergeError, OracleError};

use crate::dsu::DsuError;
use crate::index::IndexError;

pub use assembler::assemble_groups;
pub use grouper::{Grouper, GrouperConfig};

/// Anything that can abort a pipeline run. No local recovery happens at
/// this level; the oracle client has already spent its rate-limit
/// retries by the time an [`OracleError`] surfaces here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Embedding model initialization or inference failed
    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    /// Vector index rejected an insert or query
    #[error("vector index failure: {0}")]
    Index(#[from] IndexError),

    /// Disjoint-set store rejected an operation
    #[error("disjoint-set failure: {0}")]
    Dsu(#[from] DsuError),

    /// An oracle call failed permanently
    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),

    /// A group merge failed
    #[error("merge failure: {0}")]
    Merge(#[from] MergeError),
}
