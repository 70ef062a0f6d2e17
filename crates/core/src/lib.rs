//! Core types and contracts for the dedupit deduplication service.
//!
//! This crate defines the shared vocabulary of the system:
//!
//! - **Record**: an opaque id plus a dynamic JSON field map, and its
//!   textual projection used for embedding
//! - **Seam traits**: [`Embedder`], [`PairwiseOracle`] and [`RecordMerger`],
//!   the three external capabilities the pipeline depends on
//! - **DedupeConfig**: tunables with environment overrides
//! - **Request limits**: batch size and body size caps enforced before
//!   any work happens
//! - **Error types**: per-concern `thiserror` enums
//!
//! Nothing in here performs I/O; implementations of the seam traits live
//! in `dedupit-intelligence`, and the pipeline that drives them lives in
//! `dedupit-engine`.

pub mod config;
pub mod error;
pub mod limits;
pub mod record;
pub mod traits;
pub mod types;

pub use config::DedupeConfig;
pub use error::{EmbedError, MergeError, OracleError, RecordError};
pub use limits::{LimitError, MAX_RECORDS_PER_REQUEST, MAX_REQUEST_BODY_BYTES};
pub use record::{projection_text, FieldMap, Record, RESERVED_FIELD_PREFIX};
pub use traits::{Embedder, PairwiseOracle, RecordMerger};
pub use types::{DedupeResult, GroupResult};
