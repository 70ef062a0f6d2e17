//! # dedupit
//!
//! Deduplication of semi-structured records with an LLM in the loop.
//! Up to 100 records go in; equivalence groups with one merged
//! representative per group come out.
//!
//! The grouping engine retrieves candidate pairs from an embedding-indexed
//! approximate-nearest-neighbor search, has a pairwise oracle adjudicate
//! each pair with a YES/NO verdict, folds positive verdicts into an
//! in-memory union-find, and merges every non-singleton group through a
//! record merger.
//!
//! # Quick start
//!
//! ```no_run
//! use dedupit::{dedupe_records, DedupeConfig, Record};
//!
//! # async fn run() -> Result<(), dedupit::DedupeError> {
//! let config = DedupeConfig::from_env();
//! let records: Vec<Record> = serde_json::from_str(
//!     r#"[{"id": "a", "data": {"name": "Acme Inc."}},
//!         {"id": "b", "data": {"name": "Acme Corporation"}}]"#,
//! )
//! .unwrap();
//!
//! let result = dedupe_records(records, &config).await?;
//! for group in &result.groups {
//!     println!("{} <- {:?}", group.group_id, group.record_ids);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! | Crate | Responsibility |
//! |-------|----------------|
//! | `dedupit-core` | Record model, seam traits, config, limits, errors |
//! | `dedupit-engine` | Vector index (HNSW), disjoint-set store, pipeline |
//! | `dedupit-intelligence` | LLM-backed embedder, oracle, and merger |
//! | `dedupit-server` | HTTP endpoint and binary |
//!
//! The index and forest are scoped to one request; nothing persists
//! across calls. The embedding model handle and the LLM client are
//! process-wide singletons keyed by configuration.

pub mod error;
pub mod service;

pub use error::DedupeError;
pub use service::{dedupe_records, dedupe_with};

pub use dedupit_core::{
    DedupeConfig, DedupeResult, Embedder, FieldMap, GroupResult, PairwiseOracle, Record,
    RecordMerger, MAX_RECORDS_PER_REQUEST, MAX_REQUEST_BODY_BYTES,
};
pub use dedupit_engine::{BackendKind, Grouper, GrouperConfig};
pub use dedupit_intelligence::{embedder_for, HashEmbedder, LlmComparator, LlmMerger};
