//! LLM-backed implementations of the dedupit seam traits.
//!
//! - [`llm_client`]: shared chat-completions plumbing, the unified error
//!   type, the async HTTP call, and the rate-limit retry loop used by
//!   both the comparator and the merger
//! - [`embed`]: the [`Embedder`](dedupit_core::Embedder) implementations:
//!   an OpenAI-compatible embeddings endpoint for production and a
//!   deterministic hashing embedder for tests and offline runs
//! - [`compare`]: the pairwise oracle: prompt, YES/NO verdict parsing,
//!   and the [`PairwiseOracle`](dedupit_core::PairwiseOracle) client
//! - [`merge`]: the group merger: prompt, JSON reply parsing, and the
//!   [`RecordMerger`](dedupit_core::RecordMerger) client
//!
//! Model handles are process-wide singletons keyed by configuration,
//! initialized lazily and never mutated after creation.

pub mod compare;
pub mod embed;
pub mod llm_client;
pub mod merge;

pub use compare::LlmComparator;
pub use embed::{embedder_for, ApiEmbedder, HashEmbedder};
pub use llm_client::{shared_chat_client, ChatClient, LlmClientError, RetryPolicy};
pub use merge::LlmMerger;
