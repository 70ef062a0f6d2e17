//! Embedder implementations and the process-wide model cache.
//!
//! Production embedding goes through an OpenAI-compatible `/embeddings`
//! endpoint ([`ApiEmbedder`]); [`HashEmbedder`] is a deterministic
//! offline stand-in for tests. The model handle is resolved once per
//! configuration and cached for the life of the process.

pub mod api;
pub mod mock;

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use dedupit_core::{DedupeConfig, EmbedError, Embedder};

pub use api::ApiEmbedder;
pub use mock::HashEmbedder;

/// Process-wide embedder cache keyed by configuration.
static EMBEDDERS: Lazy<DashMap<String, Arc<ApiEmbedder>>> = Lazy::new(DashMap::new);

/// The shared embedder for a configuration. Built on first use, reused by
/// every subsequent request with the same endpoint/model/dimension.
pub fn embedder_for(config: &DedupeConfig) -> Result<Arc<dyn Embedder>, EmbedError> {
    let key = format!(
        "{}|{}|{}",
        config.embedding_endpoint, config.embedding_model_name, config.embedding_dimension
    );
    if let Some(embedder) = EMBEDDERS.get(&key) {
        return Ok(Arc::clone(&embedder) as Arc<dyn Embedder>);
    }
    let embedder = Arc::new(ApiEmbedder::new(config)?);
    EMBEDDERS.insert(key, Arc::clone(&embedder));
    Ok(embedder as Arc<dyn Embedder>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_is_cached_per_config() {
        let config = DedupeConfig::default();
        let a = embedder_for(&config).unwrap();
        let b = embedder_for(&config).unwrap();
        assert_eq!(a.dimension(), b.dimension());

        let mut other = config.clone();
        other.embedding_model_name = "intfloat/e5-small".to_string();
        other.embedding_dimension = 384;
        let c = embedder_for(&other).unwrap();
        assert_eq!(c.dimension(), 384);
    }
}
