//! Service configuration.
//!
//! Defaults match the tuned values of the deployed service; every knob can
//! be overridden through a `DEDUPIT_*` environment variable. The API key
//! is only ever read from the environment and never stored in config
//! files or logs.

use std::time::Duration;

/// Tunables for one dedupit process.
#[derive(Debug, Clone, PartialEq)]
pub struct DedupeConfig {
    /// Sentence-embedding model to load, e.g. `intfloat/e5-base`
    pub embedding_model_name: String,
    /// Base URL of the OpenAI-compatible embeddings endpoint
    pub embedding_endpoint: String,
    /// Dimension the embedding model produces
    pub embedding_dimension: usize,
    /// Prefix prepended to every projection before embedding.
    /// The e5 model family expects `passage: ` on document-side inputs.
    pub embedding_text_prefix: String,
    /// `k` for the ANN neighbor search
    pub max_neighbors: usize,
    /// Oracle calls issued per fan-out chunk
    pub oracle_chunk_size: usize,
    /// Rate-limit retries before giving up
    pub max_retries: usize,
    /// First backoff delay; doubles on each further rate-limit retry
    pub initial_delay: Duration,
    /// Base URL of the OpenAI-compatible chat completions endpoint
    pub llm_endpoint: String,
    /// Chat model used for pairwise comparison and merging
    pub llm_model: String,
    /// Bearer token for the LLM endpoint, if it requires one
    pub llm_api_key: Option<String>,
    /// Per-call timeout for both LLM and embedding requests
    pub request_timeout: Duration,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            embedding_model_name: "intfloat/e5-base".to_string(),
            embedding_endpoint: "http://localhost:8081".to_string(),
            embedding_dimension: 768,
            embedding_text_prefix: "passage: ".to_string(),
            max_neighbors: 3,
            oracle_chunk_size: 200,
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
            llm_endpoint: "http://localhost:11434/v1".to_string(),
            llm_model: "qwen3:1.7b".to_string(),
            llm_api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl DedupeConfig {
    /// Defaults overlaid with any `DEDUPIT_*` environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("DEDUPIT_EMBEDDING_MODEL") {
            config.embedding_model_name = v;
        }
        if let Ok(v) = std::env::var("DEDUPIT_EMBEDDING_ENDPOINT") {
            config.embedding_endpoint = v;
        }
        if let Some(v) = parse_env("DEDUPIT_EMBEDDING_DIMENSION") {
            config.embedding_dimension = v;
        }
        if let Ok(v) = std::env::var("DEDUPIT_EMBEDDING_TEXT_PREFIX") {
            config.embedding_text_prefix = v;
        }
        if let Some(v) = parse_env("DEDUPIT_MAX_NEIGHBORS") {
            config.max_neighbors = v;
        }
        if let Some(v) = parse_env("DEDUPIT_ORACLE_CHUNK_SIZE") {
            config.oracle_chunk_size = v;
        }
        if let Some(v) = parse_env("DEDUPIT_MAX_RETRIES") {
            config.max_retries = v;
        }
        if let Some(ms) = parse_env::<u64>("DEDUPIT_INITIAL_DELAY_MS") {
            config.initial_delay = Duration::from_millis(ms);
        }
        if let Ok(v) = std::env::var("DEDUPIT_LLM_ENDPOINT") {
            config.llm_endpoint = v;
        }
        if let Ok(v) = std::env::var("DEDUPIT_LLM_MODEL") {
            config.llm_model = v;
        }
        if let Ok(v) = std::env::var("DEDUPIT_LLM_API_KEY") {
            if !v.is_empty() {
                config.llm_api_key = Some(v);
            }
        }
        if let Some(ms) = parse_env::<u64>("DEDUPIT_REQUEST_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(ms);
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
