//! API-backed embedder using an OpenAI-compatible `/embeddings` endpoint.
//!
//! Works with text-embeddings-inference, Ollama, vLLM, and other
//! compatible servers. The call is deliberately blocking: embedding is a
//! discrete step the pipeline runs to completion before any oracle
//! fan-out, so nothing is gained by suspending around it.

use dedupit_core::{DedupeConfig, EmbedError, Embedder};

/// Embedder that posts projection batches to an embeddings endpoint.
pub struct ApiEmbedder {
    agent: ureq::Agent,
    url: String,
    model: String,
    dimension: usize,
    text_prefix: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for ApiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEmbedder")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl ApiEmbedder {
    /// Build an embedder from the service config.
    ///
    /// `endpoint` is the base URL; the `/embeddings` path is appended.
    /// An empty model name is rejected here so a misconfigured process
    /// fails on initialization rather than mid-request.
    pub fn new(config: &DedupeConfig) -> Result<Self, EmbedError> {
        if config.embedding_model_name.is_empty() {
            return Err(EmbedError::Init("embedding model name is empty".into()));
        }
        if config.embedding_dimension == 0 {
            return Err(EmbedError::Init("embedding dimension must be non-zero".into()));
        }

        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.request_timeout))
            .build();
        let base = config.embedding_endpoint.trim_end_matches('/');
        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            url: format!("{}/embeddings", base),
            model: config.embedding_model_name.clone(),
            dimension: config.embedding_dimension,
            text_prefix: config.embedding_text_prefix.clone(),
            api_key: config.llm_api_key.clone(),
        })
    }

    /// The embeddings URL this embedder posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn call_endpoint(&self, inputs: &[String]) -> Result<String, EmbedError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": inputs,
        });
        let body_bytes = serde_json::to_vec(&body)
            .map_err(|e| EmbedError::Request(format!("failed to serialize request: {}", e)))?;

        let mut request = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", &format!("Bearer {}", key));
        }

        let mut response = request
            .send(&body_bytes[..])
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| EmbedError::Request(format!("failed to read response: {}", e)))
    }
}

impl Embedder for ApiEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let started = std::time::Instant::now();

        let inputs: Vec<String> = texts
            .iter()
            .map(|text| format!("{}{}", self.text_prefix, text))
            .collect();

        let response_text = self.call_endpoint(&inputs)?;
        let vectors = parse_embeddings_response(&response_text, texts.len(), self.dimension)?;

        tracing::info!(
            target: "dedupit::embed",
            texts = texts.len(),
            dimension = self.dimension,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "embed_batch complete"
        );
        Ok(vectors.into_iter().map(unit_normalize).collect())
    }
}

/// Parse an OpenAI-style embeddings response:
/// `{"data": [{"index": 0, "embedding": [...]}, ...]}`.
///
/// Items are re-ordered by their `index` so the output lines up with the
/// input batch even if the server reorders them.
pub(crate) fn parse_embeddings_response(
    response_text: &str,
    expected_count: usize,
    expected_dimension: usize,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let json: serde_json::Value = serde_json::from_str(response_text)
        .map_err(|e| EmbedError::Response(format!("invalid JSON: {}", e)))?;

    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| EmbedError::Response("missing 'data' array".into()))?;

    if data.len() != expected_count {
        return Err(EmbedError::Response(format!(
            "expected {} embeddings, got {}",
            expected_count,
            data.len()
        )));
    }

    let mut vectors: Vec<Option<Vec<f32>>> = vec![None; expected_count];
    for item in data {
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .ok_or_else(|| EmbedError::Response("embedding item missing 'index'".into()))?
            as usize;
        if index >= expected_count {
            return Err(EmbedError::Response(format!(
                "embedding index {} out of range",
                index
            )));
        }

        let raw = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| EmbedError::Response("embedding item missing 'embedding'".into()))?;
        if raw.len() != expected_dimension {
            return Err(EmbedError::Dimension {
                expected: expected_dimension,
                actual: raw.len(),
            });
        }

        let vector: Vec<f32> = raw
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32))
            .collect::<Option<_>>()
            .ok_or_else(|| EmbedError::Response("non-numeric embedding value".into()))?;

        if vectors[index].replace(vector).is_some() {
            return Err(EmbedError::Response(format!(
                "duplicate embedding index {}",
                index
            )));
        }
    }

    vectors
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| EmbedError::Response(format!("missing embedding index {}", i))))
        .collect()
}

/// Scale a vector to unit length. Zero vectors pass through unchanged.
fn unit_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let config = DedupeConfig::default();
        let embedder = ApiEmbedder::new(&config).unwrap();
        assert_eq!(embedder.url(), "http://localhost:8081/embeddings");
        assert_eq!(embedder.dimension(), 768);
    }

    #[test]
    fn test_empty_model_name_rejected() {
        let mut config = DedupeConfig::default();
        config.embedding_model_name = String::new();
        assert!(matches!(
            ApiEmbedder::new(&config),
            Err(EmbedError::Init(_))
        ));
    }

    #[test]
    fn test_parse_basic_response() {
        let text = r#"{"data": [
            {"index": 0, "embedding": [1.0, 0.0]},
            {"index": 1, "embedding": [0.0, 1.0]}
        ]}"#;
        let vectors = parse_embeddings_response(text, 2, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_reorders_by_index() {
        let text = r#"{"data": [
            {"index": 1, "embedding": [0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0]}
        ]}"#;
        let vectors = parse_embeddings_response(text, 2, 2).unwrap();
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[test]
    fn test_parse_rejects_wrong_dimension() {
        let text = r#"{"data": [{"index": 0, "embedding": [1.0, 0.0, 0.0]}]}"#;
        let err = parse_embeddings_response(text, 1, 2).unwrap_err();
        assert_eq!(
            err,
            EmbedError::Dimension {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_parse_rejects_count_mismatch() {
        let text = r#"{"data": [{"index": 0, "embedding": [1.0, 0.0]}]}"#;
        assert!(matches!(
            parse_embeddings_response(text, 2, 2),
            Err(EmbedError::Response(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_embeddings_response("not json", 1, 2),
            Err(EmbedError::Response(_))
        ));
    }

    #[test]
    fn test_unit_normalize() {
        let v = unit_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        // Zero vectors stay zero instead of dividing by zero
        assert_eq!(unit_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}
