//! Shared LLM client infrastructure for the comparator and merger.
//!
//! Provides a unified error type, the async chat-completions call, the
//! rate-limit retry loop, and the process-wide client cache, so the two
//! call sites stay thin.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use thiserror::Error;

use dedupit_core::DedupeConfig;

/// Errors from an external LLM endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmClientError {
    /// The provider returned HTTP 429. The only retryable kind.
    #[error("rate limited")]
    RateLimited {
        /// Wait hint from the `Retry-After` header, if present
        retry_after: Option<Duration>,
    },

    /// Credentials rejected (HTTP 401/403)
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Transport failure or non-success status
    #[error("network error: {0}")]
    Network(String),

    /// The response envelope could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The request exceeded its deadline
    #[error("model request timed out")]
    Timeout,
}

impl LlmClientError {
    /// True for the kind the retry loop recovers from.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmClientError::RateLimited { .. })
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
///
/// Works with Ollama, vLLM, llama.cpp server, OpenAI, and other
/// compatible providers. Cheap to clone; safe to share across in-flight
/// calls (`reqwest::Client` pools connections internally).
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatClient {
    /// Create a client. `endpoint` is the base URL (e.g.
    /// `http://localhost:11434/v1`); `/chat/completions` is appended.
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, LlmClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmClientError::Network(format!("failed to build client: {}", e)))?;
        let base = endpoint.trim_end_matches('/');
        Ok(Self {
            http,
            url: format!("{}/chat/completions", base),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    /// The chat completions URL this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one chat completion and extract `choices[0].message.content`.
    pub async fn chat(
        &self,
        messages: serde_json::Value,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmClientError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmClientError::Timeout
            } else {
                LlmClientError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .map(Duration::from_secs_f64);
            return Err(LlmClientError::RateLimited { retry_after });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmClientError::Auth(format!("http {}", status.as_u16())));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LlmClientError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(LlmClientError::Network(format!(
                "http {}: {}",
                status.as_u16(),
                truncate_snippet(&response_text, 200)
            )));
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| LlmClientError::Parse(format!("invalid JSON response: {}", e)))?;

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                LlmClientError::Parse(format!(
                    "unexpected response format: {}",
                    truncate_snippet(&response_text, 200)
                ))
            })?;

        Ok(content.to_string())
    }
}

/// Rate-limit retry knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt
    pub max_retries: usize,
    /// Delay before the first retry; doubles each further retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy carved out of the service config.
    pub fn from_config(config: &DedupeConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.initial_delay,
        }
    }
}

/// Run `call` with rate-limit retry and exponential backoff.
///
/// Only [`LlmClientError::RateLimited`] is retried. The wait before retry
/// `n` (1-indexed) is the provider's `Retry-After` hint when present,
/// else `initial_delay * 2^(n-1)`. Any other error propagates on the
/// spot; exhausting the budget propagates the last rate-limit error.
pub async fn with_rate_limit_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, LlmClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmClientError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0usize;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err @ LlmClientError::RateLimited { .. }) => {
                if attempt == policy.max_retries {
                    tracing::error!(
                        target: "dedupit::llm",
                        op = operation,
                        max_retries = policy.max_retries,
                        "rate-limit retries exhausted"
                    );
                    return Err(err);
                }
                attempt += 1;
                let wait = match &err {
                    LlmClientError::RateLimited {
                        retry_after: Some(hint),
                    } => *hint,
                    _ => delay,
                };
                tracing::warn!(
                    target: "dedupit::llm",
                    op = operation,
                    attempt,
                    max_retries = policy.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    "rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
                delay *= 2;
            }
            Err(other) => return Err(other),
        }
    }
}

/// Truncate text to at most `max_len` bytes for an error message,
/// rounding down to the nearest char boundary so a cut never splits a
/// multi-byte UTF-8 sequence.
pub(crate) fn truncate_snippet(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Process-wide chat client cache, keyed by endpoint and model.
static CHAT_CLIENTS: Lazy<DashMap<String, Arc<ChatClient>>> = Lazy::new(DashMap::new);

/// The shared long-lived chat client for a configuration. Built once per
/// (endpoint, model) and reused by every request in the process.
pub fn shared_chat_client(config: &DedupeConfig) -> Result<Arc<ChatClient>, LlmClientError> {
    let key = format!("{}|{}", config.llm_endpoint, config.llm_model);
    if let Some(client) = CHAT_CLIENTS.get(&key) {
        return Ok(Arc::clone(&client));
    }
    let client = Arc::new(ChatClient::new(
        &config.llm_endpoint,
        &config.llm_model,
        config.llm_api_key.as_deref(),
        config.request_timeout,
    )?);
    CHAT_CLIENTS.insert(key, Arc::clone(&client));
    Ok(client)
}
