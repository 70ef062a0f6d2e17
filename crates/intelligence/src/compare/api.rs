//! Chat-model implementation of the pairwise oracle.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use dedupit_core::{DedupeConfig, FieldMap, OracleError, PairwiseOracle};

use crate::llm_client::{
    shared_chat_client, with_rate_limit_retry, ChatClient, LlmClientError, RetryPolicy,
};

use super::prompt::build_compare_messages;

/// The verdict is a single token, so one output token is all we pay for.
const COMPARE_MAX_TOKENS: u32 = 1;
/// Deterministic sampling for reproducible verdicts.
const COMPARE_TEMPERATURE: f32 = 0.0;

/// Pairwise oracle backed by a chat completions endpoint.
pub struct LlmComparator {
    client: Arc<ChatClient>,
    retry: RetryPolicy,
}

impl LlmComparator {
    /// Wrap an existing client with a retry policy.
    pub fn new(client: Arc<ChatClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Build from the service config, reusing the process-wide client.
    pub fn from_config(config: &DedupeConfig) -> Result<Self, OracleError> {
        let client = shared_chat_client(config).map_err(to_oracle_error)?;
        Ok(Self::new(client, RetryPolicy::from_config(config)))
    }
}

#[async_trait]
impl PairwiseOracle for LlmComparator {
    async fn are_duplicates(&self, a: &FieldMap, b: &FieldMap) -> Result<bool, OracleError> {
        let started = Instant::now();
        let messages = build_compare_messages(a, b);

        let reply = with_rate_limit_retry(self.retry, "compare", || {
            self.client
                .chat(messages.clone(), COMPARE_TEMPERATURE, COMPARE_MAX_TOKENS)
        })
        .await
        .map_err(to_oracle_error)?;

        let verdict = parse_verdict(&reply);
        tracing::debug!(
            target: "dedupit::oracle",
            verdict,
            reply = reply.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pairwise comparison complete"
        );
        Ok(verdict)
    }
}

/// `true` iff the trimmed, upper-cased reply is exactly `YES`.
///
/// Everything else (`NO`, explanations, truncation, garbage) counts as
/// a negative verdict rather than an error.
pub fn parse_verdict(reply: &str) -> bool {
    reply.trim().to_uppercase() == "YES"
}

fn to_oracle_error(err: LlmClientError) -> OracleError {
    match err {
        LlmClientError::RateLimited { retry_after } => OracleError::RateLimited { retry_after },
        LlmClientError::Auth(msg) => OracleError::Auth(msg),
        LlmClientError::Network(msg) => OracleError::Network(msg),
        LlmClientError::Parse(msg) => OracleError::Parse(msg),
        LlmClientError::Timeout => OracleError::Timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict_accepts_yes_variants() {
        assert!(parse_verdict("YES"));
        assert!(parse_verdict("yes"));
        assert!(parse_verdict("  Yes \n"));
    }

    #[test]
    fn test_parse_verdict_rejects_everything_else() {
        assert!(!parse_verdict("NO"));
        assert!(!parse_verdict("no"));
        assert!(!parse_verdict(""));
        assert!(!parse_verdict("YES, they match"));
        assert!(!parse_verdict("Maybe"));
        assert!(!parse_verdict("Y"));
    }

    #[test]
    fn test_rate_limit_maps_to_retryable_oracle_error() {
        let err = to_oracle_error(LlmClientError::RateLimited { retry_after: None });
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_permanent_errors_map_through() {
        assert!(matches!(
            to_oracle_error(LlmClientError::Auth("denied".into())),
            OracleError::Auth(_)
        ));
        assert!(matches!(
            to_oracle_error(LlmClientError::Timeout),
            OracleError::Timeout
        ));
    }
}
