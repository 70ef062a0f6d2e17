//! Chat-model implementation of the record merger.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use dedupit_core::{DedupeConfig, FieldMap, MergeError, RecordMerger};

use crate::llm_client::{
    shared_chat_client, truncate_snippet, with_rate_limit_retry, ChatClient, LlmClientError,
    RetryPolicy,
};

use super::prompt::build_merge_messages;

/// Merged records are full JSON documents; give the model room.
const MERGE_MAX_TOKENS: u32 = 1024;
/// Slightly above zero: field phrasing may need combining, verdicts don't.
const MERGE_TEMPERATURE: f32 = 0.1;

/// Record merger backed by a chat completions endpoint.
pub struct LlmMerger {
    client: Arc<ChatClient>,
    retry: RetryPolicy,
}

impl LlmMerger {
    /// Wrap an existing client with a retry policy.
    pub fn new(client: Arc<ChatClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Build from the service config, reusing the process-wide client.
    pub fn from_config(config: &DedupeConfig) -> Result<Self, MergeError> {
        let client = shared_chat_client(config).map_err(to_merge_error)?;
        Ok(Self::new(client, RetryPolicy::from_config(config)))
    }
}

#[async_trait]
impl RecordMerger for LlmMerger {
    async fn merge(&self, records: &[FieldMap]) -> Result<FieldMap, MergeError> {
        if records.is_empty() {
            return Err(MergeError::Request("no records provided".into()));
        }
        if records.len() == 1 {
            return Ok(records[0].clone());
        }

        let started = Instant::now();
        let messages = build_merge_messages(records);

        let reply = with_rate_limit_retry(self.retry, "merge", || {
            self.client
                .chat(messages.clone(), MERGE_TEMPERATURE, MERGE_MAX_TOKENS)
        })
        .await
        .map_err(to_merge_error)?;

        let merged = parse_merged_record(&reply)?;
        tracing::info!(
            target: "dedupit::merger",
            records = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "group merge complete"
        );
        Ok(merged)
    }
}

/// Parse the model reply as a JSON object.
pub fn parse_merged_record(reply: &str) -> Result<FieldMap, MergeError> {
    let value: serde_json::Value = serde_json::from_str(reply.trim())
        .map_err(|e| MergeError::InvalidJson(format!("{}: {}", e, truncate_snippet(reply, 120))))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(MergeError::InvalidJson(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn to_merge_error(err: LlmClientError) -> MergeError {
    MergeError::Request(err.to_string())
}
