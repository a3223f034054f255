//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sampling parameters forwarded to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Softmax temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Penalty on tokens proportional to their frequency so far
    pub frequency_penalty: f32,

    /// Penalty on tokens that already appeared
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 2048,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
        }
    }
}

/// One completion call: a fixed system prompt, a per-review user message and
/// the JSON schema the answer is supposed to follow
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Instructions sent as the system message
    pub system_prompt: String,

    /// The labelled review text
    pub user_message: String,

    /// JSON schema for the expected envelope
    pub response_schema: Value,

    /// Sampling parameters
    pub sampling: SamplingParams,
}

/// Trait for language model completion backends
///
/// Implemented by the infrastructure layer (reviewgraph-llm). The pipeline
/// treats every implementation as unreliable: the returned text may be
/// malformed JSON, may ignore the schema, or the call may fail outright.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Error type for backend operations
    type Error: std::fmt::Display + Send;

    /// Produce a completion for `request`
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error>;

    /// Release backend resources once all work is done
    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Model name used in logs
    fn model_name(&self) -> &str;
}
