//! Reviewgraph LLM Backend Layer
//!
//! Pluggable completion backends behind the `CompletionBackend` trait from
//! `reviewgraph-domain`.
//!
//! # Backends
//!
//! - `MockBackend`: Deterministic, scriptable backend for testing
//! - `OllamaBackend`: Local Ollama chat API
//! - `OpenAiBackend`: Remote OpenAI-compatible chat completion service
//!
//! # Examples
//!
//! ```
//! use reviewgraph_llm::MockBackend;
//! use reviewgraph_domain::{CompletionBackend, CompletionRequest, SamplingParams};
//!
//! # async fn example() {
//! let backend = MockBackend::new(r#"{"triples": []}"#);
//! let request = CompletionRequest {
//!     system_prompt: String::new(),
//!     user_message: "Text: hi".to_string(),
//!     response_schema: serde_json::json!({}),
//!     sampling: SamplingParams::default(),
//! };
//! let result = backend.complete(&request).await.unwrap();
//! assert_eq!(result, r#"{"triples": []}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod openai;

#[cfg(test)]
mod test_server;

use thiserror::Error;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credentials missing or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}
