//! Ollama Backend Implementation
//!
//! Local inference through Ollama's chat API. The response schema is passed
//! as Ollama's `format` field so the model is constrained to JSON output.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama API
//! - Configurable endpoint and model
//! - One HTTP request per completion; retries belong to the caller
//! - Model unload on shutdown
//!
//! # Examples
//!
//! ```no_run
//! use reviewgraph_llm::OllamaBackend;
//!
//! let backend = OllamaBackend::new("http://localhost:11434", "mistral").unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use reviewgraph_domain::{CompletionBackend, CompletionRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds, local models are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama API backend for local LLM inference
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a Value,
    stream: bool,
    options: ChatOptions,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Request body that asks Ollama to evict the model from memory
#[derive(Serialize)]
struct OllamaUnloadRequest<'a> {
    model: &'a str,
    keep_alive: u32,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "mistral", "llama3.2")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Create a new Ollama backend on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Replace the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    async fn chat(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);

        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            format: &request.response_schema,
            stream: false,
            options: ChatOptions {
                temperature: request.sampling.temperature,
                num_predict: request.sampling.max_tokens,
                frequency_penalty: request.sampling.frequency_penalty,
                presence_penalty: request.sampling.presence_penalty,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!("Ollama returned HTTP {}", status);
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        response
            .json::<OllamaChatResponse>()
            .await
            .map(|r| r.message.content)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        self.chat(request).await
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaUnloadRequest {
            model: &self.model,
            keep_alive: 0,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Unload request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("Ollama refused to unload {}: HTTP {}", self.model, response.status());
        }
        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::StatusServer;
    use reviewgraph_domain::SamplingParams;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "Extract triples".to_string(),
            user_message: "Text: Love the faux nails".to_string(),
            response_schema: serde_json::json!({"type": "object"}),
            sampling: SamplingParams::default(),
        }
    }

    #[test]
    fn test_ollama_backend_creation() {
        let backend = OllamaBackend::new("http://localhost:11434/", "mistral").unwrap();
        assert_eq!(backend.endpoint, "http://localhost:11434");
        assert_eq!(backend.model, "mistral");
        assert_eq!(backend.model_name(), "mistral");
    }

    #[test]
    fn test_ollama_backend_default_endpoint() {
        let backend = OllamaBackend::default_endpoint("mistral").unwrap();
        assert_eq!(backend.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_chat_request_shape() {
        let req = request();
        let body = OllamaChatRequest {
            model: "mistral",
            messages: vec![
                ChatMessage { role: "system", content: &req.system_prompt },
                ChatMessage { role: "user", content: &req.user_message },
            ],
            format: &req.response_schema,
            stream: false,
            options: ChatOptions {
                temperature: 0.3,
                num_predict: 2048,
                frequency_penalty: 0.1,
                presence_penalty: 0.1,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Text: Love the faux nails");
        assert_eq!(value["format"]["type"], "object");
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 2048);
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_complete_integration() {
        let backend = OllamaBackend::default_endpoint("mistral").unwrap();
        if let Ok(response) = backend.complete(&request()).await {
            assert!(!response.is_empty());
        }
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Port 9 (discard) is not an Ollama server
        let backend = OllamaBackend::new("http://127.0.0.1:9", "mistral").unwrap();

        let result = backend.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_one_request() {
        let server = StatusServer::start("500 Internal Server Error").await;
        let backend = OllamaBackend::new(server.endpoint(), "mistral").unwrap();

        let result = backend.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::Communication(msg)) if msg.contains("500")));
        assert_eq!(server.requests(), 1);
    }

    #[tokio::test]
    async fn test_missing_model() {
        let server = StatusServer::start("404 Not Found").await;
        let backend = OllamaBackend::new(server.endpoint(), "nope").unwrap();

        let result = backend.complete(&request()).await;
        assert!(matches!(result, Err(LlmError::ModelNotAvailable(m)) if m == "nope"));
        assert_eq!(server.requests(), 1);
    }
}
