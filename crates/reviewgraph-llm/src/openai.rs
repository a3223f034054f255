//! Remote chat-completion backend
//!
//! Talks to any OpenAI-compatible `/v1/chat/completions` endpoint and asks for
//! `json_schema` structured output. The API key is read once at construction.
//! Each completion is a single request; failed calls are retried by the caller.

use crate::ollama::build_client;
use crate::LlmError;
use async_trait::async_trait;
use reviewgraph_domain::{CompletionBackend, CompletionRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Environment variable holding the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default timeout for remote requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Remote OpenAI-compatible completion backend
pub struct OpenAiBackend {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    frequency_penalty: f32,
    presence_penalty: f32,
    response_format: Value,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiBackend {
    /// Create a backend with an explicit API key
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Create a backend whose API key comes from the environment variable `key_env`
    pub fn from_env(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        key_env: &str,
    ) -> Result<Self, LlmError> {
        let api_key = std::env::var(key_env)
            .map_err(|_| LlmError::Authentication(format!("{} is not set", key_env)))?;
        Self::new(endpoint, model, api_key)
    }

    /// Replace the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
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
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
            frequency_penalty: request.sampling.frequency_penalty,
            presence_penalty: request.sampling.presence_penalty,
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "triples",
                    "schema": request.response_schema,
                },
            }),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let body = self.request_body(request);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(LlmError::Authentication(format!("HTTP {}", status)));
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(LlmError::ModelNotAvailable(self.model.clone()));
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(LlmError::RateLimitExceeded);
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                debug!("Chat completion returned HTTP {}", status);
                return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
            }
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no content".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
