//! Generative text backend.
//!
//! One trait, one HTTP adapter. The adapter speaks the OpenAI-compatible
//! chat completions protocol, so any endpoint that follows it works by
//! changing `OPENAI_BASE_URL`.

use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait GenerativeTextBackend: Send + Sync {
    /// Backend identifier, reported by the health check.
    fn name(&self) -> &str;

    /// Returns the raw completion text.
    ///
    /// Network, quota and response-shape problems all surface as
    /// [`AppError::GenerationError`].
    async fn complete(&self, request: &GenerationRequest) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Creates a new `OpenAiBackend`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.openai.com/v1`.
    /// * `api_key` - Bearer token.
    /// * `model` - Model name sent with every request.
    /// * `timeout` - Optional whole-request timeout.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            AppError::GenerationError(format!("Failed to create generation client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// Builds the adapter when an API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(api_key) = config.openai_api_key.clone() else {
            return Ok(None);
        };

        Self::new(
            config.openai_base_url.clone(),
            api_key,
            config.openai_model.clone(),
            config.generation_timeout,
        )
        .map(Some)
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerativeTextBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, AppError> {
        let url = self.completions_url();
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!("Requesting completion from {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GenerationError(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::GenerationError(format!(
                "Completion endpoint returned {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::GenerationError(format!("Failed to parse completion response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                AppError::GenerationError("Completion response has no content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_key_is_none() {
        let config = Config::default();
        assert!(OpenAiBackend::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let backend = OpenAiBackend::new(
            "http://localhost:9999/v1/".to_string(),
            "key".to_string(),
            "gpt-4".to_string(),
            None,
        )
        .unwrap();
        assert_eq!(
            backend.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serializes_as_chat_messages() {
        let body = ChatCompletionRequest {
            model: "gpt-4",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            temperature: 0.7,
            max_tokens: 300,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
        assert_eq!(value["max_tokens"], 300);
    }
}
