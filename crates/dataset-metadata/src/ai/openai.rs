//! OpenAI chat completions backend.
//!
//! This module provides the [`OpenAiBackend`] which implements the
//! [`LlmBackend`] trait for the OpenAI chat completions API
//! (<https://platform.openai.com/docs/api-reference/chat>) and any service
//! exposing the same request/response shape.

use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{LlmBackend, LlmError};
use crate::config::OpenAiConfig;

const PROVIDER_NAME: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<RequestMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Hosted chat completions backend.
///
/// # Example
///
/// ```rust,ignore
/// use dataset_metadata::ai::OpenAiBackend;
/// use dataset_metadata::config::OpenAiConfig;
///
/// // Simple usage with defaults
/// let backend = OpenAiBackend::new("your-api-key")?;
///
/// // With custom configuration
/// let config = OpenAiConfig::builder()
///     .model("gpt-4o-mini")
///     .timeout_secs(60)
///     .build();
/// let backend = OpenAiBackend::with_config("your-api-key", config)?;
/// ```
pub struct OpenAiBackend {
    api_key: String,
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiBackend {
    /// Create a new backend with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, OpenAiConfig::default())
    }

    /// Create a new backend with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }

    fn call_api(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> std::result::Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![RequestMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(LlmError::Http(response.status().as_u16()));
        }

        let body = response.text().map_err(map_transport_error)?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|_| LlmError::InvalidJson)?;

        extract_content(parsed)
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else if e.is_connect() {
        LlmError::Connection
    } else {
        LlmError::Provider {
            provider: "OpenAI API".to_string(),
            message: e.to_string(),
        }
    }
}

/// Content of the first choice's message.
fn extract_content(response: ChatResponse) -> std::result::Result<String, LlmError> {
    let content = response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .ok_or(LlmError::UnrecognizedResponse)?
        .content
        .unwrap_or_default();

    let content = content.trim();
    if content.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(content.to_string())
    }
}

impl LlmBackend for OpenAiBackend {
    fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> std::result::Result<String, LlmError> {
        self.call_api(prompt, max_tokens, temperature)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================
