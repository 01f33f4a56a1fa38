//! Self-hosted text generation backend.
//!
//! Posts `{"prompt", "max_tokens", "temperature"}` to a configured URL and
//! unwraps the generated text from whichever response shape the server uses.

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::provider::{LlmBackend, LlmError};
use crate::config::LocalLlmConfig;

const PROVIDER_NAME: &str = "Local";

/// Top-level keys checked, in order, for the generated text.
const RESPONSE_KEYS: [&str; 4] = ["response", "generated_text", "text", "output"];

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

/// Backend for a text generation server reachable by URL.
pub struct LocalBackend {
    config: LocalLlmConfig,
    client: Client,
}

impl LocalBackend {
    /// Create a new backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(config: LocalLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    fn call_api(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> std::result::Result<String, LlmError> {
        let payload = GenerateRequest {
            prompt,
            max_tokens,
            temperature,
        };

        let mut request = self.client.post(&self.config.api_url);
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .json(&payload)
            .send()
            .map_err(map_transport_error)?;

        if response.status() != StatusCode::OK {
            return Err(LlmError::Http(response.status().as_u16()));
        }

        let body = response.text().map_err(map_transport_error)?;
        let data: Value = serde_json::from_str(&body).map_err(|_| LlmError::InvalidJson)?;

        extract_generated_text(&data)
    }
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else if e.is_connect() {
        LlmError::Connection
    } else {
        LlmError::Provider {
            provider: "LLM server".to_string(),
            message: e.to_string(),
        }
    }
}

/// Pull the generated text out of a server response.
///
/// Tries the keys `response`, `generated_text`, `text`, `output` on an
/// object; then a bare string body; then a list whose first element is an
/// object with `generated_text` or a string. The first match wins.
pub(crate) fn extract_generated_text(data: &Value) -> std::result::Result<String, LlmError> {
    if let Value::Object(map) = data
        && let Some(value) = RESPONSE_KEYS.iter().find_map(|key| map.get(*key))
    {
        return non_empty(value_text(value));
    }

    match data {
        Value::String(text) => non_empty(text.clone()),
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) if first.contains_key("generated_text") => {
                non_empty(value_text(&first["generated_text"]))
            }
            Some(Value::String(text)) => non_empty(text.clone()),
            _ => Err(LlmError::UnrecognizedResponse),
        },
        _ => Err(LlmError::UnrecognizedResponse),
    }
}

/// Strings as-is, null as empty, anything else as JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn non_empty(text: String) -> std::result::Result<String, LlmError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(trimmed.to_string())
    }
}

impl LlmBackend for LocalBackend {
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
}
