//! Configuration types for the metadata engine.
//!
//! The configuration is a plain serde structure that can be loaded from a JSON
//! file; every field has a default, so a partial file (or no file at all) is
//! valid. Builders are provided for programmatic setup.
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_metadata::config::{AppConfig, LlmProvider};
//!
//! let config = AppConfig::builder()
//!     .provider(LlmProvider::Local)
//!     .show_prompts(true)
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Placeholder written into fresh configuration files for the OpenAI key.
pub const OPENAI_KEY_PLACEHOLDER: &str = "your-openai-api-key-here";

/// Placeholder fragment of the local endpoint URL in fresh configuration files.
pub const LOCAL_URL_PLACEHOLDER: &str = "your-ngrok-url";

/// Environment variable consulted when the configured API key is missing.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LOCAL_URL: &str = "https://your-ngrok-url.ngrok-free.app/generate";
const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_HOURS: u64 = 1;

/// Which LLM backend the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Hosted OpenAI-compatible chat completions API (key based).
    #[default]
    OpenAi,
    /// Self-hosted text generation endpoint reachable by URL.
    Local,
}

impl LlmProvider {
    /// Lowercase identifier used in config files and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Local => "local",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the hosted OpenAI-compatible backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key. Empty or placeholder values fall back to `OPENAI_API_KEY`.
    pub api_key: String,
    /// The model to use (e.g., "gpt-3.5-turbo", "gpt-4o-mini").
    pub model: String,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Chat completions endpoint (useful for proxies or compatible services).
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: OPENAI_KEY_PLACEHOLDER.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OpenAiConfigBuilder {
        OpenAiConfigBuilder::default()
    }

    /// The usable API key: the configured one, else the environment variable.
    ///
    /// Returns `None` when neither source holds a real key.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !is_placeholder(&self.api_key, OPENAI_KEY_PLACEHOLDER) {
            return Some(self.api_key.clone());
        }
        std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Builder for [`OpenAiConfig`].
#[derive(Debug, Default)]
pub struct OpenAiConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OpenAiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom endpoint URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenAiConfig {
        let defaults = OpenAiConfig::default();
        OpenAiConfig {
            api_key: self.api_key.unwrap_or(defaults.api_key),
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            base_url: self.base_url.unwrap_or(defaults.base_url),
        }
    }
}

/// Settings for a self-hosted text generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalLlmConfig {
    /// Endpoint accepting `{"prompt", "max_tokens", "temperature"}` POST bodies.
    pub api_url: String,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra HTTP headers sent with every request.
    pub headers: HashMap<String, String>,
}

impl Default for LocalLlmConfig {
    fn default() -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("ngrok-skip-browser-warning".to_string(), "true".to_string());

        Self {
            api_url: DEFAULT_LOCAL_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers,
        }
    }
}

impl LocalLlmConfig {
    /// Create a new configuration builder.
    pub fn builder() -> LocalLlmConfigBuilder {
        LocalLlmConfigBuilder::default()
    }
}

/// Builder for [`LocalLlmConfig`].
#[derive(Debug, Default)]
pub struct LocalLlmConfigBuilder {
    api_url: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    headers: Option<HashMap<String, String>>,
}

impl LocalLlmConfigBuilder {
    /// Set the endpoint URL.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LocalLlmConfig {
        let defaults = LocalLlmConfig::default();
        LocalLlmConfig {
            api_url: self.api_url.unwrap_or(defaults.api_url),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            headers: self.headers.unwrap_or(defaults.headers),
        }
    }
}

/// LLM section: provider selection plus per-provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend selected at construction time.
    pub provider: LlmProvider,
    /// Hosted API settings.
    pub openai: OpenAiConfig,
    /// Self-hosted endpoint settings.
    pub local: LocalLlmConfig,
}

impl LlmConfig {
    /// `max_tokens` of the selected provider.
    pub fn max_tokens(&self) -> u32 {
        match self.provider {
            LlmProvider::OpenAi => self.openai.max_tokens,
            LlmProvider::Local => self.local.max_tokens,
        }
    }

    /// `temperature` of the selected provider.
    pub fn temperature(&self) -> f32 {
        match self.provider {
            LlmProvider::OpenAi => self.openai.temperature,
            LlmProvider::Local => self.local.temperature,
        }
    }

    /// Human-readable summary, e.g. `OpenAI (gpt-3.5-turbo)`.
    pub fn describe(&self) -> String {
        match self.provider {
            LlmProvider::OpenAi => format!("OpenAI ({})", self.openai.model),
            LlmProvider::Local => format!("Local LLM ({})", self.local.api_url),
        }
    }
}

/// Session lifetime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions older than this are dropped by the store.
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit every rendered prompt at debug level.
    pub show_prompts: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_prompts: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("llm.openai.temperature", self.llm.openai.temperature),
            ("llm.local.temperature", self.llm.local.temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigValidationError::InvalidTemperature {
                    field: field.to_string(),
                    value,
                });
            }
        }

        for (field, value) in [
            ("llm.openai.max_tokens", self.llm.openai.max_tokens),
            ("llm.local.max_tokens", self.llm.local.max_tokens),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroValue(field.to_string()));
            }
        }

        for (field, value) in [
            ("llm.openai.timeout_secs", self.llm.openai.timeout_secs),
            ("llm.local.timeout_secs", self.llm.local.timeout_secs),
            ("session.ttl_hours", self.session.ttl_hours),
        ] {
            if value == 0 {
                return Err(ConfigValidationError::ZeroValue(field.to_string()));
            }
        }

        if self.llm.provider == LlmProvider::Local
            && is_placeholder(&self.llm.local.api_url, LOCAL_URL_PLACEHOLDER)
        {
            return Err(ConfigValidationError::MissingEndpoint);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid temperature for '{field}': {value} (must be between 0.0 and 2.0)")]
    InvalidTemperature { field: String, value: f32 },

    #[error("'{0}' must be greater than zero")]
    ZeroValue(String),

    #[error("Local LLM API URL not configured")]
    MissingEndpoint,
}

/// Builder for [`AppConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    provider: Option<LlmProvider>,
    openai: Option<OpenAiConfig>,
    local: Option<LocalLlmConfig>,
    session_ttl_hours: Option<u64>,
    log_level: Option<String>,
    show_prompts: Option<bool>,
}

impl AppConfigBuilder {
    /// Select the LLM backend.
    pub fn provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the hosted API settings.
    pub fn openai(mut self, openai: OpenAiConfig) -> Self {
        self.openai = Some(openai);
        self
    }

    /// Replace the self-hosted endpoint settings.
    pub fn local(mut self, local: LocalLlmConfig) -> Self {
        self.local = Some(local);
        self
    }

    /// Set the session time-to-live in hours.
    pub fn session_ttl_hours(mut self, hours: u64) -> Self {
        self.session_ttl_hours = Some(hours);
        self
    }

    /// Set the default log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Enable or disable prompt logging.
    pub fn show_prompts(mut self, show: bool) -> Self {
        self.show_prompts = Some(show);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AppConfig` or an error if validation fails.
    pub fn build(self) -> Result<AppConfig, ConfigValidationError> {
        let config = AppConfig {
            llm: LlmConfig {
                provider: self.provider.unwrap_or_default(),
                openai: self.openai.unwrap_or_default(),
                local: self.local.unwrap_or_default(),
            },
            session: SessionConfig {
                ttl_hours: self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            },
            logging: LoggingConfig {
                level: self.log_level.unwrap_or_else(|| "info".to_string()),
                show_prompts: self.show_prompts.unwrap_or(false),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

/// Check if a config value is empty or still holds a placeholder.
fn is_placeholder(value: &str, placeholder_fragment: &str) -> bool {
    value.trim().is_empty() || value.contains(placeholder_fragment)
}
