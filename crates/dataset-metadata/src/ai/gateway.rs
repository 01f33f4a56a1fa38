//! Single entry point for text completion.
//!
//! [`LlmGateway`] routes every request to the one backend chosen at
//! construction time and never fails: errors come back as a bracket-failure
//! string such as `"[LLM server timeout]"`. Callers detect failures with
//! [`is_failure_marker`].
//!
//! A genuine generation that happens to start with `[` and end with `]` is
//! indistinguishable from a failure marker and will be treated as one.

use std::sync::Arc;
use tracing::{debug, warn};

use super::provider::{LlmBackend, LlmError};
use crate::config::LlmConfig;

/// Default `max_tokens` when none is configured.
const DEFAULT_MAX_TOKENS: u32 = 300;

/// Default temperature when none is configured.
const DEFAULT_TEMPERATURE: f32 = 0.7;

const CONNECTION_TEST_MAX_TOKENS: u32 = 50;
const CONNECTION_TEST_TEMPERATURE: f32 = 0.1;

/// Check whether a gateway reply is a bracket-failure string.
///
/// A genuine generation wrapped in literal brackets is indistinguishable from
/// a failure and is treated as one.
#[inline]
pub fn is_failure_marker(text: &str) -> bool {
    text.starts_with('[') && text.ends_with(']')
}

/// Routes completion requests to a single configured backend.
#[derive(Clone)]
pub struct LlmGateway {
    backend: Option<Arc<dyn LlmBackend>>,
    /// Provider label used in logs and the connection test prompt.
    label: String,
    max_tokens: u32,
    temperature: f32,
    show_prompts: bool,
}

static_assertions::assert_impl_all!(LlmGateway: Send, Sync);

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGateway")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("label", &self.label)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("show_prompts", &self.show_prompts)
            .finish()
    }
}

impl LlmGateway {
    /// Create a gateway around a backend with default generation settings.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        let label = backend.name().to_string();
        Self {
            backend: Some(backend),
            label,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            show_prompts: false,
        }
    }

    /// Create a gateway with no backend; every request yields a failure marker,
    /// so analysis falls back to rule-based results.
    pub fn disabled(label: impl Into<String>) -> Self {
        Self {
            backend: None,
            label: label.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            show_prompts: false,
        }
    }

    /// Build the backend selected by the configuration.
    ///
    /// A missing OpenAI API key is not an error: the gateway is created
    /// without a backend and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    #[cfg(feature = "ai")]
    pub fn from_config(config: &LlmConfig, show_prompts: bool) -> anyhow::Result<Self> {
        use crate::config::LlmProvider;

        let gateway = match config.provider {
            LlmProvider::OpenAi => match config.openai.resolved_api_key() {
                Some(api_key) => Self::new(Arc::new(super::OpenAiBackend::with_config(
                    api_key,
                    config.openai.clone(),
                )?)),
                None => {
                    warn!(
                        "OpenAI API key not found. Set {} or update the config file",
                        crate::config::OPENAI_API_KEY_ENV
                    );
                    Self::disabled("OpenAI")
                }
            },
            LlmProvider::Local => Self::new(Arc::new(super::LocalBackend::with_config(
                config.local.clone(),
            )?)),
        };

        tracing::info!("LLM gateway configured: {}", config.describe());
        Ok(gateway
            .with_defaults(config.max_tokens(), config.temperature())
            .with_show_prompts(show_prompts))
    }

    /// Without the `ai` feature no HTTP backend exists; the gateway is disabled.
    #[cfg(not(feature = "ai"))]
    pub fn from_config(config: &LlmConfig, show_prompts: bool) -> anyhow::Result<Self> {
        warn!(
            "Built without the `ai` feature; {} is unavailable, using rule-based analysis",
            config.describe()
        );
        Ok(Self::disabled(config.provider.as_str())
            .with_defaults(config.max_tokens(), config.temperature())
            .with_show_prompts(show_prompts))
    }

    /// Set the `max_tokens` and temperature used by [`LlmGateway::complete_default`].
    pub fn with_defaults(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Log every prompt at debug level.
    pub fn with_show_prompts(mut self, show_prompts: bool) -> Self {
        self.show_prompts = show_prompts;
        self
    }

    /// Whether a backend is configured.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Backend name, or the provider label when disabled.
    pub fn backend_name(&self) -> &str {
        self.backend
            .as_ref()
            .map(|b| b.name())
            .unwrap_or(self.label.as_str())
    }

    pub fn model(&self) -> Option<&str> {
        self.backend.as_ref().and_then(|b| b.model())
    }

    /// Issue one completion request.
    ///
    /// Returns the trimmed generation, or a bracket-failure string on any
    /// error (including an empty generation). Never retries.
    pub fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> String {
        if self.show_prompts {
            debug!("Prompt for {}:\n{}", self.backend_name(), prompt);
        }

        let Some(backend) = &self.backend else {
            let marker = LlmError::Unavailable(self.label.clone()).to_marker();
            debug!("No LLM backend configured: {}", marker);
            return marker;
        };

        debug!("Making {} API call", backend.name());
        match backend.complete(prompt, max_tokens, temperature) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!("{} returned an empty response", backend.name());
                    LlmError::EmptyResponse.to_marker()
                } else {
                    debug!("{} response: {}", backend.name(), text);
                    text.to_string()
                }
            }
            Err(e) => {
                warn!("{} call failed: {}", backend.name(), e);
                e.to_marker()
            }
        }
    }

    /// [`LlmGateway::complete`] with the configured defaults.
    pub fn complete_default(&self, prompt: &str) -> String {
        self.complete(prompt, self.max_tokens, self.temperature)
    }

    /// Send a short test prompt and report whether the backend answered.
    pub fn test_connection(&self) -> bool {
        let prompt = format!(
            "Hello, please respond with '{} is working correctly'.",
            self.label.to_uppercase()
        );
        let reply = self.complete(
            &prompt,
            CONNECTION_TEST_MAX_TOKENS,
            CONNECTION_TEST_TEMPERATURE,
        );
        !is_failure_marker(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedBackend;

    #[test]
    fn test_is_failure_marker() {
        assert!(is_failure_marker("[LLM server timeout]"));
        assert!(is_failure_marker("[]"));
        assert!(!is_failure_marker("A plain answer."));
        assert!(!is_failure_marker("[partial"));
        assert!(!is_failure_marker(""));
    }

    #[test]
    fn test_complete_trims_success() {
        let backend = Arc::new(ScriptedBackend::new([Ok("  The answer.\n".to_string())]));
        let gateway = LlmGateway::new(backend.clone());

        assert_eq!(gateway.complete("prompt", 10, 0.2), "The answer.");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_tokens, 10);
        assert_eq!(calls[0].temperature, 0.2);
    }

    #[test]
    fn test_complete_empty_becomes_marker() {
        let backend = Arc::new(ScriptedBackend::new([Ok("   ".to_string())]));
        let gateway = LlmGateway::new(backend);
        assert_eq!(gateway.complete("prompt", 10, 0.2), "[Empty response]");
    }

    #[test]
    fn test_complete_error_becomes_marker() {
        let backend = Arc::new(ScriptedBackend::new([Err(LlmError::Http(503))]));
        let gateway = LlmGateway::new(backend);
        assert_eq!(gateway.complete("prompt", 10, 0.2), "[HTTP Error 503]");
    }

    #[test]
    fn test_complete_does_not_retry() {
        let backend = Arc::new(ScriptedBackend::new([
            Err(LlmError::Timeout),
            Ok("second".to_string()),
        ]));
        let gateway = LlmGateway::new(backend.clone());

        assert_eq!(gateway.complete("p", 10, 0.2), "[LLM server timeout]");
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn test_disabled_gateway() {
        let gateway = LlmGateway::disabled("OpenAI");
        assert!(!gateway.is_available());
        assert_eq!(gateway.backend_name(), "OpenAI");
        assert_eq!(
            gateway.complete_default("p"),
            "[Error: OpenAI not available]"
        );
        assert!(!gateway.test_connection());
    }

    #[test]
    fn test_complete_default_uses_configured_values() {
        let backend = Arc::new(ScriptedBackend::new([Ok("ok".to_string())]));
        let gateway = LlmGateway::new(backend.clone()).with_defaults(123, 0.3);

        gateway.complete_default("p");
        let calls = backend.calls();
        assert_eq!(calls[0].max_tokens, 123);
        assert_eq!(calls[0].temperature, 0.3);
    }

    #[test]
    fn test_connection_sends_fixed_prompt() {
        let backend = Arc::new(ScriptedBackend::new([Ok(
            "SCRIPTED is working correctly".to_string(),
        )]));
        let gateway = LlmGateway::new(backend.clone());

        assert!(gateway.test_connection());
        let calls = backend.calls();
        assert_eq!(
            calls[0].prompt,
            "Hello, please respond with 'SCRIPTED is working correctly'."
        );
        assert_eq!(calls[0].max_tokens, 50);
        assert_eq!(calls[0].temperature, 0.1);
    }

    #[test]
    fn test_connection_reports_failure() {
        let backend = Arc::new(ScriptedBackend::new([Err(LlmError::Connection)]));
        assert!(!LlmGateway::new(backend).test_connection());
    }

    #[cfg(feature = "ai")]
    #[test]
    fn test_from_config_local() {
        use crate::config::{LlmProvider, LocalLlmConfig};

        let config = LlmConfig {
            provider: LlmProvider::Local,
            local: LocalLlmConfig::builder()
                .api_url("http://127.0.0.1:9/generate")
                .max_tokens(64)
                .build(),
            ..Default::default()
        };
        let gateway = LlmGateway::from_config(&config, false).unwrap();
        assert!(gateway.is_available());
        assert_eq!(gateway.backend_name(), "Local");
        assert_eq!(gateway.max_tokens, 64);
    }
}
