//! LLM backend trait for abstracting text-completion services.
//!
//! This module defines the [`LlmBackend`] trait that enables support for
//! multiple generation services (a hosted chat API, a self-hosted HTTP
//! endpoint, a scripted test double) without changing the analysis logic.
//!
//! # Implementing a New Backend
//!
//! To add a new backend:
//!
//! 1. Create a new file in `src/ai/` (e.g., `ollama.rs`)
//! 2. Implement the [`LlmBackend`] trait for your backend struct
//! 3. Export the backend in `src/ai/mod.rs`
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_metadata::ai::{LlmBackend, LlmGateway, OpenAiBackend};
//! use std::sync::Arc;
//!
//! let backend = OpenAiBackend::new("your-api-key")?;
//! let gateway = LlmGateway::new(Arc::new(backend));
//! ```

use thiserror::Error;

/// Transport and decoding failures of a single completion request.
///
/// The display text of each variant is the reason placed inside the
/// bracket-failure string returned by the gateway.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM server timeout")]
    Timeout,

    #[error("LLM server connection failed")]
    Connection,

    #[error("HTTP Error {0}")]
    Http(u16),

    #[error("JSON parsing failed")]
    InvalidJson,

    #[error("Could not extract response")]
    UnrecognizedResponse,

    #[error("Empty response")]
    EmptyResponse,

    /// No backend is configured (e.g. missing API key).
    #[error("Error: {0} not available")]
    Unavailable(String),

    /// Any other provider-specific failure.
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },
}

impl LlmError {
    /// Render as a bracket-failure string, e.g. `[LLM server timeout]`.
    pub fn to_marker(&self) -> String {
        format!("[{}]", self)
    }
}

/// Trait for text-completion backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations report failures as [`LlmError`]. They never retry; the
/// gateway turns every error into a bracket-failure string.
pub trait LlmBackend: Send + Sync {
    /// Issue one completion request and return the generated text.
    fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, LlmError>;

    /// Get the backend name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this backend.
    ///
    /// Returns `None` if the backend doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
