//! LLM access for description generation and type classification.
//!
//! This module provides a trait-based abstraction over text-completion
//! backends and the [`LlmGateway`] that the analysis layer talks to.
//!
//! # Feature Flag
//!
//! The concrete HTTP backends require the `ai` feature flag. The
//! [`LlmBackend`] trait and the gateway are always available, so custom
//! backends and the rule-based fallback work without it.
//!
//! ```toml
//! # Enable HTTP backends (default)
//! dataset-metadata = { version = "0.1", features = ["ai"] }
//!
//! # Rule-based analysis only
//! dataset-metadata = { version = "0.1", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - [`OpenAiBackend`] - OpenAI chat completions API (requires `ai` feature)
//! - [`LocalBackend`] - self-hosted generation endpoint (requires `ai` feature)
//!
//! The gateway owns exactly one backend, selected from configuration at
//! construction time, and reports every failure as a bracket string such as
//! `"[HTTP Error 500]"`.
//!
//! # Example
//!
//! ```rust,ignore
//! use dataset_metadata::ai::{LlmGateway, is_failure_marker};
//! use dataset_metadata::config::AppConfig;
//!
//! let config = AppConfig::from_json_file("config.json")?;
//! let gateway = LlmGateway::from_config(&config.llm, config.logging.show_prompts)?;
//!
//! let reply = gateway.complete_default("Describe the column 'age'.");
//! if is_failure_marker(&reply) {
//!     println!("LLM unavailable: {}", reply);
//! }
//! ```

// Backend trait and gateway are always available
mod gateway;
mod provider;

pub use gateway::{LlmGateway, is_failure_marker};
pub use provider::{LlmBackend, LlmError};

// Concrete backends require the "ai" feature
#[cfg(feature = "ai")]
mod local;
#[cfg(feature = "ai")]
mod openai;

#[cfg(feature = "ai")]
pub use local::LocalBackend;
#[cfg(feature = "ai")]
pub use openai::OpenAiBackend;
