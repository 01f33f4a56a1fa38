//! LLM-assisted column analysis.
//!
//! - [`PromptBuilder`]: description and classification prompt templates
//! - [`ResponseValidator`]: converts raw replies into results, with fallbacks
//! - [`ColumnAnalyzer`]: runs profiling, detection and the two model calls

mod analyzer;
mod prompt;
mod validator;

pub use analyzer::ColumnAnalyzer;
pub use prompt::{DEFAULT_DATASET_DESCRIPTION, DEFAULT_DATASET_NAME, DatasetContext, PromptBuilder};
pub use validator::{ResponseValidator, fallback_description};
