//! Dataset Metadata Library
//!
//! LLM-assisted generation of column metadata for tabular datasets, built on
//! Polars.
//!
//! # Overview
//!
//! For every column of a CSV dataset the library produces:
//!
//! - **Statistics**: missing and distinct counts, sampled distinct values, and
//!   either mean/std/min/max (numeric columns) or the most frequent value
//! - **Rule-Based Type**: a deterministic semantic type (binary, categorical,
//!   ordinal, continuous, identifier, free_text)
//! - **Description**: one natural-language sentence written by an LLM
//! - **Suggested Type**: a six-way confidence map returned by the LLM
//!
//! The LLM is optional. When it is unavailable or answers with something
//! unusable, analysis falls back to the rule-based type at confidence 0.9 and
//! a generic description. LLM failures are never returned as errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dataset_metadata::{AppConfig, Dataset, MetadataWorkflow};
//!
//! let workflow = MetadataWorkflow::from_config(&AppConfig::default())?;
//! let session = workflow.create_session(Dataset::from_csv("customers.csv")?, "", "");
//! workflow.set_dataset_info(&session, "Customers", "Active customer accounts")?;
//!
//! for column in ["customer_id", "plan", "monthly_spend"] {
//!     let analysis = workflow.analyze_column(&session, column)?;
//!     println!("{}: {} ({})", column, analysis.description, analysis.suggested_type);
//! }
//!
//! workflow.auto_confirm_all(&session)?;
//! println!("{}", serde_json::to_string_pretty(&workflow.metadata(&session)?)?);
//! ```
//!
//! # LLM Backends
//!
//! Backends implement the [`ai::LlmBackend`] trait. Currently implemented:
//!
//! - [`ai::OpenAiBackend`] - OpenAI chat completions API
//! - [`ai::LocalBackend`] - self-hosted text generation endpoint
//!
//! The [`LlmGateway`] wraps exactly one backend and reports failures as
//! bracket strings such as `"[HTTP Error 500]"`.
//!
//! # Analyzing a Single Column
//!
//! ```rust,ignore
//! use dataset_metadata::{Column, ColumnAnalyzer, DatasetContext, LlmGateway};
//!
//! let analyzer = ColumnAnalyzer::new(LlmGateway::disabled("OpenAI"));
//! let column = Column::text("gender", [Some("M"), Some("F"), Some("M")]);
//!
//! let result = analyzer.analyze_column(&column, &DatasetContext::default());
//! assert_eq!(result.suggested_type.as_str(), "binary");
//! ```

pub mod ai;
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod profiler;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use ai::{LlmBackend, LlmError, LlmGateway, is_failure_marker};
pub use analysis::{ColumnAnalyzer, DatasetContext, PromptBuilder, ResponseValidator};
pub use config::{
    AppConfig, AppConfigBuilder, ConfigValidationError, LlmConfig, LlmProvider, LocalLlmConfig,
    OpenAiConfig, SessionConfig,
};
pub use dataset::{Column, Dataset, StorageKind};
pub use error::{MetadataError, Result as MetadataResult, ResultExt};
pub use profiler::{RuleBasedTypeDetector, StatsProfiler};
pub use session::{InMemorySessionStore, MetadataWorkflow, Session, SessionStore};
pub use types::{
    ClassificationResult, ColumnAnalysisResult, ColumnStatistics, ConfidenceMap, ConfirmedColumn,
    DatasetMetadata, NumericSummary, PreviousColumn, SemanticType,
};
