//! Custom error types for the metadata engine.
//!
//! Only structural problems (unknown session, unknown column, bad input) are
//! surfaced as errors. LLM transport and parsing failures never reach this
//! type: they are absorbed by the gateway and the response validator.
//!
//! Errors are serializable so a web or desktop layer can forward them as
//! `{code, message}` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the metadata engine.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// No live session exists for the given id (unknown or expired).
    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// An operation needed a cached analysis result that does not exist yet.
    #[error("Column '{0}' has not been analyzed")]
    ColumnNotAnalyzed(String),

    /// The column's storage type cannot be represented as numbers or text.
    #[error("Column '{column}' has unsupported storage type {dtype}")]
    UnsupportedColumnType { column: String, dtype: String },

    /// A semantic type label outside the six known labels.
    #[error("Unknown semantic type '{0}'")]
    InvalidSemanticType(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MetadataError>,
    },
}

impl MetadataError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MetadataError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::ColumnNotAnalyzed(_) => "COLUMN_NOT_ANALYZED",
            Self::UnsupportedColumnType { .. } => "UNSUPPORTED_COLUMN_TYPE",
            Self::InvalidSemanticType(_) => "INVALID_SEMANTIC_TYPE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from caller input rather than the data or environment.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::SessionNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::ColumnNotAnalyzed(_)
            | Self::InvalidSemanticType(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

impl Serialize for MetadataError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("MetadataError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MetadataError::Polars(e).with_context(context))
    }
}
