//! Data types shared by the profiler, the analysis layer and the session
//! workflow: semantic types, confidence maps, column statistics and the
//! confirmed metadata document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MetadataError;

// ============================================================================
// Semantic Types
// ============================================================================

/// Semantic classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Binary,
    Categorical,
    Ordinal,
    Continuous,
    Identifier,
    FreeText,
}

impl SemanticType {
    /// All labels in canonical order. Ties in a confidence map resolve to the
    /// earliest label in this list.
    pub const ALL: [SemanticType; 6] = [
        SemanticType::Binary,
        SemanticType::Categorical,
        SemanticType::Ordinal,
        SemanticType::Continuous,
        SemanticType::Identifier,
        SemanticType::FreeText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Categorical => "categorical",
            Self::Ordinal => "ordinal",
            Self::Continuous => "continuous",
            Self::Identifier => "identifier",
            Self::FreeText => "free_text",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SemanticType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| MetadataError::InvalidSemanticType(s.to_string()))
    }
}

// ============================================================================
// Confidence Map
// ============================================================================

/// Confidence score per semantic type. All six labels are always present.
///
/// Scores are reported by the model and are kept as-is: they do not have to
/// sum to one and are not clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceMap {
    pub binary: f64,
    pub categorical: f64,
    pub ordinal: f64,
    pub continuous: f64,
    pub identifier: f64,
    pub free_text: f64,
}

impl ConfidenceMap {
    /// Rule-based fallback: the detected type at 0.9, everything else at 0.0.
    pub fn fallback(detected: SemanticType) -> Self {
        let mut map = Self::default();
        map.set(detected, 0.9);
        map
    }

    pub fn get(&self, label: SemanticType) -> f64 {
        match label {
            SemanticType::Binary => self.binary,
            SemanticType::Categorical => self.categorical,
            SemanticType::Ordinal => self.ordinal,
            SemanticType::Continuous => self.continuous,
            SemanticType::Identifier => self.identifier,
            SemanticType::FreeText => self.free_text,
        }
    }

    pub fn set(&mut self, label: SemanticType, value: f64) {
        let slot = match label {
            SemanticType::Binary => &mut self.binary,
            SemanticType::Categorical => &mut self.categorical,
            SemanticType::Ordinal => &mut self.ordinal,
            SemanticType::Continuous => &mut self.continuous,
            SemanticType::Identifier => &mut self.identifier,
            SemanticType::FreeText => &mut self.free_text,
        };
        *slot = value;
    }

    /// Labels with their scores, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SemanticType, f64)> + '_ {
        SemanticType::ALL.into_iter().map(|t| (t, self.get(t)))
    }

    /// Label with the highest score; the first label in canonical order wins ties.
    pub fn top(&self) -> SemanticType {
        let mut best = SemanticType::Binary;
        let mut best_score = self.binary;
        for (label, score) in self.iter().skip(1) {
            if score > best_score {
                best = label;
                best_score = score;
            }
        }
        best
    }
}

// ============================================================================
// Column Statistics
// ============================================================================

/// Descriptive statistics for one column.
///
/// Serialized with the field names the prompts use (`type`, `unique_values`,
/// `missing_values`, ...), so the JSON form can be embedded directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    /// Storage dtype tag of the raw column (e.g. `i64`, `str`).
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(rename = "unique_values")]
    pub unique_count: usize,
    /// At most ten stringified distinct values.
    pub sample_unique_values: Vec<String>,
    #[serde(rename = "missing_values")]
    pub missing_count: usize,
    #[serde(flatten)]
    pub summary: StatsSummary,
}

impl ColumnStatistics {
    pub fn is_numeric(&self) -> bool {
        matches!(self.summary, StatsSummary::Numeric(_))
    }

    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.summary {
            StatsSummary::Numeric(summary) => Some(summary),
            StatsSummary::Categorical(_) => None,
        }
    }

    pub fn categorical(&self) -> Option<&CategoricalSummary> {
        match &self.summary {
            StatsSummary::Categorical(summary) => Some(summary),
            StatsSummary::Numeric(_) => None,
        }
    }
}

/// Branch-specific part of [`ColumnStatistics`]; exactly one is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategoricalSummary {
    /// Most frequent value, stringified.
    #[serde(rename = "top_value")]
    pub mode_value: Option<String>,
    #[serde(rename = "top_freq")]
    pub mode_frequency: Option<usize>,
}

// ============================================================================
// Analysis Results
// ============================================================================

/// Output of the type classification step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub confidence: ConfidenceMap,
    pub suggested_type: SemanticType,
}

/// Full analysis of a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnAnalysisResult {
    pub column_name: String,
    pub stats: ColumnStatistics,
    pub detected_type: SemanticType,
    pub description: String,
    pub suggested_type: SemanticType,
    pub confidence: ConfidenceMap,
}

/// A column already described earlier in the session, used as prompt context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    pub description: String,
}

// ============================================================================
// Final Metadata
// ============================================================================

/// User-confirmed metadata for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmedColumn {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    pub missing_values: usize,
    pub unique_values: usize,
    /// Present only for continuous columns with a defined mean.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

/// Dataset-level metadata document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub dataset_name: String,
    pub dataset_description: String,
    pub columns: Vec<ConfirmedColumn>,
}
