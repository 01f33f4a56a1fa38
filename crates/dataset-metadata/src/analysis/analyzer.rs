//! Column analysis: statistics, rule-based type, description, classification.

use tracing::{debug, info};

use super::prompt::{DatasetContext, PromptBuilder};
use super::validator::ResponseValidator;
use crate::ai::LlmGateway;
use crate::dataset::Column;
use crate::profiler::{RuleBasedTypeDetector, StatsProfiler};
use crate::types::{ClassificationResult, ColumnAnalysisResult, ColumnStatistics, SemanticType};

/// Runs the description and classification calls for one column at a time.
///
/// Never fails on LLM problems: every failure degrades to the rule-based
/// type at confidence 0.9 and a generic description.
#[derive(Debug, Clone)]
pub struct ColumnAnalyzer {
    gateway: LlmGateway,
}

static_assertions::assert_impl_all!(ColumnAnalyzer: Send, Sync);

impl ColumnAnalyzer {
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &LlmGateway {
        &self.gateway
    }

    /// Full analysis of a column.
    ///
    /// Issues two sequential completion requests: the description first,
    /// then the classification, whose prompt embeds that description.
    pub fn analyze_column(&self, column: &Column, context: &DatasetContext) -> ColumnAnalysisResult {
        info!("Analyzing column '{}'", column.name);

        let stats = StatsProfiler::profile(column);
        let detected_type = RuleBasedTypeDetector::detect(column);
        debug!("Column '{}' rule-based type: {}", column.name, detected_type);

        let description = self.describe(&column.name, &stats, detected_type, context);
        let classification =
            self.classify(&column.name, &description, &stats, detected_type, context);

        info!(
            "Column '{}' analyzed: detected {}, suggested {}",
            column.name, detected_type, classification.suggested_type
        );

        ColumnAnalysisResult {
            column_name: column.name.clone(),
            stats,
            detected_type,
            description,
            suggested_type: classification.suggested_type,
            confidence: classification.confidence,
        }
    }

    /// Classify again against an edited description.
    ///
    /// Statistics and the detected type are taken as given; nothing is
    /// recomputed and no description is generated.
    pub fn reanalyze_type(
        &self,
        column_name: &str,
        description: &str,
        stats: &ColumnStatistics,
        detected_type: SemanticType,
        context: &DatasetContext,
    ) -> ClassificationResult {
        info!("Re-classifying column '{}' with an edited description", column_name);
        self.classify(column_name, description, stats, detected_type, context)
    }

    fn describe(
        &self,
        column_name: &str,
        stats: &ColumnStatistics,
        detected_type: SemanticType,
        context: &DatasetContext,
    ) -> String {
        let prompt = PromptBuilder::description_prompt(column_name, stats, detected_type, context);
        let raw = self.gateway.complete_default(&prompt);
        ResponseValidator::validate_description(&raw, column_name)
    }

    fn classify(
        &self,
        column_name: &str,
        description: &str,
        stats: &ColumnStatistics,
        detected_type: SemanticType,
        context: &DatasetContext,
    ) -> ClassificationResult {
        let prompt = PromptBuilder::classification_prompt(
            column_name,
            description,
            stats,
            detected_type,
            context,
        );
        let raw = self.gateway.complete_default(&prompt);
        ResponseValidator::validate_classification(&raw, detected_type)
    }
}
