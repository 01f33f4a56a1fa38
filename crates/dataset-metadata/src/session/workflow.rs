//! Session-level operations: upload, analyze, edit, confirm, export.

use tracing::{debug, info};

use super::store::{InMemorySessionStore, Session, SessionStore};
use crate::ai::LlmGateway;
use crate::analysis::{ColumnAnalyzer, DatasetContext};
use crate::config::{AppConfig, SessionConfig};
use crate::dataset::{DEFAULT_SAMPLE_ROWS, Dataset};
use crate::error::{MetadataError, Result};
use crate::profiler::StatsProfiler;
use crate::types::{
    ClassificationResult, ColumnAnalysisResult, ConfirmedColumn, DatasetMetadata, SemanticType,
};

/// Drives the metadata workflow for any number of sessions.
///
/// Model calls run without holding the store lock; results are written back
/// with a single [`SessionStore::update`].
pub struct MetadataWorkflow<S: SessionStore = InMemorySessionStore> {
    store: S,
    analyzer: ColumnAnalyzer,
}

impl MetadataWorkflow<InMemorySessionStore> {
    /// Workflow backed by an in-memory store.
    pub fn new(analyzer: ColumnAnalyzer, session: &SessionConfig) -> Self {
        Self::with_store(InMemorySessionStore::from_config(session), analyzer)
    }

    /// Build the gateway and store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM backend's HTTP client cannot be created.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let gateway = LlmGateway::from_config(&config.llm, config.logging.show_prompts)?;
        Ok(Self::new(ColumnAnalyzer::new(gateway), &config.session))
    }
}

impl<S: SessionStore> MetadataWorkflow<S> {
    pub fn with_store(store: S, analyzer: ColumnAnalyzer) -> Self {
        Self { store, analyzer }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn analyzer(&self) -> &ColumnAnalyzer {
        &self.analyzer
    }

    /// Open a session for a dataset and optional auxiliary document text.
    pub fn create_session(
        &self,
        dataset: Dataset,
        extra_content: impl Into<String>,
        extra_filename: impl Into<String>,
    ) -> String {
        self.store
            .insert(Session::new(dataset, extra_content, extra_filename))
    }

    pub fn set_dataset_info(
        &self,
        session_id: &str,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<()> {
        let (name, description) = (name.into(), description.into());
        self.store.update(session_id, |session| {
            session.dataset_name = Some(name);
            session.dataset_description = Some(description);
        })
    }

    /// Prompt context for the session's next model call.
    pub fn analysis_context(&self, session_id: &str) -> Result<DatasetContext> {
        Ok(context_for(&self.store.get(session_id)?))
    }

    /// Analyze a column and cache the result in the session.
    pub fn analyze_column(&self, session_id: &str, column_name: &str) -> Result<ColumnAnalysisResult> {
        let session = self.store.get(session_id)?;
        let column = session.dataset.column(column_name)?;
        let context = context_for(&session);

        let result = self.analyzer.analyze_column(&column, &context);

        let cached = result.clone();
        self.store
            .update(session_id, |session| session.cache_analysis(cached))?;
        Ok(result)
    }

    /// Re-classify a previously analyzed column against an edited description.
    ///
    /// The cached description and suggested type are overwritten; statistics
    /// and the detected type are kept.
    pub fn reanalyze_type(
        &self,
        session_id: &str,
        column_name: &str,
        description: &str,
    ) -> Result<ClassificationResult> {
        let session = self.store.get(session_id)?;
        let cached = session
            .analysis(column_name)
            .ok_or_else(|| MetadataError::ColumnNotAnalyzed(column_name.to_string()))?;
        let context = context_for(&session);

        let result = self.analyzer.reanalyze_type(
            column_name,
            description,
            &cached.stats,
            cached.detected_type,
            &context,
        );

        self.store.update(session_id, |session| {
            if let Some(analysis) = session.analysis_mut(column_name) {
                analysis.description = description.to_string();
                analysis.suggested_type = result.suggested_type;
            }
        })?;
        Ok(result)
    }

    /// Record the final metadata for a column.
    ///
    /// Statistics are recomputed from the dataset. A missing type defaults to
    /// categorical and a missing or empty description to `Column <name>`.
    /// Mean, std, min and max are kept only for continuous columns that have
    /// a mean.
    pub fn confirm_column(
        &self,
        session_id: &str,
        column_name: &str,
        semantic_type: Option<SemanticType>,
        description: Option<&str>,
    ) -> Result<ConfirmedColumn> {
        let session = self.store.get(session_id)?;
        let stats = StatsProfiler::profile_series(session.dataset.series(column_name)?);

        let semantic_type = semantic_type.unwrap_or(SemanticType::Categorical);
        let description = description
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Column {}", column_name));

        let numeric = stats
            .numeric()
            .filter(|summary| semantic_type == SemanticType::Continuous && summary.mean.is_some())
            .copied();

        let confirmed = ConfirmedColumn {
            name: column_name.to_string(),
            description,
            semantic_type,
            missing_values: stats.missing_count,
            unique_values: stats.unique_count,
            numeric,
        };

        let entry = confirmed.clone();
        self.store.update(session_id, |session| session.confirm(entry))?;
        debug!("Confirmed column '{}' as {}", column_name, semantic_type);
        Ok(confirmed)
    }

    /// Confirm every dataset column in order, using cached analyses where
    /// present. Returns the number of columns confirmed.
    pub fn auto_confirm_all(&self, session_id: &str) -> Result<usize> {
        let session = self.store.get(session_id)?;
        let columns = session.dataset.column_names();

        for name in &columns {
            match session.analysis(name) {
                Some(analysis) => self.confirm_column(
                    session_id,
                    name,
                    Some(analysis.suggested_type),
                    Some(&analysis.description),
                )?,
                None => self.confirm_column(session_id, name, None, None)?,
            };
        }

        info!("Auto-confirmed {} columns in session {}", columns.len(), session_id);
        Ok(columns.len())
    }

    /// Dataset-level metadata document with all confirmed columns.
    pub fn metadata(&self, session_id: &str) -> Result<DatasetMetadata> {
        let session = self.store.get(session_id)?;
        Ok(DatasetMetadata {
            dataset_name: session.dataset_name().to_string(),
            dataset_description: session.dataset_description().to_string(),
            columns: session.confirmed_columns().to_vec(),
        })
    }

    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }
}

fn context_for(session: &Session) -> DatasetContext {
    DatasetContext {
        dataset_name: session.dataset_name().to_string(),
        dataset_description: session.dataset_description().to_string(),
        sample_text: session.dataset.sample_text(DEFAULT_SAMPLE_ROWS),
        previous_columns: session.previous_columns(),
        additional_context: session.extra_content.clone(),
    }
}
