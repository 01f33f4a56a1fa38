//! Session state and its in-memory store.

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::analysis::{DEFAULT_DATASET_DESCRIPTION, DEFAULT_DATASET_NAME};
use crate::config::SessionConfig;
use crate::dataset::Dataset;
use crate::error::{MetadataError, Result};
use crate::types::{ColumnAnalysisResult, ConfirmedColumn, PreviousColumn};

/// Timestamp format of session ids (microsecond precision).
const SESSION_ID_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

// ============================================================================
// Session
// ============================================================================

/// Everything one user works on: the dataset, cached analyses and the
/// confirmed column list.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    pub dataset: Dataset,
    pub dataset_name: Option<String>,
    pub dataset_description: Option<String>,
    /// Text of an auxiliary document, passed to prompts as extra context.
    pub extra_content: String,
    pub extra_filename: String,
    /// At most one entry per column, in first-analysis order.
    analyses: Vec<ColumnAnalysisResult>,
    confirmed: Vec<ConfirmedColumn>,
    created_at: DateTime<Local>,
}

impl Session {
    pub fn new(
        dataset: Dataset,
        extra_content: impl Into<String>,
        extra_filename: impl Into<String>,
    ) -> Self {
        Self::new_at(dataset, extra_content, extra_filename, Local::now())
    }

    /// Session with an explicit creation time; the id is derived from it.
    pub fn new_at(
        dataset: Dataset,
        extra_content: impl Into<String>,
        extra_filename: impl Into<String>,
        created_at: DateTime<Local>,
    ) -> Self {
        Self {
            id: created_at.format(SESSION_ID_FORMAT).to_string(),
            dataset,
            dataset_name: None,
            dataset_description: None,
            extra_content: extra_content.into(),
            extra_filename: extra_filename.into(),
            analyses: Vec::new(),
            confirmed: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn creation_time(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn dataset_name(&self) -> &str {
        self.dataset_name.as_deref().unwrap_or(DEFAULT_DATASET_NAME)
    }

    pub fn dataset_description(&self) -> &str {
        self.dataset_description
            .as_deref()
            .unwrap_or(DEFAULT_DATASET_DESCRIPTION)
    }

    pub fn analysis(&self, column_name: &str) -> Option<&ColumnAnalysisResult> {
        self.analyses.iter().find(|a| a.column_name == column_name)
    }

    pub fn analysis_mut(&mut self, column_name: &str) -> Option<&mut ColumnAnalysisResult> {
        self.analyses.iter_mut().find(|a| a.column_name == column_name)
    }

    pub fn analyses(&self) -> &[ColumnAnalysisResult] {
        &self.analyses
    }

    /// Store an analysis, replacing an earlier one for the same column in place.
    pub fn cache_analysis(&mut self, result: ColumnAnalysisResult) {
        match self
            .analyses
            .iter()
            .position(|a| a.column_name == result.column_name)
        {
            Some(i) => self.analyses[i] = result,
            None => self.analyses.push(result),
        }
    }

    /// Cached analyses that carry a description, as prompt context.
    pub fn previous_columns(&self) -> Vec<PreviousColumn> {
        self.analyses
            .iter()
            .filter(|a| !a.description.is_empty())
            .map(|a| PreviousColumn {
                name: a.column_name.clone(),
                semantic_type: a.suggested_type,
                description: a.description.clone(),
            })
            .collect()
    }

    pub fn confirmed_columns(&self) -> &[ConfirmedColumn] {
        &self.confirmed
    }

    /// Replace the confirmed entry with the same name, or append.
    pub fn confirm(&mut self, column: ConfirmedColumn) {
        match self.confirmed.iter().position(|c| c.name == column.name) {
            Some(i) => self.confirmed[i] = column,
            None => self.confirmed.push(column),
        }
    }

    /// Whether the session is older than `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Local>, ttl: Duration) -> bool {
        (now - self.created_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

// ============================================================================
// Store
// ============================================================================

/// Storage for live sessions.
///
/// `update` runs its closure while holding the store's write lock, so a
/// read-modify-write of one session cannot lose a concurrent update.
pub trait SessionStore: Send + Sync {
    /// Snapshot of a live session.
    fn get(&self, id: &str) -> Result<Session>;

    /// Add a session and return its id, suffixed if the id was already taken.
    fn insert(&self, session: Session) -> String;

    /// Apply `f` to a live session.
    fn update<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Result<R>;

    /// Remove a session; returns whether it existed.
    fn delete(&self, id: &str) -> bool;

    /// Drop expired sessions and return how many were removed.
    fn purge_expired(&self) -> usize;

    /// Number of stored sessions, expired ones included until purged.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local session store with a fixed time-to-live.
///
/// Expired sessions are invisible to `get` and `update` and are removed by
/// `purge_expired`.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

static_assertions::assert_impl_all!(InMemorySessionStore: Send, Sync);

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_hours.saturating_mul(3600)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn live<'a>(&self, sessions: &'a HashMap<String, Session>, id: &str) -> Option<&'a Session> {
        sessions
            .get(id)
            .filter(|s| !s.is_expired(Local::now(), self.ttl))
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &str) -> Result<Session> {
        let sessions = self.sessions.read();
        self.live(&sessions, id)
            .cloned()
            .ok_or_else(|| MetadataError::SessionNotFound(id.to_string()))
    }

    fn insert(&self, mut session: Session) -> String {
        let mut sessions = self.sessions.write();

        if sessions.contains_key(&session.id) {
            let base = session.id.clone();
            let mut n = 1;
            while sessions.contains_key(&format!("{}_{}", base, n)) {
                n += 1;
            }
            session.id = format!("{}_{}", base, n);
        }

        let id = session.id.clone();
        info!(
            "Created session {} with dataset shape: {:?}",
            id,
            session.dataset.shape()
        );
        sessions.insert(id.clone(), session);
        id
    }

    fn update<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Result<R> {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(id) {
            Some(session) if !session.is_expired(Local::now(), self.ttl) => Ok(f(session)),
            _ => Err(MetadataError::SessionNotFound(id.to_string())),
        }
    }

    fn delete(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    fn purge_expired(&self) -> usize {
        let now = Local::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!("Removed {} expired sessions", removed);
        }
        removed
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
