//! Column profiling: descriptive statistics and rule-based type detection.
//!
//! This module provides:
//! - [`StatsProfiler`]: statistics for one column (numeric or categorical branch)
//! - [`RuleBasedTypeDetector`]: deterministic semantic type assignment
//!
//! Profiling never fails. Columns that cannot be read produce a degraded
//! statistics object so prompt construction always has something to render.

mod statistics;
mod type_inference;

use polars::prelude::{PolarsResult, Series};
use rand::Rng;
use tracing::warn;

use crate::dataset::{Column, StorageKind};
use crate::types::{CategoricalSummary, ColumnStatistics, NumericSummary, StatsSummary};

pub use type_inference::RuleBasedTypeDetector;

/// Statistics profiler for a single column.
pub struct StatsProfiler;

impl StatsProfiler {
    /// Profile a column, sampling distinct values with the thread-local RNG.
    pub fn profile(column: &Column) -> ColumnStatistics {
        Self::profile_with_rng(column, &mut rand::thread_rng())
    }

    /// Profile a column with an explicit random source for value sampling.
    ///
    /// A polars failure yields [`StatsProfiler::degraded`].
    pub fn profile_with_rng<R: Rng + ?Sized>(column: &Column, rng: &mut R) -> ColumnStatistics {
        match Self::compute(column, rng) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Could not profile column '{}': {}", column.name, e);
                Self::degraded(column.dtype.clone(), column.len(), column.storage_kind())
            }
        }
    }

    fn compute<R: Rng + ?Sized>(column: &Column, rng: &mut R) -> PolarsResult<ColumnStatistics> {
        let non_null = column.series().drop_nulls();
        let distinct = statistics::distinct_values(&non_null)?;

        let summary = match column.storage_kind() {
            StorageKind::Numeric => {
                StatsSummary::Numeric(statistics::numeric_summary(&non_null)?)
            }
            StorageKind::NonNumeric => {
                StatsSummary::Categorical(statistics::mode(&non_null, &distinct)?)
            }
        };

        Ok(ColumnStatistics {
            storage_type: column.dtype.clone(),
            unique_count: non_null.n_unique()?,
            sample_unique_values: statistics::sample_distinct(&distinct, rng),
            missing_count: column.missing_count(),
            summary,
        })
    }

    /// Profile a polars series directly.
    ///
    /// Series that cannot be converted yield [`StatsProfiler::degraded`].
    pub fn profile_series(series: &Series) -> ColumnStatistics {
        match Column::from_series(series) {
            Ok(column) => Self::profile(&column),
            Err(e) => {
                warn!("Could not profile column '{}': {}", series.name(), e);
                Self::degraded(
                    series.dtype().to_string(),
                    series.len(),
                    StorageKind::NonNumeric,
                )
            }
        }
    }

    /// Placeholder statistics for a column that could not be analyzed: every
    /// row counted as missing, nothing else known.
    pub fn degraded(
        storage_type: impl Into<String>,
        row_count: usize,
        kind: StorageKind,
    ) -> ColumnStatistics {
        let summary = match kind {
            StorageKind::Numeric => StatsSummary::Numeric(NumericSummary::default()),
            StorageKind::NonNumeric => StatsSummary::Categorical(CategoricalSummary::default()),
        };

        ColumnStatistics {
            storage_type: storage_type.into(),
            unique_count: 0,
            sample_unique_values: Vec::new(),
            missing_count: row_count,
            summary,
        }
    }
}
