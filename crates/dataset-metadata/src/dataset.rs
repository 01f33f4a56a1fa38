//! Dataset loading and the column representation used by the profiler.
//!
//! A [`Dataset`] wraps a polars `DataFrame`. Each column handed to analysis
//! is a [`Column`]: a series normalized once so that its storage kind
//! (numeric vs. non-numeric) is fixed. Integer and float series stay
//! numeric (NaN becomes null), everything else is cast to strings.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MetadataError, Result, ResultExt};
use crate::utils::{
    clean_csv_content, is_float_dtype, is_nested_dtype, is_numeric_dtype, series_to_strings,
};

/// Number of rows rendered into the dataset sample shown to the model.
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// Cell text for missing values in the dataset sample.
const MISSING_CELL: &str = "NaN";

/// Coarse storage kind of a column, decided once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Integer or floating point values.
    Numeric,
    /// Strings, booleans, dates and anything else rendered as text.
    NonNumeric,
}

/// A single named column.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Storage dtype tag of the source series, e.g. `i64`, `f64`, `str`, `bool`.
    pub dtype: String,
    series: Series,
}

impl Column {
    fn wrap(dtype: impl Into<String>, series: Series) -> Self {
        Self {
            name: series.name().to_string(),
            dtype: dtype.into(),
            series,
        }
    }

    /// Text column (`str` dtype).
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let name: String = name.into();
        let values: Vec<Option<String>> = values.into_iter().map(|v| v.map(Into::into)).collect();
        Self::wrap("str", Series::new(name.as_str().into(), values))
    }

    /// Integer column (`i64` dtype).
    pub fn integers(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let name: String = name.into();
        let values: Vec<Option<i64>> = values.into_iter().collect();
        Self::wrap("i64", Series::new(name.as_str().into(), values))
    }

    /// Float column (`f64` dtype). NaN is treated as missing.
    pub fn floats(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let name: String = name.into();
        let values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Self::wrap("f64", Series::new(name.as_str().into(), values))
    }

    /// Convert a polars series.
    ///
    /// Integer dtypes are kept, float dtypes become `f64` with NaN as null and
    /// everything else is cast to strings. Nested and binary dtypes are
    /// rejected with [`MetadataError::UnsupportedColumnType`].
    pub fn from_series(series: &Series) -> Result<Self> {
        let name = series.name().to_string();
        let dtype = series.dtype().to_string();
        let unsupported = || MetadataError::UnsupportedColumnType {
            column: name.clone(),
            dtype: dtype.clone(),
        };

        if is_nested_dtype(series.dtype()) {
            return Err(unsupported());
        }

        let normalized = if is_float_dtype(series.dtype()) {
            let cast = series
                .cast(&DataType::Float64)
                .context(format!("Casting column '{}' to floats", name))?;
            let without_nan: Float64Chunked = cast
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            without_nan.with_name(series.name().clone()).into_series()
        } else if is_numeric_dtype(series.dtype()) {
            series.clone()
        } else {
            series.cast(&DataType::String).map_err(|_| unsupported())?
        };

        Ok(Self::wrap(dtype, normalized))
    }

    /// The normalized series.
    pub fn series(&self) -> &Series {
        &self.series
    }

    /// Row count, including missing entries.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.series.null_count()
    }

    pub fn storage_kind(&self) -> StorageKind {
        if is_numeric_dtype(self.series.dtype()) {
            StorageKind::Numeric
        } else {
            StorageKind::NonNumeric
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.storage_kind() == StorageKind::Numeric
    }
}

/// A loaded tabular dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Load a CSV file with multiple fallback strategies.
    ///
    /// Tries a standard quoted parse, then a parse with default options, then
    /// a parse of pre-cleaned content.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Strategy 1: Standard loading with quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
        {
            Ok(df) => return Ok(Self::new(df)),
            Err(e) => debug!("Standard loading failed: {}", e),
        }

        // Strategy 2: Default parse options
        match CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
        {
            Ok(df) => return Ok(Self::new(df)),
            Err(e) => debug!("Loading with default options failed: {}", e),
        }

        // Strategy 3: Pre-clean content
        let content = std::fs::read_to_string(path)?;
        Self::from_csv_str(&clean_csv_content(&content))
            .map_err(|e| e.with_context(format!("Loading '{}'", path.display())))
    }

    /// Parse CSV text held in memory.
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let cursor = Cursor::new(content.to_string());
        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(100))
            .with_has_header(true)
            .into_reader_with_file_handle(cursor)
            .finish()?;
        Ok(Self::new(df))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Borrow the underlying series of a column.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| MetadataError::ColumnNotFound(name.to_string()))
    }

    /// Convert a column for analysis.
    pub fn column(&self, name: &str) -> Result<Column> {
        Column::from_series(self.series(name)?)
    }

    /// Render the first `rows` rows as a plain-text table.
    ///
    /// Every column is included and no value is shortened. Cells are
    /// right-aligned under their headers; missing values read `NaN`.
    pub fn sample_text(&self, rows: usize) -> String {
        let head = self.frame.head(Some(rows));
        let height = head.height();

        let columns: Vec<Vec<String>> = head
            .get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                let mut cells = Vec::with_capacity(height + 1);
                cells.push(series.name().to_string());
                match series_to_strings(series) {
                    Ok(values) => cells.extend(
                        values
                            .into_iter()
                            .map(|v| v.unwrap_or_else(|| MISSING_CELL.to_string())),
                    ),
                    Err(_) => cells.extend((0..height).map(|i| {
                        series
                            .get(i)
                            .map(|v| v.to_string())
                            .unwrap_or_else(|_| MISSING_CELL.to_string())
                    })),
                }
                cells
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .map(|cells| cells.iter().map(|c| c.chars().count()).max().unwrap_or(0))
            .collect();

        (0..=height)
            .map(|row| {
                columns
                    .iter()
                    .zip(&widths)
                    .map(|(cells, &width)| format!("{:>width$}", cells[row], width = width))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
