//! Shared utilities for profiling and prompt rendering.
//!
//! This module contains small helpers used across multiple modules
//! to keep dtype handling and value formatting consistent.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type (signed or unsigned).
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Check if a DataType is nested or binary, i.e. has no scalar text form.
#[inline]
pub fn is_nested_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::List(_) | DataType::Array(_, _) | DataType::Struct(_) | DataType::Binary
    )
}

// =============================================================================
// Value Formatting Utilities
// =============================================================================

/// Render a float the way analysts expect to read it back: integral values
/// keep a trailing `.0` (`3.0`, not `3`), and magnitudes of at least 1e16 or
/// below 1e-4 use exponent notation (`1e+20`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format_exponent(value);
    }

    let rendered = format!("{}", value);
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

/// Exponent form with an explicit sign and at least two exponent digits.
fn format_exponent(value: f64) -> String {
    let rendered = format!("{:e}", value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rendered,
    }
}

/// Map a float to `None` unless it is finite.
#[inline]
pub fn finite_or_none(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Stringify every value of a series; `None` marks a missing entry.
///
/// Integers render in decimal, floats through [`format_float`], everything
/// else through a cast to strings.
pub fn series_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let dtype = series.dtype();
    if is_integer_dtype(dtype) {
        let cast = series.cast(&DataType::Int64)?;
        Ok(cast.i64()?.into_iter().map(|v| v.map(|x| x.to_string())).collect())
    } else if is_float_dtype(dtype) {
        let cast = series.cast(&DataType::Float64)?;
        Ok(cast.f64()?.into_iter().map(|v| v.map(format_float)).collect())
    } else {
        let cast = series.cast(&DataType::String)?;
        Ok(cast.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
    }
}

// =============================================================================
// Text Utilities
// =============================================================================

/// Number of whitespace-separated words.
#[inline]
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// True for a non-empty string made only of letters and digits.
pub fn is_alphanumeric_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphanumeric)
}

/// Truncate a string to `max_chars` characters with an ellipsis.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let truncated: String = s.chars().take(keep).collect();
    format!("{}...", truncated)
}

/// Clean CSV content before a last-resort parse: collapse doubled quotes and
/// drop blank lines.
pub fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Tests
// =============================================================================
