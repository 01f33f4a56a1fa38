//! Statistical helpers for column profiling.
//!
//! Every helper takes a series with nulls already dropped.

use polars::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::{CategoricalSummary, NumericSummary};
use crate::utils::{finite_or_none, series_to_strings};

/// Maximum number of distinct values reported in `sample_unique_values`.
pub(crate) const MAX_SAMPLE_VALUES: usize = 10;

/// Distinct values, stringified, in first-seen order.
pub(crate) fn distinct_values(non_null: &Series) -> PolarsResult<Vec<String>> {
    let distinct = non_null.unique_stable()?;
    Ok(series_to_strings(&distinct)?.into_iter().flatten().collect())
}

/// All distinct values if there are at most ten, otherwise a uniform random
/// sample of ten without replacement.
pub(crate) fn sample_distinct<R: Rng + ?Sized>(distinct: &[String], rng: &mut R) -> Vec<String> {
    if distinct.len() <= MAX_SAMPLE_VALUES {
        return distinct.to_vec();
    }

    distinct
        .choose_multiple(rng, MAX_SAMPLE_VALUES)
        .cloned()
        .collect()
}

/// Most frequent value; ties go to the value seen first.
///
/// `distinct` must be the first-seen ordering from [`distinct_values`].
pub(crate) fn mode(non_null: &Series, distinct: &[String]) -> PolarsResult<CategoricalSummary> {
    if non_null.is_empty() {
        return Ok(CategoricalSummary::default());
    }

    let count_name = format!("{}_count", non_null.name());
    let counts = non_null.value_counts(true, false, count_name.as_str().into(), false)?;
    let values = series_to_strings(counts.column(non_null.name().as_str())?.as_materialized_series())?;
    let frequencies = counts
        .column(&count_name)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    let frequencies = frequencies.u64()?;

    let Some(top) = frequencies.get(0) else {
        return Ok(CategoricalSummary::default());
    };

    // Sorted by count, so the tied values lead the frame
    let tied: Vec<&str> = values
        .iter()
        .zip(frequencies.into_iter())
        .take_while(|(_, count)| *count == Some(top))
        .filter_map(|(value, _)| value.as_deref())
        .collect();

    let mode_value = distinct.iter().find(|v| tied.contains(&v.as_str())).cloned();
    Ok(CategoricalSummary {
        mode_frequency: mode_value.as_ref().map(|_| top as usize),
        mode_value,
    })
}

/// Mean, sample standard deviation, min and max.
///
/// Every field is `None` when undefined: no values at all, a single value for
/// the standard deviation, or a non-finite result.
pub(crate) fn numeric_summary(non_null: &Series) -> PolarsResult<NumericSummary> {
    if non_null.is_empty() {
        return Ok(NumericSummary::default());
    }

    let floats = non_null.cast(&DataType::Float64)?;
    let floats = floats.f64()?;

    let std = if floats.len() < 2 {
        None
    } else {
        floats.std(1).and_then(finite_or_none)
    };

    Ok(NumericSummary {
        mean: floats.mean().and_then(finite_or_none),
        std,
        min: floats.min().and_then(finite_or_none),
        max: floats.max().and_then(finite_or_none),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn text(values: &[&str]) -> Series {
        Series::new("label".into(), values)
    }

    fn floats(values: &[f64]) -> Series {
        Series::new("value".into(), values)
    }

    // ==================== distinct_values ====================

    #[test]
    fn test_distinct_values_text_first_seen_order() {
        assert_eq!(distinct_values(&text(&["b", "a", "b", "c"])).unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_distinct_values_float_formatting() {
        assert_eq!(
            distinct_values(&floats(&[1.0, 2.5, 1.0])).unwrap(),
            vec!["1.0", "2.5"]
        );
    }

    #[test]
    fn test_distinct_values_integers() {
        let series = Series::new("n".into(), &[7i64, 7, -1]);
        assert_eq!(distinct_values(&series).unwrap(), vec!["7", "-1"]);
    }

    // ==================== sample_distinct ====================

    #[test]
    fn test_sample_distinct_small_keeps_all() {
        let mut rng = StdRng::seed_from_u64(42);
        let distinct = vec!["x".to_string(), "y".to_string()];
        assert_eq!(sample_distinct(&distinct, &mut rng), vec!["x", "y"]);
    }

    #[test]
    fn test_sample_distinct_large_draws_ten_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let distinct: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        let sample = sample_distinct(&distinct, &mut rng);

        assert_eq!(sample.len(), MAX_SAMPLE_VALUES);
        let unique: std::collections::HashSet<_> = sample.iter().collect();
        assert_eq!(unique.len(), MAX_SAMPLE_VALUES);
        assert!(sample.iter().all(|v| v.parse::<usize>().unwrap() < 50));
    }

    // ==================== mode ====================

    #[test]
    fn test_mode_most_frequent() {
        let series = text(&["blue", "red", "red", "green", "red"]);
        let distinct = distinct_values(&series).unwrap();
        let summary = mode(&series, &distinct).unwrap();
        assert_eq!(summary.mode_value.as_deref(), Some("red"));
        assert_eq!(summary.mode_frequency, Some(3));
    }

    #[test]
    fn test_mode_tie_prefers_first_seen() {
        let series = text(&["green", "red", "blue", "blue", "red"]);
        let distinct = distinct_values(&series).unwrap();
        let summary = mode(&series, &distinct).unwrap();
        assert_eq!(summary.mode_value.as_deref(), Some("red"));
        assert_eq!(summary.mode_frequency, Some(2));
    }

    #[test]
    fn test_mode_column_named_count() {
        let series = Series::new("count".into(), &["a", "b", "b"]);
        let distinct = distinct_values(&series).unwrap();
        let summary = mode(&series, &distinct).unwrap();
        assert_eq!(summary.mode_value.as_deref(), Some("b"));
    }

    #[test]
    fn test_mode_empty() {
        let summary = mode(&text(&[]), &[]).unwrap();
        assert_eq!(summary.mode_value, None);
        assert_eq!(summary.mode_frequency, None);
    }

    // ==================== numeric_summary ====================

    #[test]
    fn test_numeric_summary_basic() {
        let summary = numeric_summary(&floats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])).unwrap();
        assert_eq!(summary.mean, Some(5.0));
        assert_eq!(summary.min, Some(2.0));
        assert_eq!(summary.max, Some(9.0));
        let std = summary.std.unwrap();
        assert!((std - 2.138089935299395).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_summary_integers() {
        let series = Series::new("age".into(), &[20i64, 30, 40]);
        let summary = numeric_summary(&series).unwrap();
        assert_eq!(summary.mean, Some(30.0));
        assert!((summary.std.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_summary_single_value_has_no_std() {
        let summary = numeric_summary(&floats(&[3.5])).unwrap();
        assert_eq!(summary.mean, Some(3.5));
        assert_eq!(summary.std, None);
        assert_eq!(summary.min, Some(3.5));
    }

    #[test]
    fn test_numeric_summary_empty() {
        assert_eq!(numeric_summary(&floats(&[])).unwrap(), NumericSummary::default());
    }

    #[test]
    fn test_numeric_summary_non_finite() {
        let summary = numeric_summary(&floats(&[1.0, f64::INFINITY])).unwrap();
        assert_eq!(summary.mean, None);
        assert_eq!(summary.max, None);
        assert_eq!(summary.min, Some(1.0));
    }
}
