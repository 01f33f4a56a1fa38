//! Rule-based semantic type detection.

use once_cell::sync::Lazy;
use polars::prelude::Series;
use regex::Regex;

use super::statistics::distinct_values;
use crate::dataset::Column;
use crate::types::SemanticType;
use crate::utils::{is_alphanumeric_token, word_count};

// Column names that mark an identifier - compiled once at startup
static IDENTIFIER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(id|identifier)$|_id$").expect("Invalid regex: identifier name"));

/// Values that signal an ordered scale.
const ORDINAL_VOCABULARY: [&str; 9] = [
    "low",
    "medium",
    "high",
    "bad",
    "average",
    "good",
    "excellent",
    "small",
    "large",
];

/// Distinct-count threshold shared by the continuous and categorical rules.
const CARDINALITY_THRESHOLD: usize = 15;

/// Mean words per value above which a text column is free text.
const FREE_TEXT_MIN_WORDS: f64 = 5.0;

/// Deterministic heuristic classifier.
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. exactly two distinct values: binary
/// 2. name is `id`/`identifier` or ends in `_id`: identifier
/// 3. text, all values unique and alphanumeric: identifier
/// 4. text averaging more than five words: free text
/// 5. numeric with more than fifteen distinct values: continuous
/// 6. text containing a known ordinal word: ordinal
/// 7. fewer than fifteen distinct values: categorical
/// 8. otherwise categorical for text, continuous for numbers
pub struct RuleBasedTypeDetector;

impl RuleBasedTypeDetector {
    /// Classify a column. Pure and deterministic.
    pub fn detect(column: &Column) -> SemanticType {
        let non_null = column.series().drop_nulls();
        let distinct = distinct_values(&non_null).unwrap_or_default();
        let n_unique = distinct.len();
        let numeric = column.is_numeric();

        if n_unique == 2 {
            return SemanticType::Binary;
        }

        if is_identifier_name(&column.name) {
            return SemanticType::Identifier;
        }

        if !numeric
            && n_unique > 0
            && n_unique == column.len()
            && distinct.iter().all(|v| is_alphanumeric_token(v))
        {
            return SemanticType::Identifier;
        }

        if !numeric && mean_word_count(&non_null) > FREE_TEXT_MIN_WORDS {
            return SemanticType::FreeText;
        }

        if numeric && n_unique > CARDINALITY_THRESHOLD {
            return SemanticType::Continuous;
        }

        if !numeric
            && distinct
                .iter()
                .any(|v| ORDINAL_VOCABULARY.contains(&v.to_lowercase().as_str()))
        {
            return SemanticType::Ordinal;
        }

        if n_unique < CARDINALITY_THRESHOLD {
            return SemanticType::Categorical;
        }

        if numeric {
            SemanticType::Continuous
        } else {
            SemanticType::Categorical
        }
    }
}

/// `id`, `identifier` or a `_id` suffix, case-insensitive.
pub(crate) fn is_identifier_name(name: &str) -> bool {
    IDENTIFIER_NAME.is_match(name)
}

/// Average whitespace-separated word count over non-missing text values.
fn mean_word_count(non_null: &Series) -> f64 {
    let Ok(text) = non_null.str() else {
        return 0.0;
    };

    let (words, count) = text
        .into_iter()
        .flatten()
        .fold((0usize, 0usize), |(words, count), v| {
            (words + word_count(v), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        words as f64 / count as f64
    }
}
