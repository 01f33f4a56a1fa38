//! Turns raw gateway replies into descriptions and confidence maps.
//!
//! Neither validator fails. A bracket-failure reply, or a classification
//! reply that is not a JSON object of numbers, falls back to the rule-based
//! result.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ai::is_failure_marker;
use crate::types::{ClassificationResult, ConfidenceMap, SemanticType};

/// Description used when the model did not produce one.
pub fn fallback_description(column_name: &str) -> String {
    format!("This column represents {} data in the dataset.", column_name)
}

/// Validates model output.
pub struct ResponseValidator;

impl ResponseValidator {
    /// Trimmed reply, or the fallback sentence when the reply is a failure marker.
    pub fn validate_description(raw: &str, column_name: &str) -> String {
        if is_failure_marker(raw) {
            warn!(
                "Description generation failed for '{}': {}. Using fallback",
                column_name, raw
            );
            return fallback_description(column_name);
        }
        raw.trim().to_string()
    }

    /// Parse a JSON confidence map and pick the top label.
    ///
    /// Labels missing from the object score 0.0, unknown keys are ignored
    /// and scores are kept unclamped. A failure marker, invalid JSON, a
    /// non-object, or a non-numeric score on a known label all yield
    /// `detected` at 0.9.
    pub fn validate_classification(raw: &str, detected: SemanticType) -> ClassificationResult {
        if is_failure_marker(raw) {
            warn!("Type classification failed: {}. Using rule-based type {}", raw, detected);
            return Self::fallback(detected);
        }

        let object = match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                warn!(
                    "Classification reply is not a JSON object ({}). Using rule-based type {}",
                    json_kind(&other),
                    detected
                );
                return Self::fallback(detected);
            }
            Err(e) => {
                warn!(
                    "Failed to parse classification reply as JSON: {}. Using rule-based type {}",
                    e, detected
                );
                return Self::fallback(detected);
            }
        };

        match parse_confidence(&object) {
            Some(confidence) => {
                let suggested_type = confidence.top();
                debug!("Parsed confidence scores, top type: {}", suggested_type);
                ClassificationResult {
                    confidence,
                    suggested_type,
                }
            }
            None => {
                warn!(
                    "Classification reply has non-numeric scores. Using rule-based type {}",
                    detected
                );
                Self::fallback(detected)
            }
        }
    }

    fn fallback(detected: SemanticType) -> ClassificationResult {
        ClassificationResult {
            confidence: ConfidenceMap::fallback(detected),
            suggested_type: detected,
        }
    }
}

/// `None` if any known label holds something other than a number.
fn parse_confidence(object: &Map<String, Value>) -> Option<ConfidenceMap> {
    let mut confidence = ConfidenceMap::default();
    for label in SemanticType::ALL {
        if let Some(value) = object.get(label.as_str()) {
            confidence.set(label, value.as_f64()?);
        }
    }
    Some(confidence)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
