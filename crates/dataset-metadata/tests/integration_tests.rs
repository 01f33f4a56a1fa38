//! Integration tests for the metadata workflow.
//!
//! These tests drive the public API end to end on a CSV fixture, with either
//! no LLM at all or a scripted in-memory backend.

use dataset_metadata::session::SessionStore;
use dataset_metadata::{
    AppConfig, ColumnAnalyzer, ConfidenceMap, Dataset, InMemorySessionStore, LlmBackend,
    LlmError, LlmGateway, MetadataWorkflow, RuleBasedTypeDetector, SemanticType, SessionConfig,
    StatsProfiler,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_customers() -> Dataset {
    Dataset::from_csv(fixtures_path().join("customers.csv")).expect("Failed to read CSV file")
}

/// Backend answering through a closure and recording every prompt.
struct ResponderBackend<F> {
    respond: F,
    prompts: Mutex<Vec<String>>,
}

impl<F> ResponderBackend<F>
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    fn new(respond: F) -> Arc<Self> {
        Arc::new(Self {
            respond,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl<F> LlmBackend for ResponderBackend<F>
where
    F: Fn(&str) -> Result<String, LlmError> + Send + Sync,
{
    fn complete(&self, prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt)
    }

    fn name(&self) -> &str {
        "Responder"
    }
}

fn is_classification_prompt(prompt: &str) -> bool {
    prompt.starts_with("You are analyzing tabular data columns")
}

/// Name of the column a prompt is about.
fn prompt_column(prompt: &str) -> String {
    prompt
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix("Column Name: "))
        .unwrap_or_default()
        .to_string()
}

fn workflow_with(backend: Arc<dyn LlmBackend>) -> MetadataWorkflow {
    MetadataWorkflow::new(
        ColumnAnalyzer::new(LlmGateway::new(backend)),
        &SessionConfig::default(),
    )
}

fn offline_workflow() -> MetadataWorkflow {
    MetadataWorkflow::new(
        ColumnAnalyzer::new(LlmGateway::disabled("OpenAI")),
        &SessionConfig::default(),
    )
}

// ============================================================================
// Profiling and Rule-Based Detection
// ============================================================================

#[test]
fn test_rule_based_types_on_fixture() {
    let dataset = load_customers();
    let expected = [
        ("customer_id", SemanticType::Identifier),
        ("gender", SemanticType::Binary),
        ("age", SemanticType::Continuous),
        ("plan", SemanticType::Categorical),
        ("satisfaction", SemanticType::Ordinal),
        ("monthly_spend", SemanticType::Continuous),
        ("feedback", SemanticType::FreeText),
    ];

    for (name, semantic_type) in expected {
        let column = dataset.column(name).unwrap();
        assert_eq!(
            RuleBasedTypeDetector::detect(&column),
            semantic_type,
            "column {}",
            name
        );
    }
}

#[test]
fn test_profile_fixture_columns() {
    let dataset = load_customers();

    let spend = StatsProfiler::profile(&dataset.column("monthly_spend").unwrap());
    assert_eq!(spend.missing_count, 2);
    assert_eq!(spend.unique_count, 18);
    assert_eq!(spend.sample_unique_values.len(), 10);
    let numeric = spend.numeric().unwrap();
    assert_eq!(numeric.min, Some(15.0));
    assert_eq!(numeric.max, Some(110.0));
    assert!(numeric.std.is_some());

    let plan = StatsProfiler::profile(&dataset.column("plan").unwrap());
    assert_eq!(plan.unique_count, 3);
    let summary = plan.categorical().unwrap();
    assert_eq!(summary.mode_value.as_deref(), Some("basic"));
    assert_eq!(summary.mode_frequency, Some(7));

    let feedback = StatsProfiler::profile(&dataset.column("feedback").unwrap());
    assert_eq!(feedback.missing_count, 1);
    assert_eq!(feedback.unique_count, 19);
}

// ============================================================================
// Workflow Without an LLM
// ============================================================================

#[test]
fn test_offline_workflow_end_to_end() {
    let workflow = offline_workflow();
    let dataset = load_customers();
    let columns = dataset.column_names();
    let id = workflow.create_session(dataset, "", "");
    workflow
        .set_dataset_info(&id, "Customers", "Subscription customers")
        .unwrap();

    for name in &columns {
        let result = workflow.analyze_column(&id, name).unwrap();
        assert_eq!(
            result.description,
            format!("This column represents {} data in the dataset.", name)
        );
        assert_eq!(result.suggested_type, result.detected_type);
        assert_eq!(result.confidence, ConfidenceMap::fallback(result.detected_type));
    }

    assert_eq!(workflow.auto_confirm_all(&id).unwrap(), 7);

    let metadata = workflow.metadata(&id).unwrap();
    let value = serde_json::to_value(&metadata).unwrap();
    assert_eq!(value["dataset_name"], "Customers");
    assert_eq!(value["dataset_description"], "Subscription customers");

    let columns = value["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 7);
    assert_eq!(columns[0]["name"], "customer_id");
    assert_eq!(columns[0]["type"], "identifier");
    assert!(columns[0].get("mean").is_none());

    assert_eq!(columns[5]["name"], "monthly_spend");
    assert_eq!(columns[5]["type"], "continuous");
    assert_eq!(columns[5]["missing_values"], 2);
    assert_eq!(columns[5]["min"], 15.0);
    assert_eq!(columns[5]["max"], 110.0);

    assert_eq!(columns[6]["type"], "free_text");
    assert_eq!(columns[6]["missing_values"], 1);
}

#[test]
fn test_connection_failures_degrade_to_rule_based() {
    let backend = ResponderBackend::new(|_: &str| Err(LlmError::Connection));
    let workflow = workflow_with(backend.clone());
    let id = workflow.create_session(load_customers(), "", "");

    let result = workflow.analyze_column(&id, "satisfaction").unwrap();
    assert_eq!(
        result.description,
        "This column represents satisfaction data in the dataset."
    );
    assert_eq!(result.suggested_type, SemanticType::Ordinal);
    assert_eq!(result.confidence.ordinal, 0.9);
    assert_eq!(backend.prompts().len(), 2);
}

// ============================================================================
// Workflow With a Scripted LLM
// ============================================================================

#[test]
fn test_scripted_llm_descriptions_and_context() {
    let backend = ResponderBackend::new(|prompt: &str| {
        let column = prompt_column(prompt);
        if is_classification_prompt(prompt) {
            Ok(match column.as_str() {
                "plan" => r#"{"categorical": 0.7, "ordinal": 0.6}"#.to_string(),
                _ => r#"{"identifier": 0.95, "continuous": 0.1}"#.to_string(),
            })
        } else {
            Ok(format!("  Real-world meaning of {}.  ", column))
        }
    });
    let workflow = workflow_with(backend.clone());
    let id = workflow.create_session(
        load_customers(),
        "Plans are billed monthly.",
        "customers_notes.txt",
    );
    workflow
        .set_dataset_info(&id, "Customers", "Subscription customers")
        .unwrap();

    let first = workflow.analyze_column(&id, "customer_id").unwrap();
    assert_eq!(first.description, "Real-world meaning of customer_id.");
    assert_eq!(first.suggested_type, SemanticType::Identifier);
    assert_eq!(first.confidence.identifier, 0.95);

    let second = workflow.analyze_column(&id, "plan").unwrap();
    assert_eq!(second.suggested_type, SemanticType::Categorical);
    assert_eq!(second.detected_type, SemanticType::Categorical);

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 4);

    // Description prompt for the second column lists the first one
    assert!(prompts[2].contains("- customer_id (identifier): Real-world meaning of customer_id."));
    assert!(prompts[2].contains("Dataset Name: Customers"));
    assert!(prompts[2].contains("Additional Information Regarding Dataset:\nPlans are billed monthly."));

    // Classification prompt embeds the description just generated
    assert!(prompts[3].contains("Column description:\nReal-world meaning of plan."));
    assert!(prompts[3].ends_with("Output:"));
}

#[test]
fn test_reanalyze_then_confirm() {
    let backend = ResponderBackend::new(|prompt: &str| {
        if !is_classification_prompt(prompt) {
            Ok("The subscription plan of the customer.".to_string())
        } else if prompt.contains("from basic to premium") {
            Ok(r#"{"ordinal": 0.9, "categorical": 0.4}"#.to_string())
        } else {
            Ok(r#"{"categorical": 0.85}"#.to_string())
        }
    });
    let workflow = workflow_with(backend);
    let id = workflow.create_session(load_customers(), "", "");

    let analysis = workflow.analyze_column(&id, "plan").unwrap();
    assert_eq!(analysis.suggested_type, SemanticType::Categorical);

    let edited = "Subscription tier, ranked from basic to premium.";
    let result = workflow.reanalyze_type(&id, "plan", edited).unwrap();
    assert_eq!(result.suggested_type, SemanticType::Ordinal);

    let context = workflow.analysis_context(&id).unwrap();
    assert_eq!(context.previous_columns[0].description, edited);
    assert_eq!(context.previous_columns[0].semantic_type, SemanticType::Ordinal);

    let confirmed = workflow
        .confirm_column(&id, "plan", Some(result.suggested_type), Some(edited))
        .unwrap();
    assert_eq!(confirmed.semantic_type, SemanticType::Ordinal);
    assert_eq!(confirmed.unique_values, 3);

    let metadata = workflow.metadata(&id).unwrap();
    assert_eq!(metadata.dataset_name, "Unknown Dataset");
    assert_eq!(metadata.columns, vec![confirmed]);
}

#[test]
fn test_malformed_classification_keeps_description() {
    let backend = ResponderBackend::new(|prompt: &str| {
        if is_classification_prompt(prompt) {
            Ok("It is most likely a continuous column.".to_string())
        } else {
            Ok("Age of the customer in years.".to_string())
        }
    });
    let workflow = workflow_with(backend);
    let id = workflow.create_session(load_customers(), "", "");

    let result = workflow.analyze_column(&id, "age").unwrap();
    assert_eq!(result.description, "Age of the customer in years.");
    assert_eq!(result.confidence, ConfidenceMap::fallback(SemanticType::Continuous));
}

#[test]
fn test_gateway_connection_check() {
    let backend = ResponderBackend::new(|prompt: &str| {
        assert_eq!(
            prompt,
            "Hello, please respond with 'RESPONDER is working correctly'."
        );
        Ok("RESPONDER is working correctly".to_string())
    });
    assert!(LlmGateway::new(backend).test_connection());

    let failing = ResponderBackend::new(|_: &str| Err(LlmError::Http(502)));
    let gateway = LlmGateway::new(failing);
    assert!(!gateway.test_connection());
    assert_eq!(gateway.complete_default("anything"), "[HTTP Error 502]");
}

// ============================================================================
// Sessions and Errors
// ============================================================================

#[test]
fn test_structural_errors() {
    let workflow = offline_workflow();
    let id = workflow.create_session(load_customers(), "", "");

    let err = workflow.analyze_column(&id, "unknown").unwrap_err();
    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert!(err.is_input_error());

    let err = workflow.reanalyze_type(&id, "plan", "text").unwrap_err();
    assert_eq!(err.error_code(), "COLUMN_NOT_ANALYZED");

    let err = workflow.metadata("19700101_000000_000000").unwrap_err();
    assert_eq!(err.error_code(), "SESSION_NOT_FOUND");

    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "SESSION_NOT_FOUND");
}

#[test]
fn test_expired_sessions_are_purged() {
    let analyzer = ColumnAnalyzer::new(LlmGateway::disabled("Local"));
    let workflow = MetadataWorkflow::with_store(InMemorySessionStore::new(Duration::ZERO), analyzer);
    let id = workflow.create_session(load_customers(), "", "");

    std::thread::sleep(Duration::from_millis(5));

    assert_eq!(
        workflow.analysis_context(&id).unwrap_err().error_code(),
        "SESSION_NOT_FOUND"
    );
    assert_eq!(workflow.store().len(), 1);
    assert_eq!(workflow.purge_expired(), 1);
    assert!(workflow.store().is_empty());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_loading() {
    let dir = std::env::temp_dir().join(format!("dataset-metadata-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let valid = dir.join("valid.json");
    std::fs::write(
        &valid,
        r#"{
            "llm": {
                "provider": "local",
                "local": {"api_url": "http://localhost:8000/generate", "max_tokens": 128}
            },
            "session": {"ttl_hours": 2}
        }"#,
    )
    .unwrap();

    let config = AppConfig::from_json_file(&valid).unwrap();
    assert_eq!(config.llm.local.max_tokens, 128);
    assert_eq!(config.llm.local.temperature, 0.7);
    assert_eq!(config.llm.openai.model, "gpt-3.5-turbo");
    assert_eq!(config.session.ttl_hours, 2);
    assert_eq!(
        config.llm.local.headers.get("ngrok-skip-browser-warning").map(String::as_str),
        Some("true")
    );

    let invalid = dir.join("invalid.json");
    std::fs::write(&invalid, r#"{"llm": {"openai": {"temperature": 3.5}}}"#).unwrap();
    let err = AppConfig::from_json_file(&invalid).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");

    std::fs::remove_dir_all(&dir).ok();
}
