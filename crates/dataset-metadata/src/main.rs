//! CLI entry point for dataset metadata generation.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dataset_metadata::analysis::DEFAULT_DATASET_DESCRIPTION;
use dataset_metadata::utils::truncate_str;
use dataset_metadata::{
    AppConfig, ColumnAnalysisResult, ColumnAnalyzer, ConfidenceMap, Dataset, DatasetMetadata,
    LlmGateway, LlmProvider, MetadataWorkflow,
};
use dotenv::dotenv;
use std::path::Path;
use tracing::{error, info, warn};

/// CLI-compatible LLM provider enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    /// OpenAI chat completions API (needs OPENAI_API_KEY)
    Openai,
    /// Self-hosted text generation endpoint
    Local,
}

impl From<CliProvider> for LlmProvider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => LlmProvider::OpenAi,
            CliProvider::Local => LlmProvider::Local,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "LLM-assisted column metadata for CSV datasets",
    long_about = "Describes every column of a CSV dataset and classifies it as binary, \
                  categorical, ordinal, continuous, identifier or free_text.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  OPENAI_API_KEY    API key for OpenAI (used when the config has none)\n\n\
                  EXAMPLES:\n  \
                  # Describe a dataset with the default provider\n  \
                  dataset-metadata -i customers.csv --name Customers -o metadata.json\n\n  \
                  # Use a self-hosted model configured in config.json\n  \
                  dataset-metadata -i customers.csv -c config.json --provider local\n\n  \
                  # Rule-based only (no LLM)\n  \
                  dataset-metadata -i customers.csv --no-llm --json\n\n  \
                  # Check that the LLM answers\n  \
                  dataset-metadata --check-connection"
)]
struct Args {
    /// Path to the CSV file to describe
    #[arg(short, long, required_unless_present = "check_connection")]
    input: Option<String>,

    /// Dataset name used in prompts and in the metadata
    ///
    /// Defaults to the input file name without extension
    #[arg(long)]
    name: Option<String>,

    /// Short description of the dataset
    #[arg(long)]
    description: Option<String>,

    /// Plain-text file with additional information about the dataset
    #[arg(long)]
    context_file: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// LLM provider, overriding the configuration file
    #[arg(long, value_enum)]
    provider: Option<CliProvider>,

    /// Disable the LLM (rule-based descriptions and types only)
    #[arg(long)]
    no_llm: bool,

    /// Send a short test prompt to the LLM and report whether it answered
    #[arg(long)]
    check_connection: bool,

    /// Write the metadata JSON to this file
    #[arg(short, long)]
    output: Option<String>,

    /// Output JSON to stdout instead of the summary table
    ///
    /// Disables all logs; only the metadata JSON is printed.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    ///
    /// Defaults to the configured logging level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Only show warnings, errors and the final result
    #[arg(short, long)]
    quiet: bool,

    /// Log every prompt sent to the LLM (at debug level)
    #[arg(long)]
    show_prompts: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file (OPENAI_API_KEY)
    dotenv().ok();

    let config = load_config(&args)?;
    init_logging(
        args.log_level.as_deref().unwrap_or(config.logging.level.as_str()),
        args.quiet,
        args.json,
    );

    let gateway = build_gateway(&args, &config)?;

    if args.check_connection {
        check_connection(&gateway)?;
        if args.input.is_none() {
            return Ok(());
        }
    }

    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("--input is required"))?;
    if !Path::new(input).exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }

    info!("Loading dataset from: {}", input);
    let dataset = Dataset::from_csv(input)?;
    info!("Dataset loaded successfully: {:?}", dataset.shape());

    let (extra_content, extra_filename) = match &args.context_file {
        Some(path) => (std::fs::read_to_string(path)?, file_name(path)),
        None => (String::new(), String::new()),
    };

    let workflow = MetadataWorkflow::new(ColumnAnalyzer::new(gateway), &config.session);
    let column_names = dataset.column_names();
    let session_id = workflow.create_session(dataset, extra_content, extra_filename);

    workflow.set_dataset_info(
        &session_id,
        args.name.clone().unwrap_or_else(|| file_stem(input)),
        args.description
            .clone()
            .unwrap_or_else(|| DEFAULT_DATASET_DESCRIPTION.to_string()),
    )?;

    let analyses = analyze_columns(&workflow, &session_id, &column_names);
    workflow.auto_confirm_all(&session_id)?;
    let metadata = workflow.metadata(&session_id)?;

    if let Some(ref output) = args.output {
        std::fs::write(output, serde_json::to_string_pretty(&metadata)?)?;
        info!("Metadata written to: {}", output);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    print_summary_table(&metadata, &analyses);
    Ok(())
}

/// Load the configuration file (or defaults) and apply CLI overrides.
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_json_file(path)
            .map_err(|e| anyhow!("Failed to load config '{}': {}", path, e))?,
        None => AppConfig::default(),
    };

    if let Some(provider) = args.provider {
        config.llm.provider = provider.into();
    }
    if args.show_prompts {
        config.logging.show_prompts = true;
    }

    // The endpoint only matters when the LLM is used
    if !args.no_llm {
        config.validate()?;
    }
    Ok(config)
}

fn build_gateway(args: &Args, config: &AppConfig) -> Result<LlmGateway> {
    if args.no_llm {
        info!("Running in rule-based mode (LLM disabled)");
        return Ok(LlmGateway::disabled(config.llm.provider.as_str()));
    }

    info!("Using {}", config.llm.describe());
    LlmGateway::from_config(&config.llm, config.logging.show_prompts)
}

fn check_connection(gateway: &LlmGateway) -> Result<()> {
    info!("Testing connection to {}", gateway.backend_name());
    if gateway.test_connection() {
        println!("{} connection: OK", gateway.backend_name());
        Ok(())
    } else {
        error!("{} did not answer the test prompt", gateway.backend_name());
        Err(anyhow!("{} connection test failed", gateway.backend_name()))
    }
}

/// Analyze every column in dataset order.
///
/// A column that cannot be analyzed is skipped with a warning; it is still
/// confirmed later with default metadata.
fn analyze_columns(
    workflow: &MetadataWorkflow,
    session_id: &str,
    column_names: &[String],
) -> Vec<ColumnAnalysisResult> {
    let total = column_names.len();
    let mut analyses = Vec::with_capacity(total);

    for (i, name) in column_names.iter().enumerate() {
        info!("[{}/{}] {}", i + 1, total, name);
        match workflow.analyze_column(session_id, name) {
            Ok(result) => analyses.push(result),
            Err(e) => warn!("Skipping column '{}': {}", name, e),
        }
    }

    analyses
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Print the confirmed metadata as a table.
///
/// Uses `println!` rather than logging: this is the command's output.
fn print_summary_table(metadata: &DatasetMetadata, analyses: &[ColumnAnalysisResult]) {
    println!();
    println!("{}", "=".repeat(100));
    println!("{}", metadata.dataset_name);
    println!("{}", metadata.dataset_description);
    println!("{}", "=".repeat(100));
    println!();

    println!(
        "{:<20} {:<12} {:<12} {:<6} {:<8} {:<8} {}",
        "Column", "Detected", "Type", "Conf", "Missing", "Unique", "Description"
    );
    println!("{}", "-".repeat(100));

    let mut fallbacks = 0;
    for column in &metadata.columns {
        let analysis = analyses.iter().find(|a| a.column_name == column.name);

        let (detected, confidence) = match analysis {
            Some(a) => {
                let rule_based = a.confidence == ConfidenceMap::fallback(a.detected_type);
                if rule_based {
                    fallbacks += 1;
                }
                let score = a.confidence.get(a.suggested_type);
                (
                    a.detected_type.to_string(),
                    format!("{:.2}{}", score, if rule_based { "*" } else { "" }),
                )
            }
            None => ("-".to_string(), "-".to_string()),
        };

        println!(
            "{:<20} {:<12} {:<12} {:<6} {:<8} {:<8} {}",
            truncate_str(&column.name, 19),
            detected,
            column.semantic_type,
            confidence,
            column.missing_values,
            column.unique_values,
            truncate_str(&column.description, 60)
        );
    }
    println!();

    if fallbacks > 0 {
        println!("* rule-based fallback ({} of {} columns)", fallbacks, metadata.columns.len());
    }
    println!("Use --json for machine-readable output");
    println!("Use -o <file> to save the metadata JSON");
    println!("{}", "=".repeat(100));
}
