//! Prompt templates for description generation and type classification.
//!
//! Both builders are pure string templating; nothing here touches the network.

use crate::types::{ColumnStatistics, PreviousColumn, SemanticType};

/// Dataset name used when none has been set.
pub const DEFAULT_DATASET_NAME: &str = "Unknown Dataset";

/// Dataset description used when none has been set.
pub const DEFAULT_DATASET_DESCRIPTION: &str = "No description";

/// Dataset-level context shared by every prompt of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetContext {
    pub dataset_name: String,
    pub dataset_description: String,
    /// First rows of the dataset rendered as text.
    pub sample_text: String,
    /// Columns already described earlier in the session.
    pub previous_columns: Vec<PreviousColumn>,
    /// Free text from an auxiliary document; may be empty.
    pub additional_context: String,
}

impl Default for DatasetContext {
    fn default() -> Self {
        Self {
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            dataset_description: DEFAULT_DATASET_DESCRIPTION.to_string(),
            sample_text: String::new(),
            previous_columns: Vec::new(),
            additional_context: String::new(),
        }
    }
}

const DESCRIPTION_PREAMBLE: &str = "You are generating a metadata description for a dataset column.\n\n\
Your task is to write a single, natural-language sentence or short paragraph that clearly describes what this column represents in real-world terms.\n\n\
Instructions:\n\
- ONLY output the column description\n\
- DO NOT include column name, data type, values, statistics, or usage\n\
- DO NOT include any extra explanation, formatting, or commentary\n\
- DO NOT mention or reference sample values from the column\n\
- DO NOT explain how the column is used in modeling or predictions\n\
- DO NOT include how this column might influence decisions, outcomes, or processes\n\
- Focus only on the real-world meaning of the column based on the dataset context (e.g., what it represents about the entity or event)\n\
- Write in a clear and detailed sentence or paragraph\n\n\
Examples:\n\n\
Example 1:\n\
Dataset Name: Recruitment Records\n\
Dataset Description: This dataset contains information about job applicants and their screening outcomes.\n\
Column Name: education_level\n\
Column Type: categorical\n\
Column Stats:\n\
{ 'type': 'object', 'unique_values': 4, 'missing_values': 12 }\n\
Output:\n\
This column represents the highest level of formal education that each job applicant has completed, typically including categories such as high school, undergraduate degrees, and advanced academic qualifications.\n\n\
Example 2:\n\
Dataset Name: E-Commerce Transactions\n\
Dataset Description: Logs of online purchases made through a retail platform.\n\
Column Name: payment_status\n\
Column Type: categorical\n\
Column Stats:\n\
{ 'type': 'object', 'unique_values': 3, 'missing_values': 0 }\n\
Output:\n\
This column reflects the final payment condition associated with each transaction, indicating whether the purchase was successfully completed, left pending, or encountered an issue during processing.\n\n";

const DESCRIPTION_FINAL_INSTRUCTION: &str = "Now write the real-world description of this column only. \
Do not include any stats or sample values from the dataset.";

const CLASSIFICATION_PREAMBLE: &str = "You are analyzing tabular data columns and classifying them into semantic types.\n\
Possible types are: binary, categorical, ordinal, continuous, identifier, free_text.\n\
Respond with a JSON object where each type is a key and the value is your confidence score (0-1).\n\
You MUST include all keys, even if the confidence is 0.\n\
Do not include any explanation.\n\n";

/// One worked example per semantic type: (heading, column, description, stats, scores).
const CLASSIFICATION_EXAMPLES: [(&str, &str, &str, &str, [f64; 6]); 6] = [
    (
        "Binary",
        "gender",
        "This column represents the biological sex of individuals",
        "{ 'type': 'object', 'unique_values': 2, 'sample_unique_values': ['Male', 'Female'], 'missing_values': 0 }",
        [1.0, 0.8, 0.0, 0.0, 0.0, 0.0],
    ),
    (
        "Categorical",
        "payment_method",
        "This column represents the method used to complete payment for transactions",
        "{ 'type': 'object', 'unique_values': 4, 'sample_unique_values': ['Credit Card', 'PayPal', 'Bank Transfer', 'Cash'], 'missing_values': 5 }",
        [0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    ),
    (
        "Ordinal",
        "satisfaction_level",
        "This column represents customer satisfaction ratings in ordered categories",
        "{ 'type': 'object', 'unique_values': 4, 'sample_unique_values': ['Low', 'Medium', 'High', 'Very High'], 'missing_values': 3 }",
        [0.0, 0.5, 1.0, 0.0, 0.0, 0.0],
    ),
    (
        "Continuous",
        "age",
        "This column represents the age of individuals in years",
        "{ 'type': 'int64', 'unique_values': 43, 'mean': 36.7, 'std': 4.5, 'min': 21, 'max': 60, 'missing_values': 0 }",
        [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    ),
    (
        "Identifier",
        "CustomerId",
        "This column represents unique customer identification numbers",
        "{ 'type': 'int64', 'unique_values': 10000, 'sample_unique_values': [15668009, 15732778, 15605264, 15752809], 'missing_values': 0, 'mean': 15690940.57, 'std': 71936.18, 'min': 15565701, 'max': 15815690 }",
        [0.0, 0.0, 0.0, 0.1, 1.0, 0.0],
    ),
    (
        "Free Text",
        "customer_comments",
        "This column contains open-ended customer feedback and comments about products or services",
        "{ 'type': 'object', 'unique_values': 9572, 'sample_unique_values': ['Loved the product, will buy again.', 'Service was poor and delivery was late.', 'Excellent value for money!', 'Would not recommend.'], 'missing_values': 412 }",
        [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
    ),
];

/// Renders the two prompt kinds.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking for a one-sentence, stats-free description of a column.
    pub fn description_prompt(
        column_name: &str,
        stats: &ColumnStatistics,
        detected_type: SemanticType,
        context: &DatasetContext,
    ) -> String {
        let mut prompt = String::from(DESCRIPTION_PREAMBLE);

        prompt.push_str(&format!(
            "Dataset Name: {}\nDataset Description: {}\nDataset Sample:\n{}\n\n",
            context.dataset_name, context.dataset_description, context.sample_text
        ));

        prompt.push_str("Previously analyzed columns (name, type, description):\n");
        prompt.push_str(&render_previous_columns(&context.previous_columns));
        prompt.push_str("\n\n");

        prompt.push_str(&format!(
            "Column to describe:\nColumn Name: {}\nProbable Column Type: {}\nColumn Stats:\n{}\n\n",
            column_name,
            detected_type,
            render_stats(stats)
        ));

        push_additional_context(&mut prompt, &context.additional_context);
        prompt.push_str(DESCRIPTION_FINAL_INSTRUCTION);
        prompt
    }

    /// Prompt asking for a six-key JSON confidence map. Ends with `Output:`.
    pub fn classification_prompt(
        column_name: &str,
        description: &str,
        stats: &ColumnStatistics,
        detected_type: SemanticType,
        context: &DatasetContext,
    ) -> String {
        let mut prompt = String::from(CLASSIFICATION_PREAMBLE);

        for (i, (heading, name, example_description, example_stats, scores)) in
            CLASSIFICATION_EXAMPLES.iter().enumerate()
        {
            prompt.push_str(&format!(
                "Example {} ({}):\nColumn Name: {}\nColumn Description: {}\nStats:\n{}\nOutput:\n{}\n\n",
                i + 1,
                heading,
                name,
                example_description,
                example_stats,
                render_example_scores(scores)
            ));
        }

        prompt.push_str(&format!(
            "Now analyze the following column:\n\
             Dataset name:\n{}\n\
             Dataset description:\n{}\n\
             Dataset Sample (first 5 rows):\n{}\n\n\
             Column Name: {}\n\
             Column description:\n{}\n\
             Probable column type:\n{}\n\
             Column statistics:\n{}\n\n",
            context.dataset_name,
            context.dataset_description,
            context.sample_text,
            column_name,
            description,
            detected_type,
            render_stats(stats)
        ));

        push_additional_context(&mut prompt, &context.additional_context);
        prompt.push_str("Output:");
        prompt
    }
}

/// `- name (type): description` per line.
fn render_previous_columns(columns: &[PreviousColumn]) -> String {
    columns
        .iter()
        .map(|c| format!("- {} ({}): {}", c.name, c.semantic_type, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Statistics as indented JSON.
fn render_stats(stats: &ColumnStatistics) -> String {
    serde_json::to_string_pretty(stats).unwrap_or_else(|_| format!("{:?}", stats))
}

fn render_example_scores(scores: &[f64; 6]) -> String {
    let lines: Vec<String> = SemanticType::ALL
        .iter()
        .zip(scores)
        .map(|(label, score)| format!("  \"{}\": {:.1}", label, score))
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

fn push_additional_context(prompt: &mut String, additional_context: &str) {
    if !additional_context.trim().is_empty() {
        prompt.push_str(&format!(
            "Additional Information Regarding Dataset:\n{}\n",
            additional_context
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoricalSummary, NumericSummary, StatsSummary};

    fn categorical_stats() -> ColumnStatistics {
        ColumnStatistics {
            storage_type: "str".to_string(),
            unique_count: 2,
            sample_unique_values: vec!["M".to_string(), "F".to_string()],
            missing_count: 0,
            summary: StatsSummary::Categorical(CategoricalSummary {
                mode_value: Some("M".to_string()),
                mode_frequency: Some(3),
            }),
        }
    }

    fn context() -> DatasetContext {
        DatasetContext {
            dataset_name: "Customer Survey".to_string(),
            dataset_description: "Responses to a yearly survey".to_string(),
            sample_text: "gender | age\nM | 34".to_string(),
            previous_columns: vec![
                PreviousColumn {
                    name: "age".to_string(),
                    semantic_type: SemanticType::Continuous,
                    description: "Age of the respondent in years.".to_string(),
                },
                PreviousColumn {
                    name: "region".to_string(),
                    semantic_type: SemanticType::Categorical,
                    description: "Sales region of the respondent.".to_string(),
                },
            ],
            additional_context: String::new(),
        }
    }

    // ==================== Description prompt ====================

    #[test]
    fn test_description_prompt_contents() {
        let prompt = PromptBuilder::description_prompt(
            "gender",
            &categorical_stats(),
            SemanticType::Binary,
            &context(),
        );

        assert!(prompt.contains("DO NOT include column name, data type, values, statistics, or usage"));
        assert!(prompt.contains("DO NOT explain how the column is used in modeling or predictions"));
        assert!(prompt.contains("Column Name: education_level"));
        assert!(prompt.contains("Column Name: payment_status"));
        assert!(prompt.contains("Dataset Name: Customer Survey"));
        assert!(prompt.contains("Dataset Sample:\ngender | age\nM | 34"));
        assert!(prompt.contains(
            "- age (continuous): Age of the respondent in years.\n- region (categorical): Sales region of the respondent."
        ));
        assert!(prompt.contains("Column Name: gender\nProbable Column Type: binary"));
        assert!(prompt.contains("\"top_value\": \"M\""));
        assert!(prompt.contains("\"unique_values\": 2"));
        assert!(!prompt.contains("Additional Information Regarding Dataset"));
        assert!(prompt.ends_with(DESCRIPTION_FINAL_INSTRUCTION));
    }

    #[test]
    fn test_description_prompt_additional_context() {
        let mut ctx = context();
        ctx.additional_context = "Survey run by the marketing team in 2023.".to_string();

        let prompt =
            PromptBuilder::description_prompt("gender", &categorical_stats(), SemanticType::Binary, &ctx);
        assert!(prompt.contains(
            "Additional Information Regarding Dataset:\nSurvey run by the marketing team in 2023.\n"
        ));
        assert!(prompt.ends_with(DESCRIPTION_FINAL_INSTRUCTION));
    }

    #[test]
    fn test_whitespace_only_context_is_skipped() {
        let mut ctx = context();
        ctx.additional_context = "  \n ".to_string();

        let prompt =
            PromptBuilder::description_prompt("gender", &categorical_stats(), SemanticType::Binary, &ctx);
        assert!(!prompt.contains("Additional Information Regarding Dataset"));
    }

    #[test]
    fn test_description_prompt_no_previous_columns() {
        let ctx = DatasetContext::default();
        let prompt =
            PromptBuilder::description_prompt("x", &categorical_stats(), SemanticType::Categorical, &ctx);
        assert!(prompt.contains("Dataset Name: Unknown Dataset"));
        assert!(prompt.contains("Dataset Description: No description"));
        assert!(prompt.contains("(name, type, description):\n\n\nColumn to describe:"));
    }

    // ==================== Classification prompt ====================

    #[test]
    fn test_classification_prompt_contents() {
        let stats = ColumnStatistics {
            storage_type: "f64".to_string(),
            unique_count: 40,
            sample_unique_values: vec!["1.5".to_string()],
            missing_count: 2,
            summary: StatsSummary::Numeric(NumericSummary {
                mean: Some(3.0),
                std: None,
                min: Some(1.5),
                max: Some(9.0),
            }),
        };

        let prompt = PromptBuilder::classification_prompt(
            "income",
            "Yearly household income.",
            &stats,
            SemanticType::Continuous,
            &context(),
        );

        assert!(prompt.starts_with("You are analyzing tabular data columns"));
        assert!(prompt.contains(
            "Possible types are: binary, categorical, ordinal, continuous, identifier, free_text."
        ));
        for heading in [
            "Example 1 (Binary)",
            "Example 2 (Categorical)",
            "Example 3 (Ordinal)",
            "Example 4 (Continuous)",
            "Example 5 (Identifier)",
            "Example 6 (Free Text)",
        ] {
            assert!(prompt.contains(heading), "missing {}", heading);
        }
        assert!(prompt.contains(
            "{\n  \"binary\": 1.0,\n  \"categorical\": 0.8,\n  \"ordinal\": 0.0,\n  \"continuous\": 0.0,\n  \"identifier\": 0.0,\n  \"free_text\": 0.0\n}"
        ));
        assert!(prompt.contains("Column Name: income\nColumn description:\nYearly household income."));
        assert!(prompt.contains("Probable column type:\ncontinuous"));
        assert!(prompt.contains("\"std\": null"));
        assert!(prompt.contains("\"mean\": 3.0"));
        assert!(prompt.ends_with("Output:"));
        assert!(!prompt.ends_with("\nOutput:\n"));
    }

    #[test]
    fn test_classification_prompt_additional_context_before_output() {
        let mut ctx = context();
        ctx.additional_context = "Codebook attached.".to_string();
        let prompt = PromptBuilder::classification_prompt(
            "gender",
            "Sex of the respondent.",
            &categorical_stats(),
            SemanticType::Binary,
            &ctx,
        );
        assert!(prompt.ends_with("Additional Information Regarding Dataset:\nCodebook attached.\nOutput:"));
    }

    #[test]
    fn test_example_scores_format() {
        assert_eq!(
            render_example_scores(&[0.0, 0.0, 0.0, 0.1, 1.0, 0.0]),
            "{\n  \"binary\": 0.0,\n  \"categorical\": 0.0,\n  \"ordinal\": 0.0,\n  \"continuous\": 0.1,\n  \"identifier\": 1.0,\n  \"free_text\": 0.0\n}"
        );
    }
}
