//! Prompt records and per-prompt evaluation results

use serde::{Deserialize, Serialize};

/// One entry of `prompts.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRecord {
    pub id: String,
    pub prompt: String,
    #[serde(default = "default_schema_count")]
    pub expected_schemas_count: usize,
    #[serde(default)]
    pub description: String,
}

fn default_schema_count() -> usize {
    1
}

impl PromptRecord {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, expected_schemas_count: usize) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            expected_schemas_count,
            description: String::new(),
        }
    }
}

/// What the generation step handed to the evaluator
///
/// A failed generation is carried as a message so it becomes an entry in
/// the result's `errors` instead of aborting the run.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedPayload {
    Text(String),
    Unavailable(String),
}

/// Scores for one prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub prompt_id: String,
    pub schema_count_match: bool,
    pub field_coverage: f64,
    pub type_accuracy: f64,
    pub structure_score: f64,
    pub semantic_score: f64,
    pub overall_score: f64,
    /// Empty on success
    pub errors: Vec<String>,
    pub generation_time_ms: f64,
    /// Number of documents the generated payload held; 0 when it never parsed
    #[serde(default)]
    pub generated_schemas: usize,
    /// formIds of generated documents no expected document claimed
    #[serde(default)]
    pub extra_forms: Vec<String>,
}

impl EvaluationResult {
    /// A zeroed result carrying the given errors
    pub fn failed(prompt_id: impl Into<String>, errors: Vec<String>, generation_time_ms: f64) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            schema_count_match: false,
            field_coverage: 0.0,
            type_accuracy: 0.0,
            structure_score: 0.0,
            semantic_score: 0.0,
            overall_score: 0.0,
            errors,
            generation_time_ms,
            generated_schemas: 0,
            extra_forms: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }
}
