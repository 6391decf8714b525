//! # SchemaEval
//!
//! Scores AI-generated form schemas for a no-code platform against
//! hand-authored ground truth.
//!
//! Field names and types are compared through alias tables, so `title` and
//! `name` or `STRING` and `TEXT` can count as the same thing. Each prompt
//! gets four metrics and one weighted overall score.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! schemaeval --eval-dir ./eval --output report.csv
//! schemaeval --eval-dir ./eval --offline   # rescore saved generations
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use schemaeval::prelude::*;
//! use std::sync::Arc;
//!
//! let evaluator = SchemaEvaluator::new(Arc::new(AliasResolver::empty()));
//! let prompt = PromptRecord::new("p1", "A library app", 1);
//! let schema = r#"{"appsId": "Library", "formId": "Book", "fields": {
//!     "title": {"fieldId": "title", "fieldType": "TEXT"}
//! }}"#;
//!
//! let result = evaluator.evaluate(&prompt, &GeneratedPayload::Text(schema.into()), schema, 0.0);
//! assert!(result.errors.is_empty());
//! assert!((result.overall_score - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Crate Structure
//!
//! - `schemaeval-core` - Schema documents, field descriptors, alias tables, errors
//! - `schemaeval-scoring` - Field matcher, metric calculators, evaluator
//! - `schemaeval-storage` - Evaluation directory layout and CSV report
//! - `schemaeval-api` - Generators: chat-completions client and offline cache

pub mod config;
pub mod runner;

pub use config::RunConfig;
pub use runner::{evaluate_prompt, Runner};

// Re-export core types
pub use schemaeval_core::{
    AliasResolver, EvaluationResult, FieldDescriptor, FieldMap, FieldType, GeneratedPayload,
    PromptRecord, SchemaDocument,
    Error, Result,
};

// Re-export scoring
pub use schemaeval_scoring::{
    FieldMatcher, MetricCalculator, MetricSuite, ScoreWeights, SchemaEvaluator,
    SemanticPolicy, StructurePolicy,
};

// Re-export storage
pub use schemaeval_storage::{write_report, EvalLayout, RunSummary};

// Re-export API
pub use schemaeval_api::{CachedGenerator, ChatCompletionsClient, Generator, GeneratorConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AliasResolver, EvaluationResult, FieldDescriptor, FieldMap, FieldType, GeneratedPayload,
        PromptRecord, SchemaDocument,
        Error, Result,
        FieldMatcher, ScoreWeights, SchemaEvaluator,
        EvalLayout,
        Generator,
        RunConfig, Runner,
    };
}
