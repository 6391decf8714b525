//! # SchemaEval Scoring
//!
//! The scoring engine: aligns a generated schema with its ground truth and
//! measures how close it came.
//!
//! ## Features
//!
//! - **Field Matcher**: Alias-aware 1:1 field alignment, recursing into EMBED fields
//! - **Metric Calculators**: Field coverage, type accuracy, structure and semantic scores
//! - **Score Weights**: Fixed-weight convex combination into one overall score
//! - **Schema Evaluator**: Per-prompt orchestration that never fails loudly
//!
//! ## Example
//!
//! ```rust
//! use schemaeval_core::{AliasIndex, AliasResolver, GeneratedPayload, PromptRecord};
//! use schemaeval_scoring::SchemaEvaluator;
//! use std::sync::Arc;
//!
//! let fields = AliasIndex::from_json_str(r#"{"title": ["name"]}"#).unwrap();
//! let resolver = Arc::new(AliasResolver::new(fields, AliasIndex::default()));
//! let evaluator = SchemaEvaluator::new(resolver);
//!
//! let expected = r#"[{"formId": "Book", "fields": {
//!     "title": {"fieldId": "title", "fieldType": "TEXT", "required": true}
//! }}]"#;
//! let generated = r#"{"formId": "Book", "fields": {
//!     "name": {"fieldId": "name", "fieldType": "TEXT", "required": true}
//! }}"#;
//!
//! let prompt = PromptRecord::new("books", "A library catalogue of books", 1);
//! let result = evaluator.evaluate(&prompt, &GeneratedPayload::Text(generated.into()), expected, 0.0);
//! assert_eq!(result.field_coverage, 1.0);
//! assert_eq!(result.type_accuracy, 1.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Alias     │────>│   Field     │────>│  Alignment  │
//! │  Resolver   │     │  Matcher    │     │  (pairs)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!       ┌─────────────┐     ┌─────────────┐      │
//!       │  Evaluation │<────│   Metric    │<─────┘
//!       │   Result    │     │ Calculators │
//!       └─────────────┘     └─────────────┘
//! ```

pub mod lexical;
pub mod matcher;
pub mod metrics;
pub mod weights;
pub mod evaluator;

// Re-export main types for convenience
pub use matcher::{Alignment, FieldMatcher, FieldPair, MatchedField};
pub use metrics::{
    FieldCoverage,
    MetricCalculator,
    MetricContext,
    MetricScores,
    MetricSuite,
    SemanticPolicy,
    SemanticScore,
    StructurePolicy,
    StructureScore,
    TypeAccuracy,
};
pub use weights::{ScoreWeights, WeightsError};
pub use evaluator::{domain_keywords, DocumentPairing, EvaluationState, SchemaEvaluator};
