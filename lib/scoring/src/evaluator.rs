//! Schema evaluator
//!
//! Scores one prompt: normalizes both payloads, pairs generated documents
//! with expected documents, runs the field matcher and the metric suite on
//! every pair, and averages the per-pair metrics into one result.
//!
//! ```text
//! Pending ──> SchemasLoaded ──> Matched ──> Scored ──> Done
//!    │              │              │           │
//!    └──────────────┴──────────────┴───────────┴──> Failed
//! ```
//!
//! A failure never escapes: it becomes a zeroed [`EvaluationResult`] whose
//! `errors` describe what went wrong.

use crate::lexical::{tokenize, TokenSet};
use crate::matcher::FieldMatcher;
use crate::metrics::{MetricContext, MetricScores, MetricSuite};
use crate::weights::ScoreWeights;
use schemaeval_core::{
    parse_documents, AliasResolver, Error, EvaluationResult, GeneratedPayload, PayloadOrigin,
    PromptRecord, SchemaDocument,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifecycle of one prompt's evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationState {
    Pending,
    SchemasLoaded,
    Matched,
    Scored,
    Done,
    Failed,
}

impl EvaluationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EvaluationState::Done | EvaluationState::Failed)
    }
}

struct Run<'p> {
    prompt_id: &'p str,
    state: EvaluationState,
}

impl<'p> Run<'p> {
    fn new(prompt_id: &'p str) -> Self {
        Self { prompt_id, state: EvaluationState::Pending }
    }

    fn advance(&mut self, next: EvaluationState) {
        debug_assert!(!self.state.is_terminal(), "transition out of terminal state");
        debug!("[{}] {:?} -> {:?}", self.prompt_id, self.state, next);
        self.state = next;
    }
}

/// Expected documents paired with generated documents
#[derive(Debug, Clone, Default)]
pub struct DocumentPairing<'a> {
    /// One entry per expected document, in expected order
    pub pairs: Vec<(&'a SchemaDocument, Option<&'a SchemaDocument>)>,
    /// Generated documents no expected document claimed
    pub extras: Vec<&'a SchemaDocument>,
}

/// Normalized keywords of a prompt's text and description
pub fn domain_keywords(prompt: &PromptRecord) -> TokenSet {
    let mut keywords = tokenize(&prompt.prompt);
    keywords.extend(tokenize(&prompt.description));
    keywords
}

/// Scores generated schemas against ground truth, one prompt at a time
///
/// Holds only read-only state and can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct SchemaEvaluator {
    resolver: Arc<AliasResolver>,
    weights: ScoreWeights,
    metrics: MetricSuite,
}

impl SchemaEvaluator {
    pub fn new(resolver: Arc<AliasResolver>) -> Self {
        Self {
            resolver,
            weights: ScoreWeights::default(),
            metrics: MetricSuite::default(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricSuite) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Evaluate one prompt from raw payloads
    pub fn evaluate(
        &self,
        prompt: &PromptRecord,
        generated: &GeneratedPayload,
        expected_raw: &str,
        generation_time_ms: f64,
    ) -> EvaluationResult {
        self.evaluate_traced(prompt, generated, expected_raw, generation_time_ms).0
    }

    /// Like [`evaluate`](Self::evaluate), also returning the terminal state reached
    pub fn evaluate_traced(
        &self,
        prompt: &PromptRecord,
        generated: &GeneratedPayload,
        expected_raw: &str,
        generation_time_ms: f64,
    ) -> (EvaluationResult, EvaluationState) {
        let mut run = Run::new(&prompt.id);
        let mut errors = Vec::new();

        let expected = match load_expected(expected_raw) {
            Ok(docs) => Some(docs),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };

        let generated = match generated {
            GeneratedPayload::Text(raw) => match load_generated(&prompt.id, raw) {
                Ok(docs) => Some(docs),
                Err(e) => {
                    errors.push(e.to_string());
                    None
                }
            },
            GeneratedPayload::Unavailable(message) => {
                errors.push(Error::Generation(message.clone()).to_string());
                None
            }
        };

        let (Some(expected), Some(generated)) = (expected, generated) else {
            run.advance(EvaluationState::Failed);
            for error in &errors {
                warn!("[{}] {}", prompt.id, error);
            }
            return (
                EvaluationResult::failed(prompt.id.clone(), errors, generation_time_ms),
                run.state,
            );
        };
        run.advance(EvaluationState::SchemasLoaded);

        let result = self.score_documents(&mut run, prompt, &generated, &expected, generation_time_ms);
        (result, run.state)
    }

    fn score_documents(
        &self,
        run: &mut Run<'_>,
        prompt: &PromptRecord,
        generated: &[SchemaDocument],
        expected: &[SchemaDocument],
        generation_time_ms: f64,
    ) -> EvaluationResult {
        let pairing = self.pair_documents(generated, expected);
        run.advance(EvaluationState::Matched);

        let keywords = domain_keywords(prompt);
        let per_pair: Vec<MetricScores> = pairing
            .pairs
            .iter()
            .map(|(exp, candidate)| match candidate {
                Some(candidate) => self.score_pair(exp, candidate, &keywords),
                None => self.score_unpaired(exp, &keywords),
            })
            .collect();
        let metrics = MetricScores::mean(&per_pair).clamped();
        run.advance(EvaluationState::Scored);

        let result = EvaluationResult {
            prompt_id: prompt.id.clone(),
            schema_count_match: generated.len() == prompt.expected_schemas_count,
            field_coverage: metrics.field_coverage,
            type_accuracy: metrics.type_accuracy,
            structure_score: metrics.structure_score,
            semantic_score: metrics.semantic_score,
            overall_score: metrics.overall(&self.weights),
            errors: Vec::new(),
            generation_time_ms,
            generated_schemas: generated.len(),
            extra_forms: pairing.extras.iter().map(|d| d.form_id.clone()).collect(),
        };
        run.advance(EvaluationState::Done);
        result
    }

    /// Pair documents by canonical `formId`
    ///
    /// Each expected document claims the first unclaimed generated document
    /// with the same canonical name, in generated order. Expected documents
    /// claim in order of their normalized `formId`. A lone expected document
    /// and a lone generated document pair by position when their names
    /// disagree.
    pub fn pair_documents<'a>(
        &self,
        generated: &'a [SchemaDocument],
        expected: &'a [SchemaDocument],
    ) -> DocumentPairing<'a> {
        let canonical = |d: &SchemaDocument| self.resolver.canonical_field(&d.form_id);

        let mut claimed = vec![false; generated.len()];
        let mut assignment: Vec<Option<usize>> = vec![None; expected.len()];

        let mut order: Vec<usize> = (0..expected.len()).collect();
        order.sort_by_key(|&i| (expected[i].form_id.trim().to_lowercase(), expected[i].form_id.clone(), i));

        for slot in order {
            let name = canonical(&expected[slot]);
            if let Some(idx) =
                (0..generated.len()).find(|&i| !claimed[i] && canonical(&generated[i]) == name)
            {
                claimed[idx] = true;
                assignment[slot] = Some(idx);
            }
        }
        if expected.len() == 1 && generated.len() == 1 && assignment[0].is_none() {
            claimed[0] = true;
            assignment[0] = Some(0);
        }

        DocumentPairing {
            pairs: expected
                .iter()
                .zip(assignment)
                .map(|(exp, idx)| (exp, idx.map(|i| &generated[i])))
                .collect(),
            extras: generated
                .iter()
                .zip(claimed)
                .filter(|(_, taken)| !taken)
                .map(|(doc, _)| doc)
                .collect(),
        }
    }

    /// All four metrics for one paired document
    pub fn score_pair(
        &self,
        expected: &SchemaDocument,
        generated: &SchemaDocument,
        domain_keywords: &TokenSet,
    ) -> MetricScores {
        let alignment = FieldMatcher::new(&self.resolver).align(&generated.fields, &expected.fields);
        let ctx = MetricContext {
            alignment: &alignment,
            generated,
            expected,
            resolver: &self.resolver,
            domain_keywords,
        };
        self.metrics.score(&ctx)
    }

    /// An expected document nothing was generated for: coverage of its fields only
    fn score_unpaired(&self, expected: &SchemaDocument, domain_keywords: &TokenSet) -> MetricScores {
        let nothing = SchemaDocument::default();
        let alignment = FieldMatcher::new(&self.resolver).align(&nothing.fields, &expected.fields);
        let ctx = MetricContext {
            alignment: &alignment,
            generated: &nothing,
            expected,
            resolver: &self.resolver,
            domain_keywords,
        };
        MetricScores::unpaired(self.metrics.coverage.score(&ctx)).clamped()
    }
}

fn load_expected(raw: &str) -> schemaeval_core::Result<Vec<SchemaDocument>> {
    let docs = parse_documents(raw, PayloadOrigin::GroundTruth)?;
    if docs.is_empty() {
        return Err(Error::shape(PayloadOrigin::GroundTruth, "ground truth contains no schemas"));
    }
    for doc in &docs {
        doc.validate(PayloadOrigin::GroundTruth)?;
    }
    Ok(docs)
}

fn load_generated(prompt_id: &str, raw: &str) -> schemaeval_core::Result<Vec<SchemaDocument>> {
    let docs = parse_documents(raw, PayloadOrigin::Generated)?;
    for doc in &docs {
        for warning in doc.validate(PayloadOrigin::Generated)? {
            warn!("[{}] {}", prompt_id, warning);
        }
    }
    if let Some(first) = docs.first() {
        if docs.iter().any(|d| d.apps_id != first.apps_id) {
            warn!("[{}] generated schemas do not share one appsId", prompt_id);
        }
    }
    Ok(docs)
}
