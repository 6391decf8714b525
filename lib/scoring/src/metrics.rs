//! Metric calculators
//!
//! Each calculator scores one aligned schema pair and returns a value in
//! [0.0, 1.0]. Calculators know nothing about how their outputs are weighted.

use crate::lexical::{identifier_tokens, jaccard, share_in, tokenize, TokenSet};
use crate::matcher::Alignment;
use crate::weights::ScoreWeights;
use schemaeval_core::{is_well_formed_ref, AliasResolver, FieldDescriptor, FieldType, SchemaDocument};
use serde::{Deserialize, Serialize};

/// Everything a calculator may look at for one schema pair
#[derive(Debug, Clone, Copy)]
pub struct MetricContext<'a> {
    pub alignment: &'a Alignment<'a>,
    pub generated: &'a SchemaDocument,
    pub expected: &'a SchemaDocument,
    pub resolver: &'a AliasResolver,
    /// Normalized keywords of the prompt the schemas were generated for
    pub domain_keywords: &'a TokenSet,
}

pub trait MetricCalculator: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, ctx: &MetricContext<'_>) -> f64;
}

/// Matched expected fields over all expected fields
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCoverage;

impl MetricCalculator for FieldCoverage {
    fn name(&self) -> &'static str {
        "field_coverage"
    }

    fn score(&self, ctx: &MetricContext<'_>) -> f64 {
        let expected = ctx.alignment.expected_count();
        if expected == 0 {
            // Vacuously satisfied
            return 1.0;
        }
        ctx.alignment.matched_count() as f64 / expected as f64
    }
}

/// Matched pairs whose canonical types agree over all matched pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeAccuracy;

impl MetricCalculator for TypeAccuracy {
    fn name(&self) -> &'static str {
        "type_accuracy"
    }

    fn score(&self, ctx: &MetricContext<'_>) -> f64 {
        let mut matched = 0usize;
        let mut correct = 0usize;
        for (expected, generated) in ctx.alignment.matched() {
            matched += 1;
            if ctx.resolver.canonical_type(&expected.field_type)
                == ctx.resolver.canonical_type(&generated.field_type)
            {
                correct += 1;
            }
        }
        if matched == 0 {
            return 0.0;
        }
        correct as f64 / matched as f64
    }
}

/// Partial-credit weights for the constraint checks of [`StructureScore`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StructurePolicy {
    pub required: f64,
    pub unique: f64,
    pub ref_presence: f64,
    pub ref_well_formed: f64,
    pub money_fraction_digits: f64,
    pub money_currency_code: f64,
}

impl Default for StructurePolicy {
    fn default() -> Self {
        Self {
            required: 1.0,
            unique: 1.0,
            ref_presence: 1.0,
            ref_well_formed: 1.0,
            money_fraction_digits: 0.5,
            money_currency_code: 0.5,
        }
    }
}

/// Agreement on constraint and relationship metadata, averaged over matched pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureScore {
    pub policy: StructurePolicy,
}

impl StructureScore {
    pub fn new(policy: StructurePolicy) -> Self {
        Self { policy }
    }

    /// Credit in [0, 1] for one matched pair
    pub fn pair_credit(
        &self,
        resolver: &AliasResolver,
        expected: &FieldDescriptor,
        generated: &FieldDescriptor,
    ) -> f64 {
        let p = &self.policy;
        let mut earned = 0.0;
        let mut possible = 0.0;
        let mut check = |weight: f64, passed: bool| {
            possible += weight;
            if passed {
                earned += weight;
            }
        };

        check(p.required, expected.required == generated.required);
        check(p.unique, expected.unique == generated.unique);
        check(
            p.ref_presence,
            expected.ref_pick_list_id.is_some() == generated.ref_pick_list_id.is_some(),
        );
        if let Some(reference) = &generated.ref_pick_list_id {
            check(p.ref_well_formed, is_well_formed_ref(reference));
        }

        let is_money = |f: &FieldDescriptor| resolver.field_type(&f.field_type) == Some(FieldType::Money);
        if is_money(expected) || is_money(generated) {
            check(p.money_fraction_digits, generated.fraction_digits.is_some());
            check(p.money_currency_code, generated.currency_code.is_some());
        }

        if possible <= 0.0 {
            return 0.0;
        }
        earned / possible
    }
}

impl MetricCalculator for StructureScore {
    fn name(&self) -> &'static str {
        "structure_score"
    }

    fn score(&self, ctx: &MetricContext<'_>) -> f64 {
        let credits: Vec<f64> = ctx
            .alignment
            .matched()
            .map(|(expected, generated)| self.pair_credit(ctx.resolver, expected, generated))
            .collect();
        if credits.is_empty() {
            return 0.0;
        }
        credits.iter().sum::<f64>() / credits.len() as f64
    }
}

/// Component weights of [`SemanticScore`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SemanticPolicy {
    pub description: f64,
    pub naming: f64,
}

impl Default for SemanticPolicy {
    fn default() -> Self {
        Self { description: 0.5, naming: 0.5 }
    }
}

/// Lexical agreement of description text and form naming with the prompt's domain
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticScore {
    pub policy: SemanticPolicy,
}

impl SemanticScore {
    pub fn new(policy: SemanticPolicy) -> Self {
        Self { policy }
    }

    pub fn description_overlap(&self, expected: &SchemaDocument, generated: &SchemaDocument) -> f64 {
        jaccard(&tokenize(&expected.description), &tokenize(&generated.description))
    }

    /// Share of generated name tokens found in the domain or expected naming
    pub fn naming_overlap(
        &self,
        expected: &SchemaDocument,
        generated: &SchemaDocument,
        domain_keywords: &TokenSet,
    ) -> f64 {
        let names = identifier_tokens([generated.apps_id.as_str(), generated.form_id.as_str()]);
        let mut vocabulary = identifier_tokens([expected.apps_id.as_str(), expected.form_id.as_str()]);
        vocabulary.extend(domain_keywords.iter().cloned());
        share_in(&names, &vocabulary)
    }
}

impl MetricCalculator for SemanticScore {
    fn name(&self) -> &'static str {
        "semantic_score"
    }

    fn score(&self, ctx: &MetricContext<'_>) -> f64 {
        let p = &self.policy;
        let total = p.description + p.naming;
        if total <= 0.0 {
            return 0.0;
        }
        let description = self.description_overlap(ctx.expected, ctx.generated);
        let naming = self.naming_overlap(ctx.expected, ctx.generated, ctx.domain_keywords);
        (p.description * description + p.naming * naming) / total
    }
}

/// The four metrics of one schema pair, or their mean over several pairs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricScores {
    pub field_coverage: f64,
    pub type_accuracy: f64,
    pub structure_score: f64,
    pub semantic_score: f64,
}

impl MetricScores {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scores of an expected document no generated document was paired with
    pub fn unpaired(field_coverage: f64) -> Self {
        Self { field_coverage, ..Self::default() }
    }

    /// Clamp every metric into [0, 1]
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            field_coverage: clamp(self.field_coverage),
            type_accuracy: clamp(self.type_accuracy),
            structure_score: clamp(self.structure_score),
            semantic_score: clamp(self.semantic_score),
        }
    }

    /// Arithmetic mean, each entry weighted equally; zero for no entries
    pub fn mean(scores: &[MetricScores]) -> Self {
        if scores.is_empty() {
            return Self::zero();
        }
        let n = scores.len() as f64;
        let sum = scores.iter().fold(Self::zero(), |acc, s| Self {
            field_coverage: acc.field_coverage + s.field_coverage,
            type_accuracy: acc.type_accuracy + s.type_accuracy,
            structure_score: acc.structure_score + s.structure_score,
            semantic_score: acc.semantic_score + s.semantic_score,
        });
        Self {
            field_coverage: sum.field_coverage / n,
            type_accuracy: sum.type_accuracy / n,
            structure_score: sum.structure_score / n,
            semantic_score: sum.semantic_score / n,
        }
    }

    pub fn overall(&self, weights: &ScoreWeights) -> f64 {
        let overall = weights.field_coverage * self.field_coverage
            + weights.type_accuracy * self.type_accuracy
            + weights.structure_score * self.structure_score
            + weights.semantic_score * self.semantic_score;
        overall.clamp(0.0, 1.0)
    }
}

/// The calculator set applied to every schema pair
pub struct MetricSuite {
    pub coverage: Box<dyn MetricCalculator>,
    pub type_accuracy: Box<dyn MetricCalculator>,
    pub structure: Box<dyn MetricCalculator>,
    pub semantic: Box<dyn MetricCalculator>,
}

impl Default for MetricSuite {
    fn default() -> Self {
        Self::new(StructurePolicy::default(), SemanticPolicy::default())
    }
}

impl std::fmt::Debug for MetricSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSuite")
            .field("coverage", &self.coverage.name())
            .field("type_accuracy", &self.type_accuracy.name())
            .field("structure", &self.structure.name())
            .field("semantic", &self.semantic.name())
            .finish()
    }
}

impl MetricSuite {
    pub fn new(structure: StructurePolicy, semantic: SemanticPolicy) -> Self {
        Self {
            coverage: Box::new(FieldCoverage),
            type_accuracy: Box::new(TypeAccuracy),
            structure: Box::new(StructureScore::new(structure)),
            semantic: Box::new(SemanticScore::new(semantic)),
        }
    }

    pub fn score(&self, ctx: &MetricContext<'_>) -> MetricScores {
        MetricScores {
            field_coverage: self.coverage.score(ctx),
            type_accuracy: self.type_accuracy.score(ctx),
            structure_score: self.structure.score(ctx),
            semantic_score: self.semantic.score(ctx),
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::FieldMatcher;
    use schemaeval_core::{AliasIndex, FieldMap};

    fn resolver() -> AliasResolver {
        let fields = AliasIndex::from_json_str(r#"{"title": ["name"]}"#).unwrap();
        let types = AliasIndex::from_json_str(r#"{"TEXT": ["string"]}"#).unwrap();
        AliasResolver::new(fields, types)
    }

    fn doc(form_id: &str, fields: Vec<FieldDescriptor>) -> SchemaDocument {
        let map: FieldMap = fields
            .into_iter()
            .map(|f| (f.field_id.clone().unwrap_or_default(), f))
            .collect();
        SchemaDocument::new("Shop", form_id).with_fields(map)
    }

    fn score_with(
        calc: &dyn MetricCalculator,
        r: &AliasResolver,
        expected: &SchemaDocument,
        generated: &SchemaDocument,
    ) -> f64 {
        let keywords = TokenSet::new();
        let alignment = FieldMatcher::new(r).align(&generated.fields, &expected.fields);
        calc.score(&MetricContext {
            alignment: &alignment,
            generated,
            expected,
            resolver: r,
            domain_keywords: &keywords,
        })
    }

    #[test]
    fn test_coverage_vacuous_for_empty_expected() {
        let r = resolver();
        let expected = doc("Product", vec![]);
        let generated = doc("Product", vec![FieldDescriptor::new("x", FieldType::Text)]);
        assert_eq!(score_with(&FieldCoverage, &r, &expected, &generated), 1.0);
    }

    #[test]
    fn test_alias_scenario_full_coverage_and_types() {
        let r = resolver();
        let expected = doc("Product", vec![FieldDescriptor::new("title", FieldType::Text).required(true)]);
        let generated = doc("Product", vec![FieldDescriptor::new("name", FieldType::Text).required(true)]);

        assert_eq!(score_with(&FieldCoverage, &r, &expected, &generated), 1.0);
        assert_eq!(score_with(&TypeAccuracy, &r, &expected, &generated), 1.0);
        assert_eq!(score_with(&StructureScore::default(), &r, &expected, &generated), 1.0);
    }

    #[test]
    fn test_type_accuracy_zero_without_matches() {
        let r = resolver();
        let expected = doc("Product", vec![FieldDescriptor::new("sku", FieldType::Text)]);
        let generated = doc("Product", vec![FieldDescriptor::new("color", FieldType::Text)]);
        assert_eq!(score_with(&TypeAccuracy, &r, &expected, &generated), 0.0);
        assert_eq!(score_with(&StructureScore::default(), &r, &expected, &generated), 0.0);

        let empty = doc("Product", vec![]);
        assert_eq!(score_with(&TypeAccuracy, &r, &empty, &empty), 0.0);
    }

    #[test]
    fn test_type_synonyms_agree() {
        let r = resolver();
        let expected = doc("P", vec![FieldDescriptor::new("title", FieldType::Text)]);
        let mut field = FieldDescriptor::new("title", FieldType::Text);
        field.field_type = "String".into();
        let generated = doc("P", vec![field]);
        assert_eq!(score_with(&TypeAccuracy, &r, &expected, &generated), 1.0);
    }

    #[test]
    fn test_type_mismatch_halves_accuracy() {
        let r = resolver();
        let expected = doc(
            "P",
            vec![
                FieldDescriptor::new("title", FieldType::Text),
                FieldDescriptor::new("price", FieldType::Money),
            ],
        );
        let generated = doc(
            "P",
            vec![
                FieldDescriptor::new("title", FieldType::Text),
                FieldDescriptor::new("price", FieldType::Numeric),
            ],
        );
        assert_eq!(score_with(&TypeAccuracy, &r, &expected, &generated), 0.5);
    }

    #[test]
    fn test_money_metadata_raises_structure_score() {
        let r = resolver();
        let expected = doc("P", vec![FieldDescriptor::new("price", FieldType::Money).with_money(2, "USD")]);
        let bare = doc("P", vec![FieldDescriptor::new("price", FieldType::Money)]);
        let full = doc("P", vec![FieldDescriptor::new("price", FieldType::Money).with_money(2, "EUR")]);

        let structure = StructureScore::default();
        let bare_score = score_with(&structure, &r, &expected, &bare);
        let full_score = score_with(&structure, &r, &expected, &full);
        assert!(bare_score < full_score, "{} should be < {}", bare_score, full_score);
        assert_eq!(full_score, 1.0);
    }

    #[test]
    fn test_reference_credit() {
        let r = resolver();
        let structure = StructureScore::default();
        let expected = FieldDescriptor::new("category", FieldType::RefPickList).with_ref("Category.name");

        let good = FieldDescriptor::new("category", FieldType::RefPickList).with_ref("Category.title");
        let malformed = FieldDescriptor::new("category", FieldType::RefPickList).with_ref("Category");
        let missing = FieldDescriptor::new("category", FieldType::RefPickList);

        let good_credit = structure.pair_credit(&r, &expected, &good);
        let malformed_credit = structure.pair_credit(&r, &expected, &malformed);
        let missing_credit = structure.pair_credit(&r, &expected, &missing);

        assert_eq!(good_credit, 1.0);
        assert!(malformed_credit < good_credit);
        assert!(missing_credit < good_credit);
    }

    #[test]
    fn test_required_and_unique_partial_credit() {
        let r = resolver();
        let structure = StructureScore::default();
        let expected = FieldDescriptor::new("email", FieldType::Text).required(true).unique(true);
        let generated = FieldDescriptor::new("email", FieldType::Text).required(true);
        let credit = structure.pair_credit(&r, &expected, &generated);
        assert!((credit - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_semantic_is_deterministic_and_bounded() {
        let r = resolver();
        let expected = doc("Product", vec![]).with_description("Products sold in the online shop");
        let generated = doc("ProductItem", vec![]).with_description("Items for sale in an online shop");
        let keywords = tokenize("An online shop selling products");

        let alignment = FieldMatcher::new(&r).align(&generated.fields, &expected.fields);
        let ctx = MetricContext {
            alignment: &alignment,
            generated: &generated,
            expected: &expected,
            resolver: &r,
            domain_keywords: &keywords,
        };
        let semantic = SemanticScore::default();
        let first = semantic.score(&ctx);
        let second = semantic.score(&ctx);
        assert_eq!(first, second);
        assert!(first > 0.0 && first < 1.0);
    }

    #[test]
    fn test_semantic_naming_uses_domain_keywords() {
        let semantic = SemanticScore::default();
        let expected = SchemaDocument::new("SchoolManagement", "Student");
        let on_topic = SchemaDocument::new("SchoolPortal", "Course");
        let off_topic = SchemaDocument::new("Inventory", "Widget");
        let keywords = tokenize("Students enrol in courses at a school");

        assert!(
            semantic.naming_overlap(&expected, &on_topic, &keywords)
                > semantic.naming_overlap(&expected, &off_topic, &keywords)
        );
        assert_eq!(semantic.naming_overlap(&expected, &off_topic, &keywords), 0.0);
    }

    #[test]
    fn test_overall_is_convex_combination() {
        let weights = ScoreWeights::default();
        let ones = MetricScores {
            field_coverage: 1.0,
            type_accuracy: 1.0,
            structure_score: 1.0,
            semantic_score: 1.0,
        };
        assert!((ones.overall(&weights) - 1.0).abs() < 1e-12);
        assert_eq!(MetricScores::zero().overall(&weights), 0.0);

        let mixed = MetricScores {
            field_coverage: 1.0,
            type_accuracy: 0.0,
            structure_score: 0.0,
            semantic_score: 0.0,
        };
        assert!((mixed.overall(&weights) - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_mean_weights_pairs_equally() {
        let a = MetricScores { field_coverage: 1.0, ..MetricScores::zero() };
        let b = MetricScores::zero();
        let mean = MetricScores::mean(&[a, b]);
        assert_eq!(mean.field_coverage, 0.5);
        assert_eq!(MetricScores::mean(&[]), MetricScores::zero());
    }
}
