// Benchmarks for field alignment and full prompt evaluation
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use schemaeval::prelude::*;
use schemaeval_core::AliasIndex;
use std::sync::Arc;

const TYPES: [FieldType; 5] = [
    FieldType::Text,
    FieldType::Numeric,
    FieldType::Boolean,
    FieldType::Date,
    FieldType::Money,
];

fn random_field(rng: &mut impl Rng, id: &str, depth: usize) -> FieldDescriptor {
    if depth > 0 && rng.random_range(0..10) == 0 {
        let nested = random_fields(rng, 4, depth - 1, id);
        return FieldDescriptor::new(id, FieldType::Embed).with_embedded(nested);
    }
    let field_type = TYPES[rng.random_range(0..TYPES.len())];
    let field = FieldDescriptor::new(id, field_type).required(rng.random_bool(0.3));
    if field_type == FieldType::Money {
        field.with_money(2, "USD")
    } else {
        field
    }
}

fn random_fields(rng: &mut impl Rng, count: usize, depth: usize, prefix: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for i in 0..count {
        let id = format!("{}_field_{}", prefix, i);
        let field = random_field(rng, &id, depth);
        fields.insert(id, field);
    }
    fields
}

/// Expected schema plus a perturbed copy: some fields dropped, some renamed to aliases
fn schema_pair(size: usize) -> (SchemaDocument, SchemaDocument) {
    let mut rng = rand::rng();
    let expected = SchemaDocument::new("BenchApp", "Record").with_fields(random_fields(&mut rng, size, 2, "f"));

    let mut generated_fields = FieldMap::new();
    for (name, field) in &expected.fields {
        match rng.random_range(0..10) {
            0 => {}
            1 => {
                let alias = format!("{}_alt", name);
                let mut renamed = field.clone();
                renamed.field_id = Some(alias.clone());
                generated_fields.insert(alias, renamed);
            }
            _ => {
                generated_fields.insert(name.clone(), field.clone());
            }
        }
    }
    let generated = SchemaDocument::new("BenchApp", "Record").with_fields(generated_fields);
    (expected, generated)
}

fn alias_resolver(expected: &SchemaDocument) -> AliasResolver {
    let table: Vec<(String, Vec<String>)> = expected
        .fields
        .keys()
        .map(|name| (name.clone(), vec![format!("{}_alt", name)]))
        .collect();
    let fields = AliasIndex::from_table(table).unwrap_or_default();
    AliasResolver::new(fields, AliasIndex::default())
}

fn benchmark_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");

    for size in [10, 100, 1000].iter() {
        let (expected, generated) = schema_pair(*size);
        let resolver = alias_resolver(&expected);

        group.bench_with_input(BenchmarkId::new("fields", size), size, |b, _| {
            let matcher = FieldMatcher::new(&resolver);
            b.iter(|| {
                let alignment = matcher.align(black_box(&generated.fields), black_box(&expected.fields));
                black_box(alignment.matched_count());
            });
        });
    }

    group.finish();
}

fn benchmark_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let prompt = PromptRecord::new("bench", "A record keeping application for benchmark data", 1);

    for size in [10, 100, 1000].iter() {
        let (expected, generated) = schema_pair(*size);
        let resolver = Arc::new(alias_resolver(&expected));
        let evaluator = SchemaEvaluator::new(resolver);
        let expected_raw = serde_json::to_string(&expected).unwrap();
        let payload = GeneratedPayload::Text(serde_json::to_string(&generated).unwrap());

        group.bench_with_input(BenchmarkId::new("single_form", size), size, |b, _| {
            b.iter(|| {
                let result = evaluator.evaluate(&prompt, black_box(&payload), black_box(&expected_raw), 0.0);
                black_box(result.overall_score);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_align, benchmark_evaluate);
criterion_main!(benches);
