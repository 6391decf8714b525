//! Field alignment between a generated and an expected field mapping
//!
//! Every expected field gets exactly one pair, matched or not. Matching is
//! 1:1 on canonical names: each expected field claims the first unclaimed
//! generated field with the same canonical name, in generated insertion order.
//! Expected fields competing for the same generated field claim in order of
//! their normalized key, so the expected side's insertion order never changes
//! the result.
//!
//! EMBED fields matched on both sides are aligned recursively and their leaves
//! are flattened into the parent alignment under dotted paths, so each nested
//! leaf weighs the same as a top-level field.

use schemaeval_core::{AliasResolver, FieldDescriptor, FieldMap, FieldType};

/// Generated side of a matched pair
#[derive(Debug, Clone)]
pub struct MatchedField<'a> {
    pub path: String,
    pub field: &'a FieldDescriptor,
}

/// One expected field and the generated field aligned with it, if any
#[derive(Debug, Clone)]
pub struct FieldPair<'a> {
    pub expected_path: String,
    pub expected: &'a FieldDescriptor,
    pub generated: Option<MatchedField<'a>>,
}

impl<'a> FieldPair<'a> {
    pub fn is_matched(&self) -> bool {
        self.generated.is_some()
    }
}

/// Result of aligning two field mappings
#[derive(Debug, Clone, Default)]
pub struct Alignment<'a> {
    /// One pair per expected field (nested leaves included), in expected order
    pub pairs: Vec<FieldPair<'a>>,
    /// Generated field paths nothing claimed, in generated order
    pub unmatched_generated: Vec<String>,
}

impl<'a> Alignment<'a> {
    pub fn expected_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn matched_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_matched()).count()
    }

    /// (expected, generated) descriptors of every matched pair
    pub fn matched(&self) -> impl Iterator<Item = (&'a FieldDescriptor, &'a FieldDescriptor)> + '_ {
        self.pairs
            .iter()
            .filter_map(|p| p.generated.as_ref().map(|g| (p.expected, g.field)))
    }

    /// Expected paths with no generated counterpart
    pub fn missing(&self) -> impl Iterator<Item = &str> + '_ {
        self.pairs
            .iter()
            .filter(|p| !p.is_matched())
            .map(|p| p.expected_path.as_str())
    }
}

/// Aligns field mappings using the field-name alias table
#[derive(Debug, Clone, Copy)]
pub struct FieldMatcher<'r> {
    resolver: &'r AliasResolver,
}

struct Candidate<'a> {
    key: &'a str,
    canonical: String,
    field: &'a FieldDescriptor,
}

impl<'r> FieldMatcher<'r> {
    pub fn new(resolver: &'r AliasResolver) -> Self {
        Self { resolver }
    }

    pub fn align<'a>(&self, generated: &'a FieldMap, expected: &'a FieldMap) -> Alignment<'a> {
        let mut alignment = Alignment::default();
        self.align_level(Some(generated), expected, "", "", &mut alignment);
        alignment
    }

    fn align_level<'a>(
        &self,
        generated: Option<&'a FieldMap>,
        expected: &'a FieldMap,
        gen_prefix: &str,
        exp_prefix: &str,
        out: &mut Alignment<'a>,
    ) {
        let candidates: Vec<Candidate<'a>> = generated
            .into_iter()
            .flatten()
            .map(|(key, field)| Candidate {
                key: key.as_str(),
                canonical: self.resolver.canonical_field(key),
                field,
            })
            .collect();

        let assignment = self.assign(&candidates, expected);
        let mut claimed = vec![false; candidates.len()];
        for idx in assignment.iter().flatten() {
            claimed[*idx] = true;
        }

        for ((key, field), assigned) in expected.iter().zip(&assignment) {
            let expected_path = join(exp_prefix, key);
            let matched = assigned.map(|idx| &candidates[idx]);

            out.pairs.push(FieldPair {
                expected_path: expected_path.clone(),
                expected: field,
                generated: matched.map(|c| MatchedField {
                    path: join(gen_prefix, c.key),
                    field: c.field,
                }),
            });

            let gen_path = matched.map(|c| join(gen_prefix, c.key));
            match matched {
                Some(c) if self.is_embed(field) && self.is_embed(c.field) => {
                    let gen_path = gen_path.unwrap_or_default();
                    match (field.embedded_fields(), c.field.embedded_fields()) {
                        (Some(exp_nested), gen_nested) => {
                            self.align_level(gen_nested, exp_nested, &gen_path, &expected_path, out)
                        }
                        (None, Some(gen_nested)) => {
                            collect_unmatched(gen_nested, &gen_path, &mut out.unmatched_generated)
                        }
                        (None, None) => {}
                    }
                }
                _ => {
                    if let Some(exp_nested) = field.embedded_fields() {
                        self.align_level(None, exp_nested, "", &expected_path, out);
                    }
                    if let (Some(c), Some(gen_path)) = (matched, gen_path) {
                        if let Some(gen_nested) = c.field.embedded_fields() {
                            collect_unmatched(gen_nested, &gen_path, &mut out.unmatched_generated);
                        }
                    }
                }
            }
        }

        for (candidate, taken) in candidates.iter().zip(&claimed) {
            if !taken {
                let path = join(gen_prefix, candidate.key);
                out.unmatched_generated.push(path.clone());
                if let Some(nested) = candidate.field.embedded_fields() {
                    collect_unmatched(nested, &path, &mut out.unmatched_generated);
                }
            }
        }
    }

    /// Index of the candidate assigned to each expected field
    fn assign(&self, candidates: &[Candidate<'_>], expected: &FieldMap) -> Vec<Option<usize>> {
        let mut claimed = vec![false; candidates.len()];
        let mut assignment: Vec<Option<usize>> = vec![None; expected.len()];

        let keys: Vec<&String> = expected.keys().collect();
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| {
            let (ka, kb) = (keys[a], keys[b]);
            ka.trim().to_lowercase().cmp(&kb.trim().to_lowercase()).then_with(|| ka.cmp(kb))
        });

        for slot in order {
            let canonical = self.resolver.canonical_field(keys[slot]);
            if let Some(idx) =
                (0..candidates.len()).find(|&i| !claimed[i] && candidates[i].canonical == canonical)
            {
                claimed[idx] = true;
                assignment[slot] = Some(idx);
            }
        }

        assignment
    }

    fn is_embed(&self, field: &FieldDescriptor) -> bool {
        self.resolver.field_type(&field.field_type) == Some(FieldType::Embed)
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn collect_unmatched(fields: &FieldMap, prefix: &str, out: &mut Vec<String>) {
    for (key, field) in fields {
        let path = join(prefix, key);
        out.push(path.clone());
        if let Some(nested) = field.embedded_fields() {
            collect_unmatched(nested, &path, out);
        }
    }
}
