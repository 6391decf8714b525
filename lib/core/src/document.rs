//! Schema documents and payload normalization
//!
//! A payload is either a single form object or an array of form objects.
//! Both are normalized to a `Vec<SchemaDocument>`.

use crate::error::{Error, PayloadOrigin, Result};
use crate::field::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One form definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default)]
    pub apps_id: String,

    #[serde(default)]
    pub form_id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub fields: FieldMap,
}

impl SchemaDocument {
    pub fn new(apps_id: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self {
            apps_id: apps_id.into(),
            form_id: form_id.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    /// Check structural invariants of the document
    ///
    /// Returns the list of non-fatal findings. A `fieldId` that differs from
    /// its key is fatal for ground truth and a warning for generated output;
    /// an embedded schema naming one of its ancestor forms is fatal on both sides.
    pub fn validate(&self, origin: PayloadOrigin) -> Result<Vec<String>> {
        let mut warnings = Vec::new();
        let mut ancestors = vec![normalize_form_id(&self.form_id)];
        validate_fields(
            &self.fields,
            &self.form_id,
            origin,
            &mut ancestors,
            &mut warnings,
        )?;
        Ok(warnings)
    }
}

fn normalize_form_id(id: &str) -> String {
    id.trim().to_lowercase()
}

fn validate_fields(
    fields: &FieldMap,
    path: &str,
    origin: PayloadOrigin,
    ancestors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> Result<()> {
    for (key, field) in fields {
        let field_path = format!("{}.{}", path, key);

        match field.field_id.as_deref() {
            Some(id) if id != key => {
                let message = format!(
                    "field '{}' declares fieldId '{}' which does not match its key",
                    field_path, id
                );
                match origin {
                    PayloadOrigin::GroundTruth => return Err(Error::shape(origin, message)),
                    PayloadOrigin::Generated => warnings.push(message),
                }
            }
            None => warnings.push(format!("field '{}' has no fieldId", field_path)),
            _ => {}
        }

        if let Some(embedded) = &field.embedded_form_schema {
            let nested_id = embedded.form_id.as_deref().map(normalize_form_id);
            if let Some(id) = nested_id.as_deref().filter(|id| !id.is_empty()) {
                if ancestors.iter().any(|a| a == id) {
                    return Err(Error::shape(
                        origin,
                        format!(
                            "embedded schema at '{}' references its ancestor form '{}'",
                            field_path, id
                        ),
                    ));
                }
            }

            ancestors.push(nested_id.unwrap_or_default());
            let nested = validate_fields(&embedded.fields, &field_path, origin, ancestors, warnings);
            ancestors.pop();
            nested?;
        }
    }
    Ok(())
}

/// Parse raw JSON text into a sequence of schema documents
pub fn parse_documents(raw: &str, origin: PayloadOrigin) -> Result<Vec<SchemaDocument>> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| Error::parse(origin, format!("malformed JSON: {}", e)))?;
    documents_from_value(value, origin)
}

/// Normalize an already-parsed payload: a bare object becomes a one-element sequence
pub fn documents_from_value(value: Value, origin: PayloadOrigin) -> Result<Vec<SchemaDocument>> {
    match value {
        Value::Object(_) => Ok(vec![document_from_value(value, origin, None)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(_) => document_from_value(item, origin, Some(i)),
                other => Err(Error::shape(
                    origin,
                    format!("element {} is {}, expected a schema object", i, kind_of(&other)),
                )),
            })
            .collect(),
        other => Err(Error::shape(
            origin,
            format!("top-level value is {}, expected an object or array", kind_of(&other)),
        )),
    }
}

fn document_from_value(
    value: Value,
    origin: PayloadOrigin,
    index: Option<usize>,
) -> Result<SchemaDocument> {
    serde_json::from_value(value).map_err(|e| {
        let at = index.map(|i| format!("element {}: ", i)).unwrap_or_default();
        Error::shape(origin, format!("{}invalid schema document: {}", at, e))
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
