//! Field descriptors
//!
//! A field is one entry of a form's `fields` mapping. The raw `fieldType`
//! string is kept as written so that synonyms produced by a model can be
//! resolved through the type alias table before being compared.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name -> descriptor, in document order
pub type FieldMap = IndexMap<String, FieldDescriptor>;

/// The closed set of field types supported by the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Numeric,
    Boolean,
    Money,
    Date,
    RefPickList,
    Embed,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Numeric,
        FieldType::Boolean,
        FieldType::Money,
        FieldType::Date,
        FieldType::RefPickList,
        FieldType::Embed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Numeric => "NUMERIC",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Money => "MONEY",
            FieldType::Date => "DATE",
            FieldType::RefPickList => "REF_PICK_LIST",
            FieldType::Embed => "EMBED",
        }
    }

    /// Case-insensitive lookup of a (canonicalized) type name
    pub fn parse(name: &str) -> Option<FieldType> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

/// One schema field
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Must equal the key of this field in the owning mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,

    /// Raw type string as written; see [`FieldType::parse`]
    #[serde(default)]
    pub field_type: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default)]
    pub allow_multiple: bool,

    /// `"<FormName>.<fieldId>"` for REF_PICK_LIST fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_pick_list_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_form_schema: Option<EmbeddedFormSchema>,
}

impl FieldDescriptor {
    pub fn new(field_id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_id: Some(field_id.into()),
            field_type: field_type.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_ref(mut self, ref_pick_list_id: impl Into<String>) -> Self {
        self.ref_pick_list_id = Some(ref_pick_list_id.into());
        self
    }

    pub fn with_money(mut self, fraction_digits: u32, currency_code: impl Into<String>) -> Self {
        self.fraction_digits = Some(fraction_digits);
        self.currency_code = Some(currency_code.into());
        self
    }

    pub fn with_embedded(mut self, fields: FieldMap) -> Self {
        self.embedded_form_schema = Some(EmbeddedFormSchema { form_id: None, fields });
        self
    }

    /// Nested fields of an embedded schema, if any
    pub fn embedded_fields(&self) -> Option<&FieldMap> {
        self.embedded_form_schema.as_ref().map(|e| &e.fields)
    }
}

/// Nested schema carried by an EMBED field
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedFormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,

    #[serde(default)]
    pub fields: FieldMap,
}

/// True when `value` has the `FormName.fieldId` shape with both parts being identifiers
pub fn is_well_formed_ref(value: &str) -> bool {
    let mut parts = value.trim().split('.');
    let (Some(form), Some(field), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    is_identifier(form) && is_identifier(field)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_parse() {
        assert_eq!(FieldType::parse("text"), Some(FieldType::Text));
        assert_eq!(FieldType::parse(" REF_PICK_LIST "), Some(FieldType::RefPickList));
        assert_eq!(FieldType::parse("STRING"), None);
        assert_eq!(FieldType::parse(""), None);
    }

    #[test]
    fn test_descriptor_defaults() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "fieldId": "price",
            "fieldType": "MONEY"
        }))
        .unwrap();

        assert!(!field.required);
        assert!(!field.unique);
        assert!(!field.allow_multiple);
        assert!(field.default.is_none());
        assert!(field.fraction_digits.is_none() && field.currency_code.is_none());
    }

    #[test]
    fn test_nested_descriptor() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "fieldId": "address",
            "fieldType": "EMBED",
            "embeddedFormSchema": {
                "fields": {
                    "street": { "fieldId": "street", "fieldType": "TEXT" },
                    "city": { "fieldId": "city", "fieldType": "TEXT", "required": true }
                }
            }
        }))
        .unwrap();

        let nested = field.embedded_fields().unwrap();
        let keys: Vec<_> = nested.keys().cloned().collect();
        assert_eq!(keys, vec!["street", "city"]);
        assert!(nested["city"].required);
    }

    #[test]
    fn test_missing_field_type_is_empty() {
        let field: FieldDescriptor = serde_json::from_value(json!({ "fieldId": "x" })).unwrap();
        assert_eq!(field.field_type, "");
    }

    #[test]
    fn test_ref_shape() {
        assert!(is_well_formed_ref("Category.name"));
        assert!(is_well_formed_ref("Order_Line.item_id2"));
        assert!(!is_well_formed_ref("Category"));
        assert!(!is_well_formed_ref("Category."));
        assert!(!is_well_formed_ref(".name"));
        assert!(!is_well_formed_ref("A.b.c"));
        assert!(!is_well_formed_ref("Cat egory.name"));
        assert!(!is_well_formed_ref("1Category.name"));
    }
}
