//! # SchemaEval Core
//!
//! Core library for the SchemaEval scoring engine.
//!
//! This crate provides the data model shared by every other crate:
//!
//! - [`SchemaDocument`] - One form definition with its fields
//! - [`FieldDescriptor`] - One field, with type, constraints and nested schema
//! - [`AliasResolver`] - Canonicalization of field names and types
//! - [`PromptRecord`] / [`EvaluationResult`] - Input and output records per prompt
//!
//! ## Example
//!
//! ```rust
//! use schemaeval_core::{AliasIndex, AliasResolver, parse_documents, PayloadOrigin};
//!
//! let fields = AliasIndex::from_json_str(r#"{"title": ["name"]}"#).unwrap();
//! let resolver = AliasResolver::new(fields, AliasIndex::default());
//! assert_eq!(resolver.canonical_field("Name"), "title");
//!
//! let docs = parse_documents(
//!     r#"{"appsId": "Blog", "formId": "Post", "fields": {}}"#,
//!     PayloadOrigin::Generated,
//! ).unwrap();
//! assert_eq!(docs.len(), 1);
//! ```

pub mod alias;
pub mod document;
pub mod error;
pub mod field;
pub mod prompt;

pub use alias::{AliasIndex, AliasResolver, FIELD_ALIASES_FILE, TYPE_ALIASES_FILE};
pub use document::{documents_from_value, parse_documents, SchemaDocument};
pub use error::{Error, PayloadOrigin, Result};
pub use field::{is_well_formed_ref, EmbeddedFormSchema, FieldDescriptor, FieldMap, FieldType};
pub use prompt::{EvaluationResult, GeneratedPayload, PromptRecord};
