//! Alias tables for field names and field types
//!
//! Each alias file maps a canonical name to the list of synonyms that should
//! be treated as equivalent:
//!
//! ```json
//! { "title": ["name", "label"], "price": ["cost", "amount"] }
//! ```
//!
//! At load time a table is compiled into an inverse index (synonym -> canonical)
//! so every lookup is a single hash probe. Lookups are total: an unknown name
//! canonicalizes to itself, trimmed and lower-cased.

use crate::error::{Error, Result};
use ahash::AHashMap;
use indexmap::IndexMap;
use std::path::Path;

pub const FIELD_ALIASES_FILE: &str = "field_name_aliases.json";
pub const TYPE_ALIASES_FILE: &str = "type_aliases.json";

/// Compiled inverse index for one alias table
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    index: AHashMap<String, String>,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl AliasIndex {
    /// Build the index from canonical -> synonyms entries
    ///
    /// Fails if a name would resolve to two different canonical names.
    pub fn from_table<I, S>(table: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut index: AHashMap<String, String> = AHashMap::new();

        for (canonical, synonyms) in table {
            let canonical = normalize(canonical.as_ref());
            if canonical.is_empty() {
                return Err(Error::Config("alias table contains an empty canonical name".into()));
            }

            let names = std::iter::once(canonical.clone())
                .chain(synonyms.iter().map(|s| normalize(s.as_ref())));

            for name in names {
                if name.is_empty() {
                    continue;
                }
                if let Some(existing) = index.get(&name) {
                    if *existing != canonical {
                        return Err(Error::AmbiguousAlias {
                            synonym: name,
                            first: existing.clone(),
                            second: canonical,
                        });
                    }
                    continue;
                }
                index.insert(name, canonical.clone());
            }
        }

        Ok(Self { index })
    }

    /// Parse and compile an alias table from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: IndexMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("malformed alias table: {}", e)))?;
        Self::from_table(table)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Resolve a name to its canonical form
    pub fn canonical(&self, name: &str) -> String {
        let key = normalize(name);
        match self.index.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    /// Number of indexed names (canonicals plus synonyms)
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Field-name and type canonicalization shared by every scorer
///
/// Built once per run and read-only afterwards; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    fields: AliasIndex,
    types: AliasIndex,
}

impl AliasResolver {
    pub fn new(fields: AliasIndex, types: AliasIndex) -> Self {
        Self { fields, types }
    }

    /// Identity resolver: names are only trimmed and lower-cased
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `field_name_aliases.json` and `type_aliases.json` from a mappings directory
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let fields = AliasIndex::from_file(dir.join(FIELD_ALIASES_FILE))?;
        let types = AliasIndex::from_file(dir.join(TYPE_ALIASES_FILE))?;
        Ok(Self::new(fields, types))
    }

    pub fn canonical_field(&self, name: &str) -> String {
        self.fields.canonical(name)
    }

    pub fn canonical_type(&self, name: &str) -> String {
        self.types.canonical(name)
    }

    /// Canonical type resolved into the closed field type set
    pub fn field_type(&self, raw: &str) -> Option<crate::field::FieldType> {
        crate::field::FieldType::parse(&self.canonical_type(raw))
    }

    pub fn field_aliases(&self) -> &AliasIndex {
        &self.fields
    }

    pub fn type_aliases(&self) -> &AliasIndex {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn resolver() -> AliasResolver {
        let fields = AliasIndex::from_json_str(
            r#"{"title": ["name", "Label"], "price": ["cost", " amount "]}"#,
        )
        .unwrap();
        let types = AliasIndex::from_json_str(
            r#"{"TEXT": ["string", "varchar"], "NUMERIC": ["number", "integer", "int"]}"#,
        )
        .unwrap();
        AliasResolver::new(fields, types)
    }

    #[test]
    fn test_synonyms_resolve_to_canonical() {
        let r = resolver();
        assert_eq!(r.canonical_field("name"), "title");
        assert_eq!(r.canonical_field("  LABEL "), "title");
        assert_eq!(r.canonical_field("Title"), "title");
        assert_eq!(r.canonical_field("amount"), "price");
    }

    #[test]
    fn test_unknown_passes_through_normalized() {
        let r = resolver();
        assert_eq!(r.canonical_field("  SKU "), "sku");
        assert_eq!(r.canonical_type("Blob"), "blob");
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let r = resolver();
        for name in ["name", "Title", "cost", "unknown_Field", "", "  x  "] {
            let once = r.canonical_field(name);
            assert_eq!(r.canonical_field(&once), once, "not idempotent for {:?}", name);
        }
        for ty in ["string", "INT", "MONEY", "weird"] {
            let once = r.canonical_type(ty);
            assert_eq!(r.canonical_type(&once), once);
        }
    }

    #[test]
    fn test_type_resolution_into_closed_set() {
        let r = resolver();
        assert_eq!(r.field_type("varchar"), Some(FieldType::Text));
        assert_eq!(r.field_type("integer"), Some(FieldType::Numeric));
        assert_eq!(r.field_type("MONEY"), Some(FieldType::Money));
        assert_eq!(r.field_type("blob"), None);
    }

    #[test]
    fn test_ambiguous_synonym_rejected() {
        let err = AliasIndex::from_json_str(r#"{"title": ["name"], "label": ["NAME"]}"#)
            .unwrap_err();
        assert!(err.is_fatal());
        match err {
            Error::AmbiguousAlias { synonym, first, second } => {
                assert_eq!(synonym, "name");
                assert_eq!(first, "title");
                assert_eq!(second, "label");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_canonical_listed_as_other_synonym_rejected() {
        let err = AliasIndex::from_json_str(r#"{"title": ["name"], "name": ["label"]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::AmbiguousAlias { .. }));
    }

    #[test]
    fn test_repeated_synonym_same_canonical_is_fine() {
        let index = AliasIndex::from_json_str(r#"{"title": ["name", "Name", "title"]}"#).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_malformed_table_is_config_error() {
        assert!(matches!(
            AliasIndex::from_json_str("{not json"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AliasIndex::from_json_str(r#"{"title": "name"}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FIELD_ALIASES_FILE), r#"{"email": ["mail"]}"#).unwrap();
        std::fs::write(dir.path().join(TYPE_ALIASES_FILE), r#"{"DATE": ["datetime"]}"#).unwrap();

        let r = AliasResolver::from_dir(dir.path()).unwrap();
        assert_eq!(r.canonical_field("Mail"), "email");
        assert_eq!(r.field_type("datetime"), Some(FieldType::Date));
    }

    #[test]
    fn test_from_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AliasResolver::from_dir(dir.path()).unwrap_err();
        assert!(err.is_fatal());
    }
}
