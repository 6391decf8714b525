//! Lexical helpers for the semantic heuristic
//!
//! Text and identifiers are reduced to sets of normalized word tokens.
//! All functions return a similarity in [0.0, 1.0] where 1.0 means identical.

use std::collections::BTreeSet;

/// Words too common to carry domain meaning
const STOPWORDS: &[&str] = &[
    "and", "any", "are", "app", "can", "each", "for", "from", "has", "have", "into", "its",
    "like", "need", "one", "our", "should", "that", "the", "their", "them", "this", "track",
    "was", "what", "where", "which", "who", "will", "with", "would", "you", "your", "want",
    "all", "also", "via", "let", "lets", "about", "allow", "manage", "management", "system",
    "store", "form", "information", "details", "record", "build", "create", "using",
];

const MIN_TOKEN_LEN: usize = 3;

pub type TokenSet = BTreeSet<String>;

/// Split free text or identifiers into normalized tokens
///
/// Splits on non-alphanumerics and camelCase boundaries, lower-cases,
/// strips a plural `s`, and drops stopwords and short tokens.
pub fn tokenize(text: &str) -> TokenSet {
    split_words(text)
        .into_iter()
        .filter_map(|w| normalize_word(&w))
        .collect()
}

/// Tokens of several identifiers, e.g. `appsId` and `formId`
pub fn identifier_tokens<'a>(idents: impl IntoIterator<Item = &'a str>) -> TokenSet {
    idents.into_iter().flat_map(tokenize).collect()
}

fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            // fooBar | HTTPServer
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn normalize_word(word: &str) -> Option<String> {
    let mut w = word.to_lowercase();
    if w.len() > 4 && w.ends_with("ies") {
        w.truncate(w.len() - 3);
        w.push('y');
    } else if w.len() > 3 && w.ends_with('s') && !w.ends_with("ss") {
        w.pop();
    }
    if w.len() < MIN_TOKEN_LEN || STOPWORDS.contains(&w.as_str()) {
        return None;
    }
    Some(w)
}

/// Jaccard index of two token sets; two empty sets are identical
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Share of `tokens` that also occur in `vocabulary`; 0.0 for no tokens
pub fn share_in(tokens: &TokenSet, vocabulary: &TokenSet) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens.iter().filter(|t| vocabulary.contains(*t)).count();
    hits as f64 / tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> TokenSet {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_camel_case_split() {
        assert_eq!(tokenize("EcommercePlatform"), set(&["ecommerce", "platform"]));
        assert_eq!(tokenize("orderLineItems"), set(&["order", "line", "item"]));
        assert_eq!(tokenize("HTTPServerConfig"), set(&["http", "server", "config"]));
    }

    #[test]
    fn test_plural_and_stopwords() {
        let tokens = tokenize("Track the products and categories for an online store");
        assert!(tokens.contains("product"));
        assert!(tokens.contains("category"));
        assert_eq!(tokenize("Category"), tokenize("categories"));
        assert!(tokens.contains("online"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("store"));
        assert!(!tokens.contains("an"));
    }

    #[test]
    fn test_double_s_kept() {
        assert!(tokenize("address").contains("address"));
        assert!(tokenize("class").contains("class"));
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["x", "y"]), &set(&["y", "z"])), 1.0 / 3.0);
    }

    #[test]
    fn test_share_in() {
        let vocab = set(&["student", "course"]);
        assert_eq!(share_in(&set(&["student", "portal"]), &vocab), 0.5);
        assert_eq!(share_in(&set(&[]), &vocab), 0.0);
    }

    #[test]
    fn test_identifier_tokens() {
        let tokens = identifier_tokens(["SchoolManagement", "StudentRecord"]);
        assert_eq!(tokens, set(&["school", "student"]));
    }
}
