use super::*;
use crate::types::{Content, Entry, MemoryId};

fn registry_with(texts: &[&str]) -> Registry {
    let mut registry = Registry::new();
    for (i, text) in texts.iter().enumerate() {
        registry.insert_newest(Entry::new(
            MemoryId(i as u64 + 1),
            Content::text(*text).unwrap(),
        ));
    }
    registry
}

fn found(query: &SearchQuery, registry: &Registry) -> Vec<String> {
    query
        .filter(registry)
        .into_iter()
        .map(|id| registry.get(id).unwrap().content().as_text().to_string())
        .collect()
}

#[test]
fn test_empty_query_matches_everything_newest_first() {
    let registry = registry_with(&["one", "two", "three"]);
    assert_eq!(
        found(&SearchQuery::new(""), &registry),
        ["three", "two", "one"]
    );
}

#[test]
fn test_default_is_case_insensitive_substring() {
    let registry = registry_with(&["Hello World", "help me", "nothing"]);
    assert_eq!(
        found(&SearchQuery::new("HEL"), &registry),
        ["help me", "Hello World"]
    );
}

#[test]
fn test_sensitive_matching() {
    let query = SearchQuery::new("Rust").with_case_matching(CaseMatching::Sensitive);
    assert!(query.matches("I like Rust"));
    assert!(!query.matches("rusty nails"));
}

#[test]
fn test_smart_case() {
    let lower = SearchQuery::new("rust").with_case_matching(CaseMatching::Smart);
    let upper = SearchQuery::new("Rust").with_case_matching(CaseMatching::Smart);

    assert!(lower.matches("RUST"));
    assert!(!upper.matches("rust"));
    assert!(upper.matches("Rust"));
}

#[test]
fn test_no_match() {
    let registry = registry_with(&["abc"]);
    assert!(found(&SearchQuery::new("xyz"), &registry).is_empty());
}
