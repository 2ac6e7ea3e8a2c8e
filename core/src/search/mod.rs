//! Substring filter over history entries.
//!
//! An empty query matches everything. Matching is by substring; case handling
//! follows [`CaseMatching`].

use crate::core::registry::{EntryId, Registry};

/// Case matching behavior for search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseMatching {
    /// Always case sensitive.
    Sensitive,
    /// Always case insensitive.
    #[default]
    Insensitive,
    /// Case-insensitive unless the query contains uppercase.
    Smart,
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    text: String,
    case_matching: CaseMatching,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_matching: CaseMatching::default(),
        }
    }

    pub fn with_case_matching(mut self, case_matching: CaseMatching) -> Self {
        self.case_matching = case_matching;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        if self.text.is_empty() {
            return true;
        }
        if self.case_sensitive() {
            haystack.contains(&self.text)
        } else {
            haystack
                .to_lowercase()
                .contains(&self.text.to_lowercase())
        }
    }

    /// Matching entries, newest first.
    pub fn filter(&self, registry: &Registry) -> Vec<EntryId> {
        registry
            .iter()
            .rev()
            .filter(|(_, entry)| self.matches(entry.content().as_text()))
            .map(|(id, _)| id)
            .collect()
    }

    fn case_sensitive(&self) -> bool {
        match self.case_matching {
            CaseMatching::Sensitive => true,
            CaseMatching::Insensitive => false,
            CaseMatching::Smart => self.text.chars().any(char::is_uppercase),
        }
    }
}

#[cfg(test)]
mod tests;
