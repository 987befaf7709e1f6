//! Item name filtering.

use super::filter::WILDCARD;
use crate::layout::SEQUENCE_DELIMITER;

/// Case-insensitive substring tokens; an item passes if any token matches.
///
/// No tokens, or a `*` token, lets every item through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    tokens: Vec<String>,
}

impl NameFilter {
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split(SEQUENCE_DELIMITER)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        if tokens.iter().any(|token| token == WILDCARD) {
            return Self::default();
        }
        Self { tokens }
    }

    pub fn matches_all(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.matches_all() {
            return true;
        }
        let name = name.to_lowercase();
        self.tokens.iter().any(|token| name.contains(token.as_str()))
    }
}
