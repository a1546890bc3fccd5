//! Negative-keyword detection in review text.
//!
//! Matching is a plain case-insensitive substring search: no stemming and
//! no word boundaries, so `"danger"` also matches `"dangerous"`.

use hotel_safety_models::ReviewRecord;

/// Scans review text for configured negative-safety terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Builds a matcher from the configured terms. Terms are lowercased
    /// once here; blank terms are dropped since they would match anything.
    #[must_use]
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Returns the first configured term found in `text`, if any.
    #[must_use]
    pub fn first_match(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Whether `text` contains at least one configured term.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// Counts reviews whose text contains at least one configured term.
    /// A review counts once no matter how many terms it contains.
    #[must_use]
    pub fn count_negative_reviews(&self, reviews: &[ReviewRecord]) -> usize {
        reviews.iter().filter(|r| self.matches(&r.text)).count()
    }
}
