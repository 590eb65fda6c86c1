//! Keyword matcher — trigger phrase detection per category.
//!
//! A phrase fires when it appears in the text either as a whole word/phrase
//! bounded by non-word characters or as a raw substring. Both checks are kept:
//! the substring check is the recall path for phrases the boundary pattern
//! cannot span, the boundary check is the precise one.

use regex::Regex;
use serde::Serialize;
use spicesense_core::Taxonomy;

struct PhrasePattern {
    phrase: String,
    /// `None` if the boundary pattern failed to compile; substring check still applies.
    boundary: Option<Regex>,
}

impl PhrasePattern {
    fn new(phrase: &str) -> Self {
        let pattern = format!(r"\b{}\b", regex::escape(phrase));
        let boundary = match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Boundary pattern for '{}' unusable: {}", phrase, e);
                None
            }
        };
        Self {
            phrase: phrase.to_string(),
            boundary,
        }
    }

    fn is_present(&self, text: &str) -> bool {
        let bounded = self.boundary.as_ref().is_some_and(|re| re.is_match(text));
        bounded || text.contains(&self.phrase)
    }
}

struct CategoryPatterns {
    name: String,
    phrases: Vec<PhrasePattern>,
}

/// Trigger phrases that fired for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHit {
    pub category: String,
    pub phrases: Vec<String>,
}

/// Precompiled matcher over a taxonomy.
pub struct KeywordMatcher {
    categories: Vec<CategoryPatterns>,
}

impl KeywordMatcher {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let categories = taxonomy
            .iter()
            .map(|category| CategoryPatterns {
                name: category.name.clone(),
                phrases: category.phrases.iter().map(|p| PhrasePattern::new(p)).collect(),
            })
            .collect();
        Self { categories }
    }

    /// Categories with at least one trigger phrase present, in taxonomy order.
    ///
    /// Stops at the first firing phrase of each category.
    pub fn matches(&self, text: &str) -> Vec<&str> {
        let text = text.to_lowercase();
        self.categories
            .iter()
            .filter(|c| c.phrases.iter().any(|p| p.is_present(&text)))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Every phrase that fired, grouped by category in taxonomy order.
    /// Categories without a hit are omitted.
    pub fn explain(&self, text: &str) -> Vec<KeywordHit> {
        let text = text.to_lowercase();
        self.categories
            .iter()
            .filter_map(|c| {
                let phrases: Vec<String> = c
                    .phrases
                    .iter()
                    .filter(|p| p.is_present(&text))
                    .map(|p| p.phrase.clone())
                    .collect();
                (!phrases.is_empty()).then(|| KeywordHit {
                    category: c.name.clone(),
                    phrases,
                })
            })
            .collect()
    }
}
