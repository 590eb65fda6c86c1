//! Two-stage classifier: keyword matches first, semantic fallback second.

use std::sync::Arc;

use spicesense_core::{ClassifierConfig, Result, Taxonomy};
use spicesense_infer::{EmbedderBackend, NoopEmbedder, DEFAULT_DIM};
use tracing::{info, warn};

use crate::keywords::{KeywordHit, KeywordMatcher};
use crate::scores::CategoryScores;
use crate::semantic::SemanticScorer;

/// Score assigned to every keyword-matched category.
pub const KEYWORD_SCORE: f32 = 1.0;

/// Combine title and description into the lowercase text both stages read.
pub fn normalize_text(title: &str, description: &str) -> String {
    format!("{}. {}", title, description).to_lowercase()
}

/// SPICES classifier over an immutable taxonomy.
///
/// Safe to share across threads: classification reads only the precompiled
/// keyword patterns and concept vectors.
pub struct SpicesClassifier {
    taxonomy: Taxonomy,
    matcher: KeywordMatcher,
    semantic: Option<SemanticScorer>,
    config: ClassifierConfig,
}

impl SpicesClassifier {
    /// Build a classifier.
    ///
    /// Only an invalid `config` is an error. If semantic scoring was requested
    /// but the embedder is unavailable or fails while embedding the concept
    /// phrases, the classifier logs a warning and runs keyword-only.
    pub fn new(
        taxonomy: Taxonomy,
        embedder: Arc<dyn EmbedderBackend>,
        config: ClassifierConfig,
    ) -> Result<Self> {
        config.validate()?;

        let matcher = KeywordMatcher::new(&taxonomy);
        let semantic = if config.use_semantic {
            match SemanticScorer::new(&taxonomy, embedder) {
                Ok(scorer) => {
                    info!(
                        "Semantic fallback enabled (threshold={}, fallback_top_k={})",
                        config.threshold, config.fallback_top_k
                    );
                    Some(scorer)
                }
                Err(e) => {
                    warn!("Semantic fallback disabled: {}", e);
                    None
                }
            }
        } else {
            info!("Semantic fallback disabled by configuration");
            None
        };

        let config = ClassifierConfig {
            use_semantic: semantic.is_some(),
            ..config
        };

        Ok(Self {
            taxonomy,
            matcher,
            semantic,
            config,
        })
    }

    /// Keyword-only classifier.
    pub fn keyword_only(taxonomy: Taxonomy) -> Self {
        Self {
            matcher: KeywordMatcher::new(&taxonomy),
            taxonomy,
            semantic: None,
            config: ClassifierConfig {
                use_semantic: false,
                ..ClassifierConfig::default()
            },
        }
    }

    /// Classify one event. The result is never empty; when nothing can be
    /// determined it is the `{"Uncategorized": 0.0}` sentinel.
    pub fn classify(&self, title: &str, description: &str) -> CategoryScores {
        self.classify_text(&normalize_text(title, description))
    }

    /// Classify already-combined text.
    pub fn classify_text(&self, text: &str) -> CategoryScores {
        let keyword_matches = self.matcher.matches(text);

        if !keyword_matches.is_empty() {
            let mut scores = CategoryScores::new();
            for category in keyword_matches {
                scores.insert(category, KEYWORD_SCORE);
            }
            // Semantic extras never override or duplicate a keyword match.
            for (category, score) in self.semantic_scores(text) {
                if score >= self.config.threshold {
                    scores.insert(category, score);
                }
            }
            return scores;
        }

        if self.semantic.is_none() {
            return CategoryScores::uncategorized();
        }

        let semantic = self.semantic_scores(text);
        let mut scores = CategoryScores::new();
        for (category, score) in &semantic {
            if *score >= self.config.threshold {
                scores.insert(category.clone(), *score);
            }
        }

        if scores.is_empty() {
            // Nothing cleared the bar: offer the best few as soft suggestions.
            let mut ranked = semantic;
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            for (category, score) in ranked.into_iter().take(self.config.fallback_top_k) {
                scores.insert(category, score);
            }
        }

        if scores.is_empty() {
            // Only reachable when embedding the input failed.
            return CategoryScores::uncategorized();
        }
        scores
    }

    /// Trigger phrases that fired for `title` + `description`.
    pub fn explain(&self, title: &str, description: &str) -> Vec<KeywordHit> {
        self.matcher.explain(&normalize_text(title, description))
    }

    /// Semantic scores, or nothing when disabled or the input could not be embedded.
    fn semantic_scores(&self, text: &str) -> Vec<(String, f32)> {
        let Some(scorer) = &self.semantic else {
            return Vec::new();
        };
        match scorer.score(text) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("Semantic scoring skipped: {}", e);
                Vec::new()
            }
        }
    }

    /// Whether semantic scoring is active. Decided once at construction.
    pub fn semantic_enabled(&self) -> bool {
        self.semantic.is_some()
    }

    /// Dimension of the concept vectors, if semantic scoring is active.
    pub fn embedding_dimension(&self) -> Option<usize> {
        self.semantic.as_ref().map(SemanticScorer::dimension)
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Effective configuration; `use_semantic` reflects the detected capability.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}

impl Default for SpicesClassifier {
    /// Built-in SPICES taxonomy, keyword-only.
    fn default() -> Self {
        Self::keyword_only(Taxonomy::spices())
    }
}

/// Placeholder embedder for callers that never want semantic scoring.
pub fn no_embedder() -> Arc<dyn EmbedderBackend> {
    Arc::new(NoopEmbedder::new(DEFAULT_DIM))
}
