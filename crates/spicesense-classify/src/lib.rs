//! SPICEsense Classify — two-stage event classification.
//!
//! Stage one matches taxonomy trigger phrases in the combined title and
//! description. Stage two scores the same text against per-category concept
//! embeddings when an embedding capability is present, adding suggestions
//! above a threshold or, when nothing matched at all, the best few guesses.

pub mod batch;
pub mod classifier;
pub mod keywords;
pub mod scores;
pub mod semantic;

pub use batch::{BatchOptions, Record, SCORES_COLUMN, SPICES_COLUMN};
pub use classifier::{no_embedder, normalize_text, SpicesClassifier, KEYWORD_SCORE};
pub use keywords::{KeywordHit, KeywordMatcher};
pub use scores::CategoryScores;
pub use semantic::{cosine_similarity, SemanticScorer};
