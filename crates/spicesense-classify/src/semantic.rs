//! Semantic scorer — cosine similarity against per-category concept vectors.
//!
//! Each category's trigger phrases are joined into one concept phrase and
//! embedded once at construction. The concept matrix is immutable afterwards;
//! building a new scorer is the only way to pick up a changed taxonomy.

use std::sync::Arc;

use ndarray::{Array2, ArrayView1, Axis};
use spicesense_core::{Error, Result, Taxonomy};
use spicesense_infer::EmbedderBackend;
use tracing::debug;

/// Added to each norm so an all-zero vector scores 0 instead of NaN.
const NORM_EPSILON: f32 = 1e-12;

/// Cosine similarity with epsilon-stabilized norms, clamped to `[-1, 1]`.
///
/// f32 rounding can push the ratio of a vector with itself just past 1.
pub fn cosine_similarity(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    let a_norm = a.dot(&a).sqrt() + NORM_EPSILON;
    let b_norm = b.dot(&b).sqrt() + NORM_EPSILON;
    (a.dot(&b) / (a_norm * b_norm)).clamp(-1.0, 1.0)
}

pub struct SemanticScorer {
    embedder: Arc<dyn EmbedderBackend>,
    /// Category names, parallel to the rows of `concepts`.
    categories: Vec<String>,
    /// One concept vector per row, shape `(categories, dim)`.
    concepts: Array2<f32>,
}

impl SemanticScorer {
    /// Embed every category's concept phrase.
    ///
    /// Fails with [`Error::CapabilityUnavailable`] when the embedder is not
    /// loaded, returns the wrong number of results, or cannot embed a
    /// concept phrase.
    pub fn new(taxonomy: &Taxonomy, embedder: Arc<dyn EmbedderBackend>) -> Result<Self> {
        if !embedder.is_available() {
            return Err(Error::CapabilityUnavailable("no embedding model loaded".into()));
        }

        let categories: Vec<String> = taxonomy.names().map(str::to_string).collect();
        let phrases: Vec<String> = taxonomy.iter().map(|c| c.concept_phrase()).collect();
        let phrase_refs: Vec<&str> = phrases.iter().map(String::as_str).collect();

        let results = embedder.embed_batch(&phrase_refs);
        if results.len() != categories.len() {
            return Err(Error::CapabilityUnavailable(format!(
                "embedder returned {} concept embeddings for {} categories",
                results.len(),
                categories.len()
            )));
        }

        let mut vectors = Vec::with_capacity(results.len());
        for (name, result) in categories.iter().zip(results) {
            let result = result.ok_or_else(|| {
                Error::CapabilityUnavailable(format!("failed to embed concept for '{}'", name))
            })?;
            vectors.push(result.embedding);
        }

        let dim = vectors.first().map(|v| v.len()).unwrap_or(0);
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            return Err(Error::CapabilityUnavailable(
                "concept embeddings have inconsistent dimensions".into(),
            ));
        }

        let views: Vec<ArrayView1<f32>> = vectors.iter().map(|v| v.view()).collect();
        let concepts = ndarray::stack(Axis(0), &views)
            .map_err(|e| Error::CapabilityUnavailable(format!("concept matrix: {}", e)))?;

        debug!("Semantic scorer ready: {} concepts, dim={}", categories.len(), dim);

        Ok(Self {
            embedder,
            categories,
            concepts,
        })
    }

    /// Similarity of `text` to every category, in taxonomy order, unfiltered.
    pub fn score(&self, text: &str) -> Result<Vec<(String, f32)>> {
        let embedded = self
            .embedder
            .embed(text)
            .ok_or_else(|| Error::Inference("embedding failed for input text".into()))?;
        let vector = embedded.embedding;
        if vector.len() != self.dimension() {
            return Err(Error::Inference(format!(
                "embedding dimension {} does not match concept dimension {}",
                vector.len(),
                self.dimension()
            )));
        }

        Ok(self
            .categories
            .iter()
            .cloned()
            .zip(self.concepts.rows())
            .map(|(name, concept)| (name, cosine_similarity(vector.view(), concept)))
            .collect())
    }

    pub fn dimension(&self) -> usize {
        self.concepts.ncols()
    }
}
