//! ONNX-based embedding engine using all-MiniLM-L6-v2.
//!
//! Loads a SentenceTransformers ONNX model and tokenizer to generate
//! 384-dimensional float32 embeddings. Requires the `onnx` feature.

use ndarray::Array1;

/// Reduce a model output tensor to a single sentence vector.
///
/// `shape` is either `[1, seq_len, dim]` (token embeddings, mean-pooled with
/// the attention mask) or `[1, dim]` (already pooled).
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
pub(crate) fn pool_output(shape: &[i64], data: &[f32], attention_mask: &[u32]) -> Option<Array1<f32>> {
    match *shape {
        [_, seq_len, dim] => {
            let (seq_len, dim) = (seq_len as usize, dim as usize);
            if data.len() < seq_len * dim {
                return None;
            }
            let mask_sum: f32 = attention_mask.iter().take(seq_len).map(|&m| m as f32).sum();
            if mask_sum < 1e-9 {
                return None;
            }

            let mut pooled = Array1::<f32>::zeros(dim);
            for (i, &m) in attention_mask.iter().take(seq_len).enumerate() {
                if m == 0 {
                    continue;
                }
                let row = &data[i * dim..(i + 1) * dim];
                for (acc, &v) in pooled.iter_mut().zip(row) {
                    *acc += v * m as f32;
                }
            }
            Some(pooled / mask_sum)
        }
        [_, dim] => {
            let dim = dim as usize;
            (data.len() >= dim).then(|| Array1::from_vec(data[..dim].to_vec()))
        }
        _ => None,
    }
}

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use spicesense_core::{Error, Result};
    use tokenizers::Tokenizer;
    use tracing::{debug, info, warn};

    use super::pool_output;
    use crate::cache::EmbeddingCache;
    use crate::embedder::{EmbedderBackend, EmbeddingResult, DEFAULT_DIM};

    /// Maximum sequence length for the model.
    const MAX_SEQ_LEN: usize = 512;

    /// ONNX embedding engine using all-MiniLM-L6-v2.
    pub struct OnnxEmbedder {
        // ort sessions need `&mut` to run; inference is serialized here.
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        cache: EmbeddingCache,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load an ONNX model and tokenizer from the given directory.
        ///
        /// Expects:
        /// - `model_dir/model.onnx` — the ONNX model file
        /// - `model_dir/tokenizer.json` — the HuggingFace tokenizer
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            for required in [&model_path, &tokenizer_path] {
                if !required.exists() {
                    return Err(Error::CapabilityUnavailable(format!(
                        "missing {}",
                        required.display()
                    )));
                }
            }

            // With load-dynamic, ORT_DYLIB_PATH must point to libonnxruntime.so
            ort::init().commit();

            let unavailable = |what: &str, e: &dyn std::fmt::Display| {
                Error::CapabilityUnavailable(format!("{}: {}", what, e))
            };

            let session = Session::builder()
                .map_err(|e| unavailable("session builder", &e))?
                .with_intra_threads(2)
                .map_err(|e| unavailable("intra threads", &e))?
                .commit_from_file(&model_path)
                .map_err(|e| unavailable("load model", &e))?;

            let tokenizer =
                Tokenizer::from_file(&tokenizer_path).map_err(|e| unavailable("load tokenizer", &e))?;

            info!(
                "ONNX embedder loaded: dim={}, model={}",
                DEFAULT_DIM,
                model_path.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                cache: EmbeddingCache::default(),
                dimension: DEFAULT_DIM,
            })
        }

        fn infer(&self, text: &str) -> Result<Array1<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| Error::Inference(format!("tokenization failed: {}", e)))?;

            let seq_len = encoding.get_ids().len().min(MAX_SEQ_LEN);
            let input_ids = &encoding.get_ids()[..seq_len];
            let attention_mask = &encoding.get_attention_mask()[..seq_len];

            let to_tensor = |values: Vec<i64>| {
                Tensor::from_array(([1usize, seq_len], values))
                    .map_err(|e| Error::Inference(format!("tensor creation failed: {}", e)))
            };
            let ids = to_tensor(input_ids.iter().map(|&id| id as i64).collect())?;
            let mask = to_tensor(attention_mask.iter().map(|&m| m as i64).collect())?;
            let type_ids = to_tensor(vec![0i64; seq_len])?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids, mask, type_ids])
                .map_err(|e| Error::Inference(format!("ONNX inference failed: {}", e)))?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("output extraction failed: {}", e)))?;
            let shape: Vec<i64> = shape.iter().copied().collect();

            pool_output(&shape, data, attention_mask)
                .ok_or_else(|| Error::Inference(format!("unexpected output shape {:?}", shape)))
        }
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Option<EmbeddingResult> {
            if let Some(cached) = self.cache.get(text) {
                return Some(EmbeddingResult {
                    embedding: cached,
                    cached: true,
                });
            }

            match self.infer(text) {
                Ok(embedding) => {
                    self.cache.put(text.to_string(), embedding.clone());
                    Some(EmbeddingResult {
                        embedding,
                        cached: false,
                    })
                }
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        }

        fn embed_batch(&self, texts: &[&str]) -> Vec<Option<EmbeddingResult>> {
            let results: Vec<_> = texts.iter().map(|t| self.embed(t)).collect();
            let (hits, misses) = self.cache.stats();
            debug!("Embedded batch of {} (cache hits={}, misses={})", texts.len(), hits, misses);
            results
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn is_available(&self) -> bool {
            true
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;
