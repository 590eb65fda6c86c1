//! Bounded LRU cache of text embeddings.
//!
//! Event titles repeat heavily across a batch (recurring workshops, weekly
//! socials), so the ONNX embedder keeps recent vectors keyed by input text.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array1;
use parking_lot::Mutex;

/// Default number of cached embeddings.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Thread-safe LRU cache for embeddings.
pub struct EmbeddingCache {
    inner: Mutex<CacheInner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct CacheInner {
    entries: HashMap<String, Array1<f32>>,
    /// Least recently used at the front.
    recency: VecDeque<String>,
    capacity: usize,
}

impl CacheInner {
    fn touch(&mut self, text: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == text) {
            if let Some(key) = self.recency.remove(pos) {
                self.recency.push_back(key);
            }
        }
    }
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` embeddings. A capacity of
    /// zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(capacity),
                recency: VecDeque::with_capacity(capacity),
                capacity,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, text: &str) -> Option<Array1<f32>> {
        let mut inner = self.inner.lock();
        let found = inner.entries.get(text).cloned();
        match found {
            Some(embedding) => {
                inner.touch(text);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(embedding)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, text: String, embedding: Array1<f32>) {
        let mut inner = self.inner.lock();
        if inner.capacity == 0 {
            return;
        }

        if inner.entries.insert(text.clone(), embedding).is_some() {
            inner.touch(&text);
            return;
        }

        inner.recency.push_back(text);
        while inner.entries.len() > inner.capacity {
            match inner.recency.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
