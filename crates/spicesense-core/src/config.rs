//! Configuration and data directory layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default minimum cosine similarity for a semantic match.
pub const DEFAULT_THRESHOLD: f32 = 0.45;

/// Default number of soft suggestions returned when nothing clears the threshold.
pub const DEFAULT_FALLBACK_TOP_K: usize = 2;

/// Classification policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Attempt semantic scoring. Ignored when no embedding capability exists.
    pub use_semantic: bool,
    /// Minimum similarity to accept a semantic match.
    pub threshold: f32,
    /// How many top semantic categories to suggest when none clear `threshold`.
    pub fallback_top_k: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            use_semantic: true,
            threshold: DEFAULT_THRESHOLD,
            fallback_top_k: DEFAULT_FALLBACK_TOP_K,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(Error::Config(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.fallback_top_k == 0 {
            return Err(Error::Config("fallback_top_k must be at least 1".into()));
        }
        Ok(())
    }

    /// Overlay `SPICESENSE_*` environment variables onto the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_var("SPICESENSE_USE_SEMANTIC") {
            config.use_semantic = parse_bool(&v).ok_or_else(|| {
                Error::Config(format!("SPICESENSE_USE_SEMANTIC: invalid boolean '{}'", v))
            })?;
        }
        if let Some(v) = env_var("SPICESENSE_THRESHOLD") {
            config.threshold = v
                .parse()
                .map_err(|_| Error::Config(format!("SPICESENSE_THRESHOLD: invalid number '{}'", v)))?;
        }
        if let Some(v) = env_var("SPICESENSE_FALLBACK_TOP_K") {
            config.fallback_top_k = v.parse().map_err(|_| {
                Error::Config(format!("SPICESENSE_FALLBACK_TOP_K: invalid count '{}'", v))
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Paths under the SPICEsense data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Embedding model directory (`data/models/`), holds `model.onnx` and `tokenizer.json`.
    pub models: PathBuf,
    /// Optional taxonomy override (`data/taxonomy.json`).
    pub taxonomy_file: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            models: root.join("models"),
            taxonomy_file: root.join("taxonomy.json"),
            root,
        }
    }
}

/// Top-level SPICEsense configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiceSenseConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Classification policy.
    pub classifier: ClassifierConfig,
}

impl SpiceSenseConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = env_var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3004);

        Ok(Self {
            port,
            data_paths: DataPaths::new(data_dir),
            classifier: ClassifierConfig::from_env()?,
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
