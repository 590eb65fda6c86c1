//! Error types for SPICEsense.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
