//! SPICEsense Core — taxonomy store, configuration, error types.

pub mod config;
pub mod error;
pub mod taxonomy;

pub use config::{ClassifierConfig, DataPaths, SpiceSenseConfig};
pub use error::{Error, Result};
pub use taxonomy::{Category, Taxonomy, UNCATEGORIZED};
