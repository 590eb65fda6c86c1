//! Shared application state.

use std::sync::Arc;

use spicesense_classify::SpicesClassifier;
use spicesense_core::SpiceSenseConfig;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: SpiceSenseConfig,
    pub classifier: Arc<SpicesClassifier>,
}

impl AppState {
    pub fn new(config: SpiceSenseConfig, classifier: SpicesClassifier) -> Self {
        Self {
            config,
            classifier: Arc::new(classifier),
        }
    }
}
