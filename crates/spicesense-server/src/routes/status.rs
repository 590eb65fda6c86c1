//! Status and taxonomy routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(get_status))
        .route("/taxonomy", get(get_taxonomy))
}

/// GET /api/status — classifier capabilities and policy.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let classifier = &state.classifier;
    let config = classifier.config();

    Json(serde_json::json!({
        "status": "healthy",
        "service": "spicesense",
        "port": state.config.port,
        "semanticEnabled": classifier.semantic_enabled(),
        "embeddingDimension": classifier.embedding_dimension(),
        "threshold": config.threshold,
        "fallbackTopK": config.fallback_top_k,
        "categories": classifier.taxonomy().len(),
    }))
}

/// GET /api/taxonomy — ordered categories and their trigger phrases.
async fn get_taxonomy(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "categories": state.classifier.taxonomy(),
    }))
}
