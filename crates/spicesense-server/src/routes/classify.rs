//! Classification routes — single event and batch.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use spicesense_classify::{BatchOptions, Record};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/classify", post(classify))
        .route("/classify/batch", post(classify_batch))
}

#[derive(Deserialize)]
struct ClassifyRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Include the trigger phrases that fired.
    #[serde(default)]
    explain: bool,
}

/// POST /api/classify — classify one event.
async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Json<serde_json::Value> {
    let title = req.title.unwrap_or_default();
    let description = req.description.unwrap_or_default();
    let scores = state.classifier.classify(&title, &description);
    let labels: Vec<&str> = scores.ranked().into_iter().map(|(name, _)| name).collect();

    let mut body = serde_json::json!({
        "scores": scores,
        "labels": labels,
        "primary": scores.primary(),
    });
    if req.explain {
        body["matched_phrases"] = serde_json::json!(state.classifier.explain(&title, &description));
    }
    Json(body)
}

#[derive(Deserialize)]
struct BatchRequest {
    records: Vec<Record>,
    #[serde(flatten)]
    options: BatchOptions,
}

/// POST /api/classify/batch — classify records, adding SPICES columns.
async fn classify_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> impl IntoResponse {
    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || {
        classifier.classify_batch(&req.records, &req.options)
    })
    .await;

    match result {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "total": records.len(),
                "records": records,
            })),
        ),
        Err(e) => {
            tracing::error!("Batch classification task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "batch classification failed" })),
            )
        }
    }
}
