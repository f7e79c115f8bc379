use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub products_collection: String,
    pub reviews_collection: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Ready once the embedding provider and both indexes are initialized and
/// the indexes answer a ping.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store = &state.config.vector_store;
    let ready = match state.resources.check_ready().await {
        Ok(()) => true,
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "readiness check failed");
            false
        }
    };

    let response = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" }.into(),
        products_collection: store.products_collection.clone(),
        reviews_collection: store.reviews_collection.clone(),
    };

    if ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
