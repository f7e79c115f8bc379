use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, middleware::RequestId, state::AppState};
use crate::domain::{ProductHit, ProductMetadata};

#[derive(Debug, Deserialize)]
pub struct RetrieveProductsRequest {
    pub query: String,
    pub k: Option<i64>,
}

/// `score` is a distance: lower is better.
#[derive(Debug, Serialize)]
pub struct ProductResult {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub score: Option<f32>,
    pub text: String,
    pub metadata: ProductMetadata,
}

impl From<ProductHit> for ProductResult {
    fn from(hit: ProductHit) -> Self {
        Self {
            product_id: hit.product_id,
            product_name: hit.product_name,
            score: hit.score,
            text: hit.snippet,
            metadata: hit.metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RetrieveProductsResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<ProductResult>,
}

pub async fn retrieve_products(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<RetrieveProductsRequest>, JsonRejection>,
) -> Result<Json<RetrieveProductsResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(&request_id, &e))?;
    let retrieval = &state.config.retrieval;
    let k = request.k.unwrap_or(retrieval.default_product_k);

    // Reject bad arguments before any backend is initialized.
    retrieval
        .limits()
        .check_product_k(k)
        .map_err(|e| ApiError::from_domain(&request_id, &e))?;

    // A blank query is a no-op, even while the backends are down.
    if request.query.trim().is_empty() {
        return Ok(Json(RetrieveProductsResponse {
            query: request.query,
            count: 0,
            results: Vec::new(),
        }));
    }

    let hits = match state.resources.service().await {
        Ok(service) => service.find_products(&request.query, k).await,
        Err(e) => Err(e),
    }
    .map_err(|e| ApiError::from_domain(&request_id, &e))?;

    let results: Vec<ProductResult> = hits.into_iter().map(ProductResult::from).collect();
    Ok(Json(RetrieveProductsResponse {
        query: request.query,
        count: results.len(),
        results,
    }))
}
