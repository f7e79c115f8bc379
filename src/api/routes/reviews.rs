use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, middleware::RequestId, state::AppState};
use crate::domain::{ProductSelector, ReviewHit, ReviewMetadata};

#[derive(Debug, Deserialize)]
pub struct RetrieveReviewsRequest {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub k: Option<i64>,
    #[serde(default)]
    pub include_sources: bool,
}

/// Review text and full metadata are only sent when `include_sources` is set.
#[derive(Debug, Serialize)]
pub struct ReviewResult {
    pub review_id: Option<String>,
    pub rating: Option<f64>,
    pub score: Option<f32>,
    pub sentiment_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReviewMetadata>,
}

impl ReviewResult {
    fn from_hit(hit: ReviewHit, include_sources: bool) -> Self {
        let ReviewHit {
            review_text,
            rating,
            metadata,
            score,
        } = hit;

        Self {
            review_id: metadata.review_id.clone(),
            rating,
            score,
            sentiment_label: metadata.review_sentiment_label.clone(),
            review_text: include_sources.then_some(review_text),
            metadata: include_sources.then_some(metadata),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RetrieveReviewsResponse {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub count: usize,
    pub results: Vec<ReviewResult>,
}

pub async fn retrieve_reviews(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    payload: Result<Json<RetrieveReviewsRequest>, JsonRejection>,
) -> Result<Json<RetrieveReviewsResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::from_rejection(&request_id, &e))?;
    let retrieval = &state.config.retrieval;
    let k = request.k.unwrap_or(retrieval.default_review_k);

    // Same checks the service runs, without touching any backend.
    let selector = ProductSelector::new(request.product_id, request.product_name)
        .map_err(|e| ApiError::from_domain(&request_id, &e))?;
    retrieval
        .limits()
        .check_review_k(k)
        .map_err(|e| ApiError::from_domain(&request_id, &e))?;

    let product_id = selector.product_id().map(String::from);
    let product_name = selector.product_name().map(String::from);

    let hits = match state.resources.service().await {
        Ok(service) => {
            service
                .find_reviews(product_id.clone(), product_name.clone(), k)
                .await
        }
        Err(e) => Err(e),
    }
    .map_err(|e| ApiError::from_domain(&request_id, &e))?;

    let results: Vec<ReviewResult> = hits
        .into_iter()
        .map(|hit| ReviewResult::from_hit(hit, request.include_sources))
        .collect();

    Ok(Json(RetrieveReviewsResponse {
        product_id,
        product_name,
        count: results.len(),
        results,
    }))
}
