use serde::{Deserialize, Serialize};

use super::document::{ProductMetadata, ReviewMetadata, ScoredDocument};

/// A ranked product. `score` is a distance: lower is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductHit {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub score: Option<f32>,
    pub snippet: String,
    pub metadata: ProductMetadata,
}

impl From<ScoredDocument<ProductMetadata>> for ProductHit {
    fn from(candidate: ScoredDocument<ProductMetadata>) -> Self {
        let ScoredDocument { document, score } = candidate;
        Self {
            product_id: document.metadata.product_id.clone(),
            product_name: document.metadata.product_name.clone(),
            score,
            snippet: document.text,
            metadata: document.metadata,
        }
    }
}

/// A review snippet belonging to one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewHit {
    pub review_text: String,
    pub rating: Option<f64>,
    pub metadata: ReviewMetadata,
    pub score: Option<f32>,
}

impl From<ScoredDocument<ReviewMetadata>> for ReviewHit {
    fn from(candidate: ScoredDocument<ReviewMetadata>) -> Self {
        let ScoredDocument { document, score } = candidate;
        Self {
            review_text: document.text,
            rating: document.metadata.rating,
            metadata: document.metadata,
            score,
        }
    }
}
