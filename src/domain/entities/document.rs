use serde::{Deserialize, Serialize};

/// Identity fields every indexed document exposes for grouping and filtering.
pub trait ProductIdentity {
    fn product_id(&self) -> Option<&str>;
    fn product_name(&self) -> Option<&str>;
}

/// Product-level sentiment aggregates computed during indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSummary {
    pub positive_count: Option<u32>,
    pub neutral_count: Option<u32>,
    pub negative_count: Option<u32>,
    pub positive_pct: Option<f64>,
    pub neutral_pct: Option<f64>,
    pub negative_pct: Option<f64>,
    pub avg_sentiment_score: Option<f64>,
    pub num_reviews_used: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub chunk_id: Option<String>,
    #[serde(default)]
    pub chunk_length: Option<u32>,
    #[serde(flatten)]
    pub sentiment: SentimentSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub chunk_id: Option<String>,
    #[serde(default)]
    pub chunk_length: Option<u32>,
    #[serde(default)]
    pub review_sentiment_label: Option<String>,
    #[serde(default)]
    pub review_sentiment_score: Option<f64>,
    #[serde(flatten)]
    pub sentiment: SentimentSummary,
}

impl ProductIdentity for ProductMetadata {
    fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }
}

impl ProductIdentity for ReviewMetadata {
    fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }
}

/// An indexed unit of text. `id` is the index's own identifier for the
/// stored point and is what deduplication compares, never the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<M> {
    pub id: String,
    pub text: String,
    pub metadata: M,
}

impl<M> Document<M> {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: M) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }
}

impl<M: ProductIdentity> Document<M> {
    /// The key a document groups under: `product_id`, else `product_name`.
    pub fn product_key(&self) -> Option<&str> {
        self.metadata
            .product_id()
            .or_else(|| self.metadata.product_name())
    }
}

/// A search candidate. `score` is a distance (lower is better) or `None`
/// when the backend does not expose one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument<M> {
    pub document: Document<M>,
    pub score: Option<f32>,
}

impl<M> ScoredDocument<M> {
    pub fn new(document: Document<M>, score: Option<f32>) -> Self {
        Self { document, score }
    }
}
