//! In-crate fakes for the embedding and index ports.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    Document, DomainError, Embedding, MetadataFilter, ProductIdentity, ProductMetadata,
    ReviewMetadata, ScoredDocument,
};

pub struct StubEmbedding {
    fail: bool,
    calls: AtomicUsize,
}

impl StubEmbedding {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for StubEmbedding {
    async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::unavailable("embedding backend offline"));
        }
        Ok(Embedding::new(vec![1.0, 0.0, 0.0]))
    }

    fn dimension(&self) -> usize {
        3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Supported,
    Unsupported,
    Failing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub top_k: usize,
    pub filter: Option<MetadataFilter>,
}

/// Returns a fixed candidate list in order, truncated to `top_k`.
pub struct ScriptedIndex<M> {
    candidates: Vec<ScoredDocument<M>>,
    filter_mode: FilterMode,
    offline: bool,
    calls: Mutex<Vec<SearchCall>>,
}

impl<M> ScriptedIndex<M> {
    pub fn new(candidates: Vec<ScoredDocument<M>>) -> Self {
        Self {
            candidates,
            filter_mode: FilterMode::Supported,
            offline: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<M> VectorIndex<M> for ScriptedIndex<M>
where
    M: ProductIdentity + Clone + Send + Sync,
{
    async fn search(
        &self,
        _query: &Embedding,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredDocument<M>>, DomainError> {
        self.calls.lock().unwrap().push(SearchCall {
            top_k,
            filter: filter.cloned(),
        });

        if self.offline {
            return Err(DomainError::unavailable("connection refused"));
        }

        match (filter, self.filter_mode) {
            (None, _) => Ok(self.candidates.iter().take(top_k).cloned().collect()),
            (Some(filter), FilterMode::Supported) => Ok(self
                .candidates
                .iter()
                .filter(|c| filter.matches(&c.document.metadata))
                .take(top_k)
                .cloned()
                .collect()),
            (Some(_), FilterMode::Unsupported) => {
                Err(DomainError::filter_unsupported("scripted index"))
            }
            (Some(_), FilterMode::Failing) => {
                Err(DomainError::unavailable("filtered query timed out"))
            }
        }
    }

    fn supports_filter(&self) -> bool {
        self.filter_mode != FilterMode::Unsupported
    }
}

pub fn product(id: &str, product_id: &str, score: Option<f32>) -> ScoredDocument<ProductMetadata> {
    ScoredDocument::new(
        Document::new(
            id,
            format!("chunk {id} of {product_id}"),
            ProductMetadata {
                product_id: Some(product_id.to_string()),
                product_name: Some(format!("Product {product_id}")),
                chunk_id: Some(id.to_string()),
                ..Default::default()
            },
        ),
        score,
    )
}

pub fn review(
    id: &str,
    product_id: Option<&str>,
    product_name: Option<&str>,
) -> ScoredDocument<ReviewMetadata> {
    ScoredDocument::new(
        Document::new(
            id,
            format!("review {id}"),
            ReviewMetadata {
                product_id: product_id.map(Into::into),
                product_name: product_name.map(Into::into),
                rating: Some(4.0),
                review_id: Some(id.to_string()),
                ..Default::default()
            },
        ),
        Some(0.5),
    )
}
