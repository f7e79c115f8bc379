use crate::domain::{errors::DomainError, Embedding, MetadataFilter, ScoredDocument};
use async_trait::async_trait;

/// Read-only nearest-neighbor access to one corpus.
///
/// Results come back closest first with distance scores (lower is better).
/// A backend that cannot evaluate `filter` reports
/// [`DomainError::FilterUnsupported`] instead of ignoring it.
#[async_trait]
pub trait VectorIndex<M>: Send + Sync
where
    M: Send + Sync,
{
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredDocument<M>>, DomainError>;

    fn supports_filter(&self) -> bool {
        true
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
