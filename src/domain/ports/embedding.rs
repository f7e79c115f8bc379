use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Maps text to a fixed-dimension vector.
///
/// Implementations must return an error when the backend is unavailable
/// rather than a placeholder vector.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    fn dimension(&self) -> usize;
}
