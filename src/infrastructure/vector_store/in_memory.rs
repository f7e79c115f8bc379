use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{
    ports::VectorIndex, Document, DomainError, Embedding, MetadataFilter, ProductIdentity,
    ScoredDocument,
};

/// Brute-force cosine index, for local runs and tests.
///
/// Scores are cosine distances. Filtering can be switched off to behave
/// like a backend without metadata predicates.
pub struct InMemoryVectorIndex<M> {
    entries: RwLock<Vec<(Document<M>, Embedding)>>,
    filtering: bool,
}

impl<M> InMemoryVectorIndex<M> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            filtering: true,
        }
    }

    pub fn without_filtering(mut self) -> Self {
        self.filtering = false;
        self
    }

    /// Replaces any entry with the same document id.
    pub fn insert(&self, document: Document<M>, embedding: Embedding) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        entries.retain(|(d, _)| d.id != document.id);
        entries.push((document, embedding));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M> Default for InMemoryVectorIndex<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M> VectorIndex<M> for InMemoryVectorIndex<M>
where
    M: ProductIdentity + Clone + Send + Sync,
{
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredDocument<M>>, DomainError> {
        if filter.is_some() && !self.filtering {
            return Err(DomainError::filter_unsupported(
                "in-memory index created without filtering",
            ));
        }

        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut scored: Vec<(f32, &Document<M>)> = entries
            .iter()
            .filter(|(document, _)| filter.map_or(true, |f| f.matches(&document.metadata)))
            .map(|(document, embedding)| (query.cosine_distance(embedding), document))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, document)| ScoredDocument::new(document.clone(), Some(distance)))
            .collect())
    }

    fn supports_filter(&self) -> bool {
        self.filtering
    }
}
