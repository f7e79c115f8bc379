use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    DomainError, ProductHit, ProductMetadata, ScoredDocument,
};

pub const DEFAULT_CANDIDATE_POOL: usize = 20;

/// Finds the distinct products closest to a free-text query.
pub struct ProductRetriever {
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex<ProductMetadata>>,
    candidate_pool: usize,
}

impl ProductRetriever {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex<ProductMetadata>>,
    ) -> Self {
        Self {
            embedding,
            index,
            candidate_pool: DEFAULT_CANDIDATE_POOL,
        }
    }

    pub fn with_candidate_pool(mut self, candidate_pool: usize) -> Self {
        self.candidate_pool = candidate_pool.max(1);
        self
    }

    /// Returns at most `k` hits, one per product, best score first.
    ///
    /// A blank query is a no-op and never reaches the index.
    #[instrument(skip(self))]
    pub async fn find_products(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ProductHit>, DomainError> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedding.embed(query).await?;
        let candidates = self
            .index
            .search(&embedding, self.candidate_pool.max(k), None)
            .await?;
        let fetched = candidates.len();

        let mut hits = dedup_by_product(candidates);
        hits.sort_by(|a, b| compare_scores(a.score, b.score));
        hits.truncate(k);

        debug!(fetched, returned = hits.len(), "product candidates ranked");
        Ok(hits)
    }
}

/// Keeps one hit per product: the lowest score, or the first seen when
/// scores tie or are missing. Encounter order of the survivors is preserved.
fn dedup_by_product(candidates: Vec<ScoredDocument<ProductMetadata>>) -> Vec<ProductHit> {
    let mut hits: Vec<ProductHit> = Vec::with_capacity(candidates.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        let Some(key) = candidate.document.product_key().map(str::to_owned) else {
            debug!(id = %candidate.document.id, "skipping product chunk without identity");
            continue;
        };

        match slots.get(&key).copied() {
            Some(slot) => {
                if compare_scores(candidate.score, hits[slot].score) == Ordering::Less {
                    hits[slot] = candidate.into();
                }
            }
            None => {
                slots.insert(key, hits.len());
                hits.push(candidate.into());
            }
        }
    }

    hits
}

/// Ascending distance; a missing score ranks after any real one.
fn compare_scores(a: Option<f32>, b: Option<f32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, ScriptedIndex, StubEmbedding};
    use std::collections::HashSet;

    fn retriever(
        index: Arc<ScriptedIndex<ProductMetadata>>,
        embedding: Arc<StubEmbedding>,
    ) -> ProductRetriever {
        ProductRetriever::new(embedding, index)
    }

    #[tokio::test]
    async fn test_best_chunk_per_product_ranked() {
        let index = Arc::new(ScriptedIndex::new(vec![
            product("p1-a", "P1", Some(0.3)),
            product("p1-b", "P1", Some(0.1)),
            product("p2", "P2", Some(0.5)),
        ]));
        let embedding = Arc::new(StubEmbedding::new());

        let hits = retriever(index.clone(), embedding)
            .find_products("fire tablet", 2)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].product_id.as_deref(), Some("P1"));
        assert_eq!(hits[0].score, Some(0.1));
        assert_eq!(hits[0].snippet, "chunk p1-b of P1");
        assert_eq!(hits[1].product_id.as_deref(), Some("P2"));
        assert_eq!(hits[1].score, Some(0.5));
        assert_eq!(index.calls()[0].top_k, DEFAULT_CANDIDATE_POOL);
        assert_eq!(index.calls()[0].filter, None);
    }

    #[tokio::test]
    async fn test_lower_score_survives_regardless_of_order() {
        for order in [[0.2, 0.8], [0.8, 0.2]] {
            let index = Arc::new(ScriptedIndex::new(vec![
                product("a", "P1", Some(order[0])),
                product("b", "P1", Some(order[1])),
            ]));
            let hits = retriever(index, Arc::new(StubEmbedding::new()))
                .find_products("echo", 5)
                .await
                .unwrap();

            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].score, Some(0.2));
        }
    }

    #[tokio::test]
    async fn test_no_duplicate_products() {
        let candidates = (0..20)
            .map(|i| product(&format!("c{i}"), &format!("P{}", i % 4), Some(i as f32 / 20.0)))
            .collect();
        let index = Arc::new(ScriptedIndex::new(candidates));

        let hits = retriever(index, Arc::new(StubEmbedding::new()))
            .find_products("kindle", 10)
            .await
            .unwrap();

        let ids: HashSet<_> = hits.iter().map(|h| h.product_id.clone()).collect();
        assert_eq!(hits.len(), 4);
        assert_eq!(ids.len(), hits.len());
    }

    #[tokio::test]
    async fn test_missing_scores_keep_first_seen() {
        let index = Arc::new(ScriptedIndex::new(vec![
            product("p2", "P2", None),
            product("p1-a", "P1", None),
            product("p1-b", "P1", None),
        ]));

        let hits = retriever(index, Arc::new(StubEmbedding::new()))
            .find_products("speaker", 3)
            .await
            .unwrap();

        let ids: Vec<_> = hits.iter().map(|h| h.metadata.chunk_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["p2", "p1-a"]);
    }

    #[tokio::test]
    async fn test_blank_query_skips_backends() {
        let index = Arc::new(ScriptedIndex::new(vec![product("a", "P1", Some(0.1))]));
        let embedding = Arc::new(StubEmbedding::new());
        let retriever = retriever(index.clone(), embedding.clone());

        assert!(retriever.find_products("", 3).await.unwrap().is_empty());
        assert!(retriever.find_products("   \t", 3).await.unwrap().is_empty());
        assert!(index.calls().is_empty());
        assert_eq!(embedding.calls(), 0);
    }

    #[tokio::test]
    async fn test_never_pads() {
        let index = Arc::new(ScriptedIndex::new(vec![product("a", "P1", Some(0.1))]));
        let hits = retriever(index, Arc::new(StubEmbedding::new()))
            .find_products("anything", 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_pool_grows_with_large_k() {
        let index = Arc::new(ScriptedIndex::new(Vec::new()));
        retriever(index.clone(), Arc::new(StubEmbedding::new()))
            .find_products("anything", 40)
            .await
            .unwrap();
        assert_eq!(index.calls()[0].top_k, 40);
    }

    #[tokio::test]
    async fn test_backend_failures_propagate() {
        let index = Arc::new(ScriptedIndex::new(Vec::new()).offline());
        let err = retriever(index, Arc::new(StubEmbedding::new()))
            .find_products("echo", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RetrievalUnavailable(_)));

        let index = Arc::new(ScriptedIndex::new(Vec::new()));
        let err = retriever(index.clone(), Arc::new(StubEmbedding::failing()))
            .find_products("echo", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RetrievalUnavailable(_)));
        assert!(index.calls().is_empty());
    }

    #[tokio::test]
    async fn test_nan_score_ranks_last() {
        let index = Arc::new(ScriptedIndex::new(vec![
            product("a", "P1", Some(f32::NAN)),
            product("b", "P2", Some(0.4)),
            product("c", "P3", Some(0.1)),
        ]));
        let hits = retriever(index, Arc::new(StubEmbedding::new()))
            .find_products("anything", 3)
            .await
            .unwrap();

        let ids: Vec<_> = hits.iter().map(|h| h.product_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["P3", "P2", "P1"]);
    }
}
