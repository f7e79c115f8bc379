use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    DomainError, Embedding, ProductSelector, ReviewHit, ReviewMetadata, ScoredDocument,
};

pub const DEFAULT_FALLBACK_POOL: usize = 50;

/// Outcome of the index-side filtered search. Hard failures travel in the
/// surrounding `Result`; everything here lets the caller continue.
#[derive(Debug)]
pub enum FilteredSearch {
    Matched(Vec<ScoredDocument<ReviewMetadata>>),
    Degraded(DomainError),
}

/// Finds review snippets for one product.
///
/// Searches the reviews index with an equality filter first. When the
/// index cannot filter, errors, or comes up short, widens to unfiltered
/// searches checked client-side: one round at `k` candidates, then one at
/// `max(fallback_pool, 2k)`.
pub struct ReviewRetriever {
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex<ReviewMetadata>>,
    fallback_pool: usize,
}

impl ReviewRetriever {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex<ReviewMetadata>>,
    ) -> Self {
        Self {
            embedding,
            index,
            fallback_pool: DEFAULT_FALLBACK_POOL,
        }
    }

    pub fn with_fallback_pool(mut self, fallback_pool: usize) -> Self {
        self.fallback_pool = fallback_pool;
        self
    }

    #[instrument(skip(self, selector), fields(
        product_id = selector.product_id(),
        product_name = selector.product_name()
    ))]
    pub async fn find_reviews(
        &self,
        selector: &ProductSelector,
        k: usize,
    ) -> Result<Vec<ReviewHit>, DomainError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedding.embed(selector.query_text()).await?;
        let mut collected = Collected::new(k);

        match self.filtered_search(&query, selector, k).await {
            FilteredSearch::Matched(docs) => {
                for doc in docs.into_iter().filter(|d| selector.matches(&d.document.metadata)) {
                    collected.push(doc);
                }
            }
            FilteredSearch::Degraded(reason) => {
                warn!(
                    kind = reason.kind(),
                    error = %reason,
                    "filtered review search degraded, falling back"
                );
            }
        }

        for pool in self.fallback_rounds(k) {
            if collected.is_full() {
                break;
            }

            let candidates = self.index.search(&query, pool, None).await?;
            let before = collected.len();
            for doc in candidates {
                if collected.is_full() {
                    break;
                }
                if selector.matches(&doc.document.metadata) {
                    collected.push(doc);
                }
            }
            debug!(pool, added = collected.len() - before, "fallback round finished");
        }

        Ok(collected.into_hits())
    }

    /// Index-side equality search. Never fails: anything the index
    /// rejects is reported as degraded.
    pub async fn filtered_search(
        &self,
        query: &Embedding,
        selector: &ProductSelector,
        k: usize,
    ) -> FilteredSearch {
        if !self.index.supports_filter() {
            return FilteredSearch::Degraded(DomainError::filter_unsupported(
                "reviews index does not support metadata filters",
            ));
        }

        match self
            .index
            .search(query, k, Some(selector.index_filter()))
            .await
        {
            Ok(docs) => FilteredSearch::Matched(docs),
            Err(e) => FilteredSearch::Degraded(e),
        }
    }

    fn fallback_rounds(&self, k: usize) -> [usize; 2] {
        [k, self.fallback_pool.max(k * 2)]
    }
}

/// Discovery-ordered results, unique by document id and capped at `k`.
struct Collected {
    limit: usize,
    seen: HashSet<String>,
    docs: Vec<ScoredDocument<ReviewMetadata>>,
}

impl Collected {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            docs: Vec::with_capacity(limit),
        }
    }

    fn push(&mut self, doc: ScoredDocument<ReviewMetadata>) {
        if !self.is_full() && self.seen.insert(doc.document.id.clone()) {
            self.docs.push(doc);
        }
    }

    fn len(&self) -> usize {
        self.docs.len()
    }

    fn is_full(&self) -> bool {
        self.docs.len() >= self.limit
    }

    fn into_hits(self) -> Vec<ReviewHit> {
        self.docs.into_iter().map(ReviewHit::from).collect()
    }
}
