use tracing::instrument;

use super::{ProductRetriever, ReviewRetriever};
use crate::domain::{DomainError, ProductHit, ProductSelector, ReviewHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalLimits {
    pub max_product_k: usize,
    pub max_review_k: usize,
}

impl RetrievalLimits {
    pub fn check_product_k(&self, k: i64) -> Result<usize, DomainError> {
        check_k(k, self.max_product_k)
    }

    pub fn check_review_k(&self, k: i64) -> Result<usize, DomainError> {
        check_k(k, self.max_review_k)
    }
}

impl Default for RetrievalLimits {
    fn default() -> Self {
        Self {
            max_product_k: 50,
            max_review_k: 100,
        }
    }
}

/// Stable entry point for HTTP handlers, CLIs and agents.
///
/// Arguments are validated here, before any collaborator is touched.
/// Scores in every returned hit are distances: lower is better, `None`
/// when the backend did not report one.
pub struct RetrievalService {
    products: ProductRetriever,
    reviews: ReviewRetriever,
    limits: RetrievalLimits,
}

impl RetrievalService {
    pub fn new(products: ProductRetriever, reviews: ReviewRetriever) -> Self {
        Self {
            products,
            reviews,
            limits: RetrievalLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RetrievalLimits) -> Self {
        self.limits = limits;
        self
    }

    #[instrument(skip(self))]
    pub async fn find_products(
        &self,
        query: &str,
        k: i64,
    ) -> Result<Vec<ProductHit>, DomainError> {
        let k = self.limits.check_product_k(k)?;
        self.products.find_products(query, k).await
    }

    #[instrument(skip(self))]
    pub async fn find_reviews(
        &self,
        product_id: Option<String>,
        product_name: Option<String>,
        k: i64,
    ) -> Result<Vec<ReviewHit>, DomainError> {
        let selector = ProductSelector::new(product_id, product_name)?;
        let k = self.limits.check_review_k(k)?;
        self.reviews.find_reviews(&selector, k).await
    }
}

fn check_k(k: i64, max: usize) -> Result<usize, DomainError> {
    usize::try_from(k)
        .ok()
        .filter(|k| (1..=max).contains(k))
        .ok_or_else(|| {
            DomainError::invalid_argument(format!("k must be between 1 and {max}, got {k}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, review, ScriptedIndex, StubEmbedding};
    use std::sync::Arc;

    fn service() -> (RetrievalService, Arc<StubEmbedding>) {
        let embedding = Arc::new(StubEmbedding::new());
        let products = ProductRetriever::new(
            embedding.clone(),
            Arc::new(ScriptedIndex::new(vec![
                product("a", "P1", Some(0.2)),
                product("b", "P2", Some(0.4)),
            ])),
        );
        let reviews = ReviewRetriever::new(
            embedding.clone(),
            Arc::new(ScriptedIndex::new(vec![review("r1", Some("P1"), None)])),
        );
        (RetrievalService::new(products, reviews), embedding)
    }

    #[tokio::test]
    async fn test_missing_identifiers_rejected_for_every_k() {
        let (service, embedding) = service();
        for k in [-1, 0, 1, 5, 100, 1000] {
            let err = service.find_reviews(None, None, k).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "k={k}");
        }
        assert_eq!(embedding.calls(), 0);
    }

    #[tokio::test]
    async fn test_k_range_enforced() {
        let (service, embedding) = service();

        for k in [0, -3, 51] {
            let err = service.find_products("echo", k).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "k={k}");
        }
        let err = service
            .find_reviews(Some("P1".into()), None, 101)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert_eq!(embedding.calls(), 0);

        assert_eq!(service.find_products("echo", 50).await.unwrap().len(), 2);
        assert_eq!(
            service
                .find_reviews(Some("P1".into()), None, 100)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_custom_limits() {
        let (service, _) = service();
        let service = service.with_limits(RetrievalLimits {
            max_product_k: 1,
            max_review_k: 1,
        });

        assert!(service.find_products("echo", 2).await.is_err());
        assert_eq!(service.find_products("echo", 1).await.unwrap().len(), 1);
    }
}
