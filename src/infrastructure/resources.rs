use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::application::{ProductRetriever, RetrievalService, ReviewRetriever};
use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    DomainError, ProductMetadata, ReviewMetadata,
};
use crate::infrastructure::config::{Config, EmbeddingConfig};
use crate::infrastructure::embedding::TextEmbedding;
use crate::infrastructure::vector_store::QdrantVectorIndex;

type ProductIndex = Arc<dyn VectorIndex<ProductMetadata>>;
type ReviewIndex = Arc<dyn VectorIndex<ReviewMetadata>>;

/// Builds the embedding provider from its config section.
pub type EmbeddingFactory =
    Arc<dyn Fn(&EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>, DomainError> + Send + Sync>;

/// Process-wide handles: the embedding provider, one index per corpus and
/// the service built on them.
///
/// Each handle is created on first use, at most once even under concurrent
/// first calls. A failed initialization is not cached; the next caller
/// retries it.
pub struct Resources {
    config: Config,
    embedding_factory: EmbeddingFactory,
    embedding: OnceCell<Arc<dyn EmbeddingService>>,
    products: OnceCell<ProductIndex>,
    reviews: OnceCell<ReviewIndex>,
    service: OnceCell<Arc<RetrievalService>>,
}

impl Resources {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            embedding_factory: Arc::new(openai_embedding),
            embedding: OnceCell::new(),
            products: OnceCell::new(),
            reviews: OnceCell::new(),
            service: OnceCell::new(),
        }
    }

    /// Holder around an already assembled service, e.g. with fake backends.
    pub fn with_service(config: Config, service: RetrievalService) -> Self {
        Self {
            service: OnceCell::from(Arc::new(service)),
            ..Self::new(config)
        }
    }

    /// Replaces the OpenAI provider, e.g. with a local model or a fake.
    pub fn with_embedding_factory(mut self, factory: EmbeddingFactory) -> Self {
        self.embedding_factory = factory;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn embedding(&self) -> Result<Arc<dyn EmbeddingService>, DomainError> {
        self.embedding
            .get_or_try_init(|| async {
                let embedding = (self.embedding_factory)(&self.config.embedding)?;
                info!(
                    model = %self.config.embedding.model,
                    dimension = embedding.dimension(),
                    "embedding provider ready"
                );
                Ok::<_, DomainError>(embedding)
            })
            .await
            .cloned()
    }

    pub async fn product_index(&self) -> Result<ProductIndex, DomainError> {
        self.products
            .get_or_try_init(|| async {
                let store = &self.config.vector_store;
                let index = QdrantVectorIndex::<ProductMetadata>::connect(
                    &store.url,
                    store.api_key.as_deref(),
                    &store.products_collection,
                )
                .await?;
                info!(collection = %store.products_collection, "products index connected");
                Ok::<_, DomainError>(Arc::new(index) as ProductIndex)
            })
            .await
            .cloned()
    }

    pub async fn review_index(&self) -> Result<ReviewIndex, DomainError> {
        self.reviews
            .get_or_try_init(|| async {
                let store = &self.config.vector_store;
                let index = QdrantVectorIndex::<ReviewMetadata>::connect(
                    &store.url,
                    store.api_key.as_deref(),
                    &store.reviews_collection,
                )
                .await?;
                info!(collection = %store.reviews_collection, "reviews index connected");
                Ok::<_, DomainError>(Arc::new(index) as ReviewIndex)
            })
            .await
            .cloned()
    }

    pub async fn service(&self) -> Result<Arc<RetrievalService>, DomainError> {
        self.service
            .get_or_try_init(|| async {
                let embedding = self.embedding().await?;
                let retrieval = &self.config.retrieval;

                let product_index = self.product_index().await?;
                let review_index = self.review_index().await?;

                let products = ProductRetriever::new(embedding.clone(), product_index)
                    .with_candidate_pool(retrieval.product_candidate_pool);
                let reviews = ReviewRetriever::new(embedding, review_index)
                    .with_fallback_pool(retrieval.review_fallback_pool);

                Ok::<_, DomainError>(Arc::new(
                    RetrievalService::new(products, reviews).with_limits(retrieval.limits()),
                ))
            })
            .await
            .cloned()
    }

    /// Pings both indexes. Only meaningful once the service is initialized;
    /// before that, initializing it is the check.
    pub async fn check_ready(&self) -> Result<(), DomainError> {
        if self.service.get().is_none() {
            self.service().await?;
        }
        if let Some(products) = self.products.get() {
            products.ping().await?;
        }
        if let Some(reviews) = self.reviews.get() {
            reviews.ping().await?;
        }
        Ok(())
    }
}

fn openai_embedding(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>, DomainError> {
    Ok(Arc::new(TextEmbedding::from_config(config)?))
}
