use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI embeddings through rig.
///
/// The client is built once, at construction, which fails with
/// `RetrievalUnavailable` when the API key is missing. Empty, all-zero or
/// wrong-sized vectors are rejected.
pub struct TextEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        require_api_key(|key| std::env::var(key).ok())?;

        Ok(Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

fn require_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<String, DomainError> {
    lookup(API_KEY_VAR)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            DomainError::unavailable(format!(
                "embedding backend not configured: {API_KEY_VAR} is not set"
            ))
        })
}

fn check(model: &str, dimension: usize, embedding: Embedding) -> Result<Embedding, DomainError> {
    if embedding.is_degenerate() {
        return Err(DomainError::unavailable(format!(
            "embedding model {model} returned an empty vector"
        )));
    }
    if embedding.dimension() != dimension {
        return Err(DomainError::unavailable(format!(
            "embedding model {model} returned {} dimensions, expected {dimension}",
            embedding.dimension()
        )));
    }
    Ok(embedding)
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text)
            .map_err(|e| DomainError::unavailable(e.to_string()))?
            .build()
            .await
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let embedding = embeddings
            .into_iter()
            .next()
            .map(|(_doc, emb)| {
                let vec_f32: Vec<f32> = emb.first().vec.into_iter().map(|x| x as f32).collect();
                Embedding::new(vec_f32)
            })
            .ok_or_else(|| DomainError::unavailable("No embedding returned"))?;

        check(&self.model, self.dimension, embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
