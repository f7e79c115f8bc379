pub mod config;
pub mod embedding;
pub mod resources;
pub mod vector_store;

pub use config::{Config, ConfigError};
pub use embedding::TextEmbedding;
pub use resources::{EmbeddingFactory, Resources};
pub use vector_store::{InMemoryVectorIndex, QdrantVectorIndex};
