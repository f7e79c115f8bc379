mod embedding;
mod vector_index;

pub use embedding::EmbeddingService;
pub use vector_index::VectorIndex;
