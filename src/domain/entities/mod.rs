mod document;
mod embedding;
mod filter;
mod hit;

pub use document::{
    Document, ProductIdentity, ProductMetadata, ReviewMetadata, ScoredDocument, SentimentSummary,
};
pub use embedding::Embedding;
pub use filter::{MetadataFilter, ProductSelector};
pub use hit::{ProductHit, ReviewHit};
