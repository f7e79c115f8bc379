mod product_search;
mod retrieval;
mod review_search;

pub use product_search::{ProductRetriever, DEFAULT_CANDIDATE_POOL};
pub use retrieval::{RetrievalLimits, RetrievalService};
pub use review_search::{FilteredSearch, ReviewRetriever, DEFAULT_FALLBACK_POOL};
