//! Product and review retrieval over vector indexes with sentiment metadata.
//!
//! `domain` holds entities and ports, `application` the retrievers,
//! `infrastructure` the Qdrant, in-memory and OpenAI adapters, and `api`
//! the axum boundary.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;
