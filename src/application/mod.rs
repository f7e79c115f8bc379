//! Application layer - Use cases and orchestration.
//!
//! The retrievers rank and filter what the vector indexes return. They
//! depend on domain ports (traits) rather than concrete backends, so every
//! collaborator arrives through the constructor.

pub mod services;

pub use services::{ProductRetriever, RetrievalLimits, RetrievalService, ReviewRetriever};
