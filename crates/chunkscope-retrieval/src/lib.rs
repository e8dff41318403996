//! # ChunkScope Retrieval
//!
//! Scoped keyword retrieval over the educational corpus, in two phases:
//! relevance-ranked full-text first, substring fallback only when that finds
//! nothing. Both phases share one scope and one limit, and both results come
//! back in the same record shape tagged with the phase that served them.

pub mod assemble;
pub mod keywords;
pub mod request;
pub mod scope;
pub mod service;
pub mod strategy;

#[cfg(test)]
mod corpus_tests;

pub use assemble::{NO_CONTENT_MESSAGE, ResultRecord, RetrievalResponse};
pub use request::RetrievalRequest;
pub use service::RetrievalService;
pub use strategy::{FallbackMatcher, RelevanceRanker, RetrievalStrategy, SearchType};
