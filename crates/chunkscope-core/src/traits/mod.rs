//! Core traits.

pub mod corpus;

pub use corpus::CorpusStore;
