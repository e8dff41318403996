//! # ChunkScope Core
//!
//! Shared configuration, error type, case folding and the corpus store trait.

pub mod config;
pub mod error;
pub mod fold;
pub mod traits;

pub use config::ChunkScopeConfig;
pub use error::{ChunkScopeError, Result};
