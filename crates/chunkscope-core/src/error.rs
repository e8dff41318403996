//! Error types shared by every ChunkScope crate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ChunkScopeError>;

#[derive(Debug, Error)]
pub enum ChunkScopeError {
    /// Malformed or incomplete request. Raised before any store query runs.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Well-formed request naming a resource that does not exist (or is inactive).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The corpus store is unreachable or a query failed.
    #[error("Store failure: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChunkScopeError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store_failure",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// True for errors caused by the caller rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}
