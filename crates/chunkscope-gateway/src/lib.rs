//! # ChunkScope Gateway
//!
//! HTTP surface for the retrieval service:
//! - `POST /api/v1/retrieve`: scoped keyword retrieval
//! - `GET  /api/v1/corpus/stats`: corpus row counts
//! - `GET  /health`

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
