//! Retrieval service: validates a request, resolves its scope, then walks the
//! strategy list until one strategy returns hits.
//!
//! ```text
//! request
//!   ↓ validate board/grade/subject, normalize keywords, resolve limit
//!   ↓ resolve scope (NotFound if board unknown or inactive)
//!   ↓ RelevanceRanker ── hits? ──→ assemble(fulltext)
//!   ↓ (empty)
//!   ↓ FallbackMatcher ── hits? ──→ assemble(fallback)
//!   ↓ (empty)
//! { chunks: [], message }
//! ```

use chunkscope_core::config::RetrievalConfig;
use chunkscope_core::error::Result;
use chunkscope_core::traits::corpus::CorpusStore;
use std::sync::Arc;

use crate::assemble::{RetrievalResponse, assemble};
use crate::keywords::normalize_keywords;
use crate::request::{RetrievalRequest, required};
use crate::scope::resolve_scope;
use crate::strategy::{RetrievalStrategy, default_strategies};

pub struct RetrievalService {
    store: Arc<dyn CorpusStore>,
    strategies: Vec<Box<dyn RetrievalStrategy>>,
    config: RetrievalConfig,
}

impl RetrievalService {
    /// Service with the default full-text → fallback policy.
    pub fn new(store: Arc<dyn CorpusStore>, config: RetrievalConfig) -> Self {
        Self::with_strategies(store, config, default_strategies())
    }

    pub fn with_strategies(
        store: Arc<dyn CorpusStore>,
        config: RetrievalConfig,
        strategies: Vec<Box<dyn RetrievalStrategy>>,
    ) -> Self {
        Self { store, strategies, config }
    }

    /// Run one retrieval. Read-only; strategies run strictly one after another.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalResponse> {
        // All request checks happen before the store sees anything
        let board = required(&request.board, "board")?;
        let grade = required(&request.grade, "grade")?;
        let subject = required(&request.subject, "subject")?;
        let keywords = normalize_keywords(request.seed_keywords.as_deref())?;
        let limit = request.effective_limit(&self.config)?;

        let (resolved, scope) =
            resolve_scope(self.store.as_ref(), board, grade, subject, request.chapter()).await?;

        for strategy in &self.strategies {
            let hits = strategy
                .retrieve(self.store.as_ref(), &scope, &keywords, limit)
                .await?;
            if hits.is_empty() {
                tracing::debug!(search_type = %strategy.search_type(), "no hits, trying next strategy");
                continue;
            }

            tracing::info!(
                store = self.store.name(),
                board = %resolved.name,
                grade,
                subject,
                keywords = keywords.len(),
                search_type = %strategy.search_type(),
                results = hits.len(),
                "🔎 retrieval served"
            );
            return Ok(assemble(strategy.search_type(), hits));
        }

        tracing::info!(
            store = self.store.name(),
            board = %resolved.name,
            grade,
            subject,
            keywords = keywords.len(),
            "🔎 retrieval found nothing"
        );
        Ok(RetrievalResponse::empty())
    }
}
