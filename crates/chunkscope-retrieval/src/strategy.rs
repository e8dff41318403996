//! Retrieval strategies, tried in order until one returns something.

use async_trait::async_trait;
use chunkscope_core::error::Result;
use chunkscope_core::traits::corpus::{ChunkHit, CorpusStore, KeywordExpression, Scope};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which path served a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Fulltext,
    Fallback,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fulltext => write!(f, "fulltext"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// One way of turning (scope, keywords, limit) into chunk hits.
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    fn search_type(&self) -> SearchType;

    /// Return at most `limit` hits inside `scope`. An empty vec is not an error.
    async fn retrieve(
        &self,
        store: &dyn CorpusStore,
        scope: &Scope,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<ChunkHit>>;
}

/// Primary path: disjunctive full-text match ranked by relevance.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelevanceRanker;

impl RelevanceRanker {
    /// All keywords OR-ed together.
    pub fn expression(keywords: &[String]) -> KeywordExpression {
        KeywordExpression::new(keywords.to_vec())
    }
}

/// Descending score, then ascending id.
fn by_relevance(a: &ChunkHit, b: &ChunkHit) -> Ordering {
    let sa = a.score.unwrap_or(f64::NEG_INFINITY);
    let sb = b.score.unwrap_or(f64::NEG_INFINITY);
    sb.total_cmp(&sa).then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl RetrievalStrategy for RelevanceRanker {
    fn search_type(&self) -> SearchType {
        SearchType::Fulltext
    }

    async fn retrieve(
        &self,
        store: &dyn CorpusStore,
        scope: &Scope,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        let expression = Self::expression(keywords);
        let mut hits = store.full_text_search(scope, &expression, limit).await?;

        // Backends promise this order already; re-sorting keeps ties stable for any backend
        hits.sort_by(by_relevance);
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Secondary path: case-insensitive substring match, unranked.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackMatcher;

#[async_trait]
impl RetrievalStrategy for FallbackMatcher {
    fn search_type(&self) -> SearchType {
        SearchType::Fallback
    }

    async fn retrieve(
        &self,
        store: &dyn CorpusStore,
        scope: &Scope,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        let mut hits = store.substring_search(scope, keywords, limit).await?;
        hits.truncate(limit);
        for hit in &mut hits {
            hit.score = None;
        }
        Ok(hits)
    }
}

/// The default policy: precise first, loose second.
pub fn default_strategies() -> Vec<Box<dyn RetrievalStrategy>> {
    vec![Box::new(RelevanceRanker), Box::new(FallbackMatcher)]
}
