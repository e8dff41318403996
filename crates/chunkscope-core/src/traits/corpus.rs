//! Corpus store trait: the read-side seam every retrieval strategy queries through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An active board resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRef {
    pub id: String,
    pub name: String,
}

/// Resolved retrieval scope. Grade and subject keep the caller's spelling;
/// stores compare them through [`crate::fold::fold_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub board_id: String,
    pub grade: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
}

/// Disjunction of literal keyword terms ("a" OR "b" OR ...).
///
/// Terms are carried as plain data; each backend renders them into its own
/// query syntax and binds the result as a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordExpression {
    terms: Vec<String>,
}

impl KeywordExpression {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Chapter summary attached to a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub id: String,
    pub number: i64,
    pub title: String,
}

/// Book summary attached to a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub grade: String,
    pub subject: String,
}

/// One chunk row returned by a store query, joined with its owners.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit {
    pub id: String,
    pub text: String,
    pub page_from: Option<i64>,
    pub page_to: Option<i64>,
    pub chapter: Option<ChapterSummary>,
    pub book: BookSummary,
    pub board_name: String,
    /// Relevance score, higher is better. Only set by full-text queries.
    pub score: Option<f64>,
}

/// Read-only corpus access.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Case-insensitive exact match on board name, active boards only.
    async fn find_active_board_by_name(&self, name: &str) -> Result<Option<BoardRef>>;

    /// Relevance-ranked full-text match within `scope`.
    /// Ordered by descending score, ties by chunk id; at most `limit` rows.
    async fn full_text_search(
        &self,
        scope: &Scope,
        expression: &KeywordExpression,
        limit: usize,
    ) -> Result<Vec<ChunkHit>>;

    /// Case-insensitive substring match of any keyword within `scope`.
    /// Unscored, in stable insertion order; at most `limit` rows.
    async fn substring_search(
        &self,
        scope: &Scope,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<ChunkHit>>;
}
