//! Result assembly: one output shape for both retrieval paths.

use chunkscope_core::traits::corpus::{BookSummary, ChapterSummary, ChunkHit};
use serde::{Deserialize, Serialize};

use crate::strategy::SearchType;

pub const NO_CONTENT_MESSAGE: &str = "No relevant content found for the given criteria";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: String,
    pub text: String,
    pub page_from: Option<i64>,
    pub page_to: Option<i64>,
    /// Serialized as `null` when the chunk has no chapter.
    pub chapter: Option<ChapterSummary>,
    pub book: BookSummary,
    pub board: BoardName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResponse {
    pub chunks: Vec<ResultRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RetrievalResponse {
    /// Successful response for a search that matched nothing on any path.
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            search_type: None,
            message: Some(NO_CONTENT_MESSAGE.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Shape `hits` into result records and stamp the path that produced them.
/// Scores survive only for full-text results.
pub fn assemble(search_type: SearchType, hits: Vec<ChunkHit>) -> RetrievalResponse {
    if hits.is_empty() {
        return RetrievalResponse::empty();
    }

    let chunks = hits
        .into_iter()
        .map(|hit| ResultRecord {
            relevance_score: match search_type {
                SearchType::Fulltext => hit.score,
                SearchType::Fallback => None,
            },
            id: hit.id,
            text: hit.text,
            page_from: hit.page_from,
            page_to: hit.page_to,
            chapter: hit.chapter,
            book: hit.book,
            board: BoardName { name: hit.board_name },
        })
        .collect();

    RetrievalResponse {
        chunks,
        search_type: Some(search_type),
        message: None,
    }
}
