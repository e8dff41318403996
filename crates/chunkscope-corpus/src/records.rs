//! Corpus records as written by the content-management side.

use serde::{Deserialize, Serialize};

fn bool_true() -> bool { true }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default = "bool_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub board_id: String,
    pub title: String,
    pub grade: String,
    pub subject: String,
    #[serde(default = "bool_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub book_id: String,
    pub number: i64,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentChunk {
    /// Generated on import when left empty.
    #[serde(default)]
    pub id: String,
    pub book_id: String,
    #[serde(default)]
    pub chapter_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub page_from: Option<i64>,
    #[serde(default)]
    pub page_to: Option<i64>,
    #[serde(default)]
    pub chunk_index: i64,
}

/// A whole corpus (or a slice of one) as a single JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSnapshot {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub chunks: Vec<ContentChunk>,
}

impl CorpusSnapshot {
    pub fn from_json(json: &str) -> chunkscope_core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub boards: usize,
    pub active_boards: usize,
    pub books: usize,
    pub chapters: usize,
    pub chunks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults() {
        let snap = CorpusSnapshot::from_json(
            r#"{
                "boards": [{"id": "b1", "name": "CBSE"}],
                "books": [{"id": "k1", "boardId": "b1", "title": "Maths 5", "grade": "5", "subject": "Math"}],
                "chunks": [{"bookId": "k1", "text": "Fractions are parts of a whole."}]
            }"#,
        )
        .unwrap();
        assert!(snap.boards[0].is_active);
        assert!(snap.books[0].is_active);
        assert!(snap.chapters.is_empty());
        assert_eq!(snap.chunks[0].id, "");
        assert_eq!(snap.chunks[0].chapter_id, None);
        assert_eq!(snap.chunks[0].chunk_index, 0);
    }

    #[test]
    fn test_snapshot_rejects_missing_text() {
        let err = CorpusSnapshot::from_json(r#"{"chunks": [{"bookId": "k1"}]}"#).unwrap_err();
        assert_eq!(err.kind(), "json");
    }
}
