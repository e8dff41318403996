//! # ChunkScope Corpus
//!
//! SQLite-backed store for the board → book → chapter → chunk hierarchy.
//!
//! ## Design
//! - **SQLite FTS5** (`unicode61` tokenizer) for the relevance-ranked path
//! - **BM25 scoring** via `bm25()`, negated so higher is better
//! - **Folded key columns** for case-insensitive board/grade/subject equality
//!   and substring matching, computed in Rust at write time
//! - **Bound parameters only**: caller keywords never reach the SQL text

pub mod fts;
pub mod records;
pub mod sqlite;

pub use records::{Board, Book, Chapter, ContentChunk, CorpusSnapshot, CorpusStats};
pub use sqlite::{ImportReport, SqliteCorpus};
