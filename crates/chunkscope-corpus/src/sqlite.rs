//! SQLite corpus store with FTS5 full-text search.
//!
//! Tables mirror the board → book → chapter → chunk hierarchy. Every
//! case-insensitive lookup column has a `*_key` twin holding the folded value
//! (see [`chunkscope_core::fold`]); queries compare keys, never raw text.
//! Chunk text is indexed in `chunks_fts` under the chunk's `seq` rowid and
//! mirrored into `text_key` for substring matching.

use async_trait::async_trait;
use chunkscope_core::error::{ChunkScopeError, Result};
use chunkscope_core::fold::{fold_key, fold_text};
use chunkscope_core::traits::corpus::{
    BoardRef, BookSummary, ChapterSummary, ChunkHit, CorpusStore, KeywordExpression, Scope,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::sync::Mutex;

use crate::fts;
use crate::records::{Board, Book, Chapter, ContentChunk, CorpusSnapshot, CorpusStats};

/// Columns selected for every hit, in [`map_hit`] order.
const HIT_COLUMNS: &str = "c.id, c.text, c.page_from, c.page_to, \
     ch.id, ch.number, ch.title, \
     b.id, b.title, b.grade, b.subject, bd.name";

const SCOPE_JOINS: &str = "JOIN books b ON b.id = c.book_id \
     JOIN boards bd ON bd.id = b.board_id \
     LEFT JOIN chapters ch ON ch.id = c.chapter_id";

/// Scope predicate over parameters ?1 board id, ?2 grade key, ?3 subject key, ?4 chapter id.
const SCOPE_FILTER: &str = "b.board_id = ?1 \
     AND b.grade_key = ?2 \
     AND b.subject_key = ?3 \
     AND b.is_active = 1 \
     AND bd.is_active = 1 \
     AND (?4 IS NULL OR c.chapter_id = ?4)";

fn db_err(e: rusqlite::Error) -> ChunkScopeError {
    ChunkScopeError::Store(e.to_string())
}

/// Result of loading a [`CorpusSnapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    pub boards: usize,
    pub books: usize,
    pub chapters: usize,
    pub chunks: usize,
}

pub struct SqliteCorpus {
    conn: Mutex<Connection>,
}

impl SqliteCorpus {
    /// Open or create the corpus database. `:memory:` opens a private in-memory store.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && path != Path::new(":memory:") {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(db_err)?;

        // WAL keeps concurrent readers off the writer's lock
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        conn.execute_batch("PRAGMA foreign_keys=ON;").map_err(db_err)?;

        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(Path::new(":memory:"))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ChunkScopeError::Store(format!("Lock: {e}")))
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS boards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL UNIQUE,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                board_id TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                grade TEXT NOT NULL,
                grade_key TEXT NOT NULL,
                subject TEXT NOT NULL,
                subject_key TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_books_scope
                ON books(board_id, grade_key, subject_key);

            CREATE TABLE IF NOT EXISTS chapters (
                id TEXT PRIMARY KEY,
                book_id TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
                number INTEGER NOT NULL,
                title TEXT NOT NULL DEFAULT ''
            );

            -- seq doubles as the FTS rowid and as the stable fallback order
            CREATE TABLE IF NOT EXISTS content_chunks (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                book_id TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
                chapter_id TEXT REFERENCES chapters(id) ON DELETE SET NULL,
                text TEXT NOT NULL,
                text_key TEXT NOT NULL,
                page_from INTEGER,
                page_to INTEGER,
                chunk_index INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chunks_book
                ON content_chunks(book_id, chapter_id);

            CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
                text,
                tokenize='unicode61 remove_diacritics 0'
            );
            ",
        )
        .map_err(|e| ChunkScopeError::Store(format!("Migration error: {e}")))?;
        Ok(())
    }

    // ─── Write side ──────────────────────────────────────────

    pub fn upsert_board(&self, board: &Board) -> Result<()> {
        let conn = self.lock()?;
        upsert_board_on(&conn, board)
    }

    pub fn upsert_book(&self, book: &Book) -> Result<()> {
        let conn = self.lock()?;
        upsert_book_on(&conn, book)
    }

    pub fn upsert_chapter(&self, chapter: &Chapter) -> Result<()> {
        let conn = self.lock()?;
        upsert_chapter_on(&conn, chapter)
    }

    /// Insert or replace a chunk and re-index its text. Returns the chunk id
    /// (generated when `chunk.id` is empty).
    pub fn upsert_chunk(&self, chunk: &ContentChunk) -> Result<String> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        let id = upsert_chunk_on(&tx, chunk)?;
        tx.commit().map_err(db_err)?;
        Ok(id)
    }

    /// Remove a chunk and its index entry.
    pub fn delete_chunk(&self, id: &str) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        let seq: Option<i64> = tx
            .query_row("SELECT seq FROM content_chunks WHERE id = ?1", params![id], |r| r.get(0))
            .optional()
            .map_err(db_err)?;
        let Some(seq) = seq else {
            return Ok(false);
        };
        tx.execute("DELETE FROM chunks_fts WHERE rowid = ?1", params![seq])
            .map_err(db_err)?;
        tx.execute("DELETE FROM content_chunks WHERE seq = ?1", params![seq])
            .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        Ok(true)
    }

    /// Load a whole snapshot in one transaction: boards, books, chapters, then chunks.
    pub fn import(&self, snapshot: &CorpusSnapshot) -> Result<ImportReport> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db_err)?;
        for board in &snapshot.boards {
            upsert_board_on(&tx, board)?;
        }
        for book in &snapshot.books {
            upsert_book_on(&tx, book)?;
        }
        for chapter in &snapshot.chapters {
            upsert_chapter_on(&tx, chapter)?;
        }
        for chunk in &snapshot.chunks {
            upsert_chunk_on(&tx, chunk)?;
        }
        tx.commit().map_err(db_err)?;

        let report = ImportReport {
            boards: snapshot.boards.len(),
            books: snapshot.books.len(),
            chapters: snapshot.chapters.len(),
            chunks: snapshot.chunks.len(),
        };
        tracing::info!(
            "📚 Imported {} board(s), {} book(s), {} chapter(s), {} chunk(s)",
            report.boards,
            report.books,
            report.chapters,
            report.chunks
        );
        Ok(report)
    }

    /// Row counts per table.
    pub fn stats(&self) -> Result<CorpusStats> {
        let conn = self.lock()?;
        let count = |sql: &str| -> Result<usize> {
            conn.query_row(sql, [], |r| r.get::<_, i64>(0))
                .map(|n| n as usize)
                .map_err(db_err)
        };
        Ok(CorpusStats {
            boards: count("SELECT COUNT(*) FROM boards")?,
            active_boards: count("SELECT COUNT(*) FROM boards WHERE is_active = 1")?,
            books: count("SELECT COUNT(*) FROM books")?,
            chapters: count("SELECT COUNT(*) FROM chapters")?,
            chunks: count("SELECT COUNT(*) FROM content_chunks")?,
        })
    }

    // ─── Read side ───────────────────────────────────────────

    fn scope_values(scope: &Scope) -> Vec<Value> {
        vec![
            Value::Text(scope.board_id.clone()),
            Value::Text(fold_key(&scope.grade)),
            Value::Text(fold_key(&scope.subject)),
            scope
                .chapter_id
                .clone()
                .map(Value::Text)
                .unwrap_or(Value::Null),
        ]
    }

    fn query_hits(&self, sql: &str, values: Vec<Value>) -> Result<Vec<ChunkHit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_hit)
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn require_id(kind: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ChunkScopeError::Validation(format!("{kind} id is required")));
    }
    Ok(())
}

fn upsert_board_on(conn: &Connection, board: &Board) -> Result<()> {
    require_id("board", &board.id)?;
    let ts = now();
    conn.execute(
        "INSERT INTO boards (id, name, name_key, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            name_key = excluded.name_key,
            is_active = excluded.is_active,
            updated_at = excluded.updated_at",
        params![board.id, board.name, fold_key(&board.name), board.is_active, ts],
    )
    .map_err(db_err)?;
    Ok(())
}

fn upsert_book_on(conn: &Connection, book: &Book) -> Result<()> {
    require_id("book", &book.id)?;
    let ts = now();
    conn.execute(
        "INSERT INTO books (id, board_id, title, grade, grade_key, subject, subject_key,
                            is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
         ON CONFLICT(id) DO UPDATE SET
            board_id = excluded.board_id,
            title = excluded.title,
            grade = excluded.grade,
            grade_key = excluded.grade_key,
            subject = excluded.subject,
            subject_key = excluded.subject_key,
            is_active = excluded.is_active,
            updated_at = excluded.updated_at",
        params![
            book.id,
            book.board_id,
            book.title,
            book.grade,
            fold_key(&book.grade),
            book.subject,
            fold_key(&book.subject),
            book.is_active,
            ts,
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn upsert_chapter_on(conn: &Connection, chapter: &Chapter) -> Result<()> {
    require_id("chapter", &chapter.id)?;
    conn.execute(
        "INSERT INTO chapters (id, book_id, number, title) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            book_id = excluded.book_id,
            number = excluded.number,
            title = excluded.title",
        params![chapter.id, chapter.book_id, chapter.number, chapter.title],
    )
    .map_err(db_err)?;
    Ok(())
}

fn upsert_chunk_on(conn: &Connection, chunk: &ContentChunk) -> Result<String> {
    let id = if chunk.id.trim().is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        chunk.id.clone()
    };

    // A chunk's chapter must live in the chunk's own book
    if let Some(chapter_id) = &chunk.chapter_id {
        let owner: Option<String> = conn
            .query_row(
                "SELECT book_id FROM chapters WHERE id = ?1",
                params![chapter_id],
                |r| r.get(0),
            )
            .optional()
            .map_err(db_err)?;
        match owner {
            Some(book_id) if book_id == chunk.book_id => {}
            Some(book_id) => {
                return Err(ChunkScopeError::Validation(format!(
                    "chapter '{chapter_id}' belongs to book '{book_id}', not '{}'",
                    chunk.book_id
                )));
            }
            None => {
                return Err(ChunkScopeError::Validation(format!(
                    "chapter '{chapter_id}' does not exist"
                )));
            }
        }
    }

    let ts = now();
    conn.execute(
        "INSERT INTO content_chunks (id, book_id, chapter_id, text, text_key, page_from, page_to,
                                     chunk_index, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
         ON CONFLICT(id) DO UPDATE SET
            book_id = excluded.book_id,
            chapter_id = excluded.chapter_id,
            text = excluded.text,
            text_key = excluded.text_key,
            page_from = excluded.page_from,
            page_to = excluded.page_to,
            chunk_index = excluded.chunk_index,
            updated_at = excluded.updated_at",
        params![
            id,
            chunk.book_id,
            chunk.chapter_id,
            chunk.text,
            fold_text(&chunk.text),
            chunk.page_from,
            chunk.page_to,
            chunk.chunk_index,
            ts,
        ],
    )
    .map_err(db_err)?;

    let seq: i64 = conn
        .query_row("SELECT seq FROM content_chunks WHERE id = ?1", params![id], |r| r.get(0))
        .map_err(db_err)?;
    conn.execute("DELETE FROM chunks_fts WHERE rowid = ?1", params![seq])
        .map_err(db_err)?;
    conn.execute(
        "INSERT INTO chunks_fts (rowid, text) VALUES (?1, ?2)",
        params![seq, chunk.text],
    )
    .map_err(db_err)?;

    Ok(id)
}

/// Map a row selected with [`HIT_COLUMNS`] followed by a score column.
fn map_hit(row: &Row<'_>) -> rusqlite::Result<ChunkHit> {
    let chapter_id: Option<String> = row.get(4)?;
    let chapter = match chapter_id {
        Some(id) => Some(ChapterSummary {
            id,
            number: row.get(5)?,
            title: row.get(6)?,
        }),
        None => None,
    };
    Ok(ChunkHit {
        id: row.get(0)?,
        text: row.get(1)?,
        page_from: row.get(2)?,
        page_to: row.get(3)?,
        chapter,
        book: BookSummary {
            id: row.get(7)?,
            title: row.get(8)?,
            grade: row.get(9)?,
            subject: row.get(10)?,
        },
        board_name: row.get(11)?,
        score: row.get(12)?,
    })
}

#[async_trait]
impl CorpusStore for SqliteCorpus {
    fn name(&self) -> &str { "sqlite" }

    async fn find_active_board_by_name(&self, name: &str) -> Result<Option<BoardRef>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name FROM boards WHERE name_key = ?1 AND is_active = 1",
            params![fold_key(name)],
            |row| {
                Ok(BoardRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(db_err)
    }

    async fn full_text_search(
        &self,
        scope: &Scope,
        expression: &KeywordExpression,
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        let Some(match_query) = fts::to_match_query(expression) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        // bm25() is lower-is-better; negate so callers see higher-is-better
        let sql = format!(
            "SELECT {HIT_COLUMNS}, -bm25(chunks_fts) AS score
             FROM chunks_fts
             JOIN content_chunks c ON c.seq = chunks_fts.rowid
             {SCOPE_JOINS}
             WHERE chunks_fts MATCH ?5 AND {SCOPE_FILTER}
             ORDER BY score DESC, c.id ASC
             LIMIT ?6"
        );
        let mut values = Self::scope_values(scope);
        values.push(Value::Text(match_query));
        values.push(Value::Integer(limit as i64));
        self.query_hits(&sql, values)
    }

    async fn substring_search(
        &self,
        scope: &Scope,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<ChunkHit>> {
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        // All keywords bind as a single JSON array parameter
        let folded: Vec<String> = keywords.iter().map(|k| fold_text(k)).collect();
        let keywords_json = serde_json::to_string(&folded)?;
        let sql = format!(
            "SELECT {HIT_COLUMNS}, NULL
             FROM content_chunks c
             {SCOPE_JOINS}
             WHERE {SCOPE_FILTER}
               AND EXISTS (SELECT 1 FROM json_each(?6) kw WHERE instr(c.text_key, kw.value) > 0)
             ORDER BY c.seq ASC
             LIMIT ?5"
        );
        let mut values = Self::scope_values(scope);
        values.push(Value::Integer(limit as i64));
        values.push(Value::Text(keywords_json));
        self.query_hits(&sql, values)
    }
}
