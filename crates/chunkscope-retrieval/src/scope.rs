//! Scope resolution: board name → active board id, plus pass-through filters.

use chunkscope_core::error::{ChunkScopeError, Result};
use chunkscope_core::traits::corpus::{BoardRef, CorpusStore, Scope};

/// Resolve `board` to an active board and build the scope around it.
///
/// Grade and subject are not checked here; an unknown value simply matches no
/// books later. `chapter_id` is passed through unresolved.
pub async fn resolve_scope(
    store: &dyn CorpusStore,
    board: &str,
    grade: &str,
    subject: &str,
    chapter_id: Option<&str>,
) -> Result<(BoardRef, Scope)> {
    let resolved = store
        .find_active_board_by_name(board)
        .await?
        .ok_or_else(|| ChunkScopeError::NotFound(format!("Board '{board}' not found or inactive")))?;

    let scope = Scope {
        board_id: resolved.id.clone(),
        grade: grade.to_string(),
        subject: subject.to_string(),
        chapter_id: chapter_id.map(String::from),
    };
    tracing::debug!(board = %resolved.name, board_id = %resolved.id, "scope resolved");
    Ok((resolved, scope))
}
