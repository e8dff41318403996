//! Seed keyword normalization.

use chunkscope_core::error::{ChunkScopeError, Result};

/// Trim every keyword and drop the blank ones, keeping input order.
/// Duplicates are kept. Fails if the list is absent or nothing survives.
pub fn normalize_keywords(raw: Option<&[String]>) -> Result<Vec<String>> {
    let Some(raw) = raw else {
        return Err(ChunkScopeError::Validation("seedKeywords is required".into()));
    };

    let keywords: Vec<String> = raw
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();

    if keywords.is_empty() {
        return Err(ChunkScopeError::Validation(
            "seedKeywords must contain at least one non-empty keyword".into(),
        ));
    }
    Ok(keywords)
}
