//! Canonical case folding.
//!
//! Board names, grades and subjects are compared through [`fold_key`] on both the
//! write side and the query side, so equality never depends on store collation.

/// Fold a lookup key: surrounding whitespace removed, Unicode lowercase.
pub fn fold_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Fold free text for substring containment. Whitespace is kept as-is.
pub fn fold_text(s: &str) -> String {
    s.to_lowercase()
}
