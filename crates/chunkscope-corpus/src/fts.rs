//! Rendering keyword expressions into FTS5 MATCH syntax.
//!
//! Every term becomes a double-quoted FTS5 string, so operators (`OR`, `NOT`,
//! `NEAR`), column filters and prefix stars inside caller text are literal.
//! The rendered string is always bound as a parameter, never spliced into SQL.

use chunkscope_core::traits::corpus::KeywordExpression;

/// Render `expression` as `"t1" OR "t2" ...`.
///
/// Terms with no alphanumeric character would tokenize to an empty phrase under
/// `unicode61` and are skipped. Returns `None` when nothing searchable remains.
pub fn to_match_query(expression: &KeywordExpression) -> Option<String> {
    let phrases: Vec<String> = expression
        .terms()
        .iter()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .map(|t| quote(t))
        .collect();

    if phrases.is_empty() {
        None
    } else {
        Some(phrases.join(" OR "))
    }
}

fn quote(term: &str) -> String {
    format!("\"{}\"", term.replace('"', "\"\""))
}
