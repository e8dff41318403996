//! Retrieval request parsing and field validation.

use chunkscope_core::config::RetrievalConfig;
use chunkscope_core::error::{ChunkScopeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A retrieval request as received from the transport. Every field is optional
/// here so that missing fields surface as `Validation` errors, not decode errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    pub board: Option<String>,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub chapter_id: Option<String>,
    pub seed_keywords: Option<Vec<String>>,
    pub limit: Option<i64>,
}

impl RetrievalRequest {
    pub fn new(board: &str, grade: &str, subject: &str, keywords: &[&str]) -> Self {
        Self {
            board: Some(board.into()),
            grade: Some(grade.into()),
            subject: Some(subject.into()),
            chapter_id: None,
            seed_keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
            limit: None,
        }
    }

    pub fn with_chapter(mut self, chapter_id: &str) -> Self {
        self.chapter_id = Some(chapter_id.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parse a loosely-typed JSON body. Wrong field types are `Validation` errors.
    pub fn from_json(body: &Value) -> Result<Self> {
        if !body.is_object() {
            return Err(ChunkScopeError::Validation(
                "request body must be a JSON object".into(),
            ));
        }

        let seed_keywords = match body.get("seedKeywords") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|v| {
                        v.as_str().map(String::from).ok_or_else(|| {
                            ChunkScopeError::Validation("seedKeywords must contain only strings".into())
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(_) => {
                return Err(ChunkScopeError::Validation("seedKeywords must be a list".into()));
            }
        };

        let limit = match body.get("limit") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_i64().ok_or_else(|| {
                ChunkScopeError::Validation("limit must be an integer".into())
            })?),
        };

        Ok(Self {
            board: string_field(body, "board")?,
            grade: string_field(body, "grade")?,
            subject: string_field(body, "subject")?,
            chapter_id: string_field(body, "chapterId")?,
            seed_keywords,
            limit,
        })
    }

    /// Resolve the effective limit: default when absent, clamped to the maximum.
    pub fn effective_limit(&self, config: &RetrievalConfig) -> Result<usize> {
        match self.limit {
            None => Ok(config.default_limit),
            Some(n) if n < 1 => Err(ChunkScopeError::Validation(format!(
                "limit must be a positive integer, got {n}"
            ))),
            Some(n) => Ok((n as usize).min(config.max_limit)),
        }
    }

    /// Blank chapter ids count as absent.
    pub fn chapter(&self) -> Option<&str> {
        self.chapter_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

fn string_field(body: &Value, name: &str) -> Result<Option<String>> {
    match body.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ChunkScopeError::Validation(format!("{name} must be a string"))),
    }
}

/// Return the trimmed value of a required field, or a `Validation` error.
pub fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ChunkScopeError::Validation(format!("{name} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_full() {
        let req = RetrievalRequest::from_json(&json!({
            "board": "CBSE",
            "grade": "5",
            "subject": "Math",
            "chapterId": "ch-1",
            "seedKeywords": ["fraction", "decimal"],
            "limit": 3
        }))
        .unwrap();
        assert_eq!(req.board.as_deref(), Some("CBSE"));
        assert_eq!(req.chapter(), Some("ch-1"));
        assert_eq!(req.seed_keywords.unwrap(), vec!["fraction", "decimal"]);
        assert_eq!(req.limit, Some(3));
    }

    #[test]
    fn test_from_json_wrong_types() {
        let cases = [
            json!({"seedKeywords": "fraction"}),
            json!({"seedKeywords": [1, 2]}),
            json!({"limit": "five"}),
            json!({"limit": 2.5}),
            json!({"board": 42}),
            json!(["not", "an", "object"]),
        ];
        for body in cases {
            let err = RetrievalRequest::from_json(&body).unwrap_err();
            assert_eq!(err.kind(), "validation", "body {body}");
        }
    }

    #[test]
    fn test_from_json_missing_fields_are_none() {
        let req = RetrievalRequest::from_json(&json!({})).unwrap();
        assert_eq!(req, RetrievalRequest::default());
    }

    #[test]
    fn test_required() {
        assert_eq!(required(&Some(" CBSE ".into()), "board").unwrap(), "CBSE");
        assert!(required(&Some("   ".into()), "board").is_err());
        assert!(required(&None, "board").is_err());
    }

    #[test]
    fn test_effective_limit() {
        let config = RetrievalConfig::default();
        let req = RetrievalRequest::new("CBSE", "5", "Math", &["x"]);
        assert_eq!(req.effective_limit(&config).unwrap(), 5);
        assert_eq!(req.clone().with_limit(3).effective_limit(&config).unwrap(), 3);
        assert_eq!(req.clone().with_limit(500).effective_limit(&config).unwrap(), 50);
        assert!(req.clone().with_limit(0).effective_limit(&config).is_err());
        assert!(req.with_limit(-2).effective_limit(&config).is_err());
    }

    #[test]
    fn test_blank_chapter_is_absent() {
        let req = RetrievalRequest::new("CBSE", "5", "Math", &["x"]).with_chapter("  ");
        assert_eq!(req.chapter(), None);
    }
}
