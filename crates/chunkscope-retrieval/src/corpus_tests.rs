//! Retrieval scenarios against a real in-memory SQLite corpus.

use crate::{NO_CONTENT_MESSAGE, RetrievalRequest, RetrievalService, SearchType};
use chunkscope_core::config::RetrievalConfig;
use chunkscope_corpus::{Board, Book, Chapter, ContentChunk, CorpusSnapshot, SqliteCorpus};
use std::sync::Arc;

fn chunk(id: &str, book_id: &str, chapter_id: Option<&str>, text: &str) -> ContentChunk {
    ContentChunk {
        id: id.into(),
        book_id: book_id.into(),
        chapter_id: chapter_id.map(String::from),
        text: text.into(),
        page_from: Some(10),
        page_to: Some(11),
        chunk_index: 0,
    }
}

fn book(id: &str, board_id: &str, grade: &str, subject: &str, active: bool) -> Book {
    Book {
        id: id.into(),
        board_id: board_id.into(),
        title: format!("{subject} for grade {grade}"),
        grade: grade.into(),
        subject: subject.into(),
        is_active: active,
    }
}

/// CBSE grade 5 Math with ten fraction/decimal chunks, plus decoys outside scope.
fn corpus() -> SqliteCorpus {
    let mut chunks: Vec<ContentChunk> = (0..10)
        .map(|i| {
            let body = "fraction ".repeat(i + 1) + &"filler words ".repeat(10 - i) + "decimal";
            chunk(&format!("m5-{i:02}"), "m5", None, &body)
        })
        .collect();
    chunks.push(chunk("m5-ch", "m5", Some("m5-ch2"), "Chapter two covers fraction strips."));
    chunks.push(chunk("old-1", "m5-old", None, "fraction decimal from the retired edition"));
    chunks.push(chunk("sci-1", "s5", None, "fraction of sunlight reflected, decimal notation"));
    chunks.push(chunk("icse-1", "icse-m5", None, "ICSE fraction decimal worksheet"));
    chunks.push(chunk("arch-1", "arch-m5", None, "Archived fraction decimal notes"));
    chunks.push(chunk("e5-1", "e5", None, "Fractional reasoning appears in story problems."));

    let db = SqliteCorpus::open_in_memory().unwrap();
    db.import(&CorpusSnapshot {
        boards: vec![
            Board { id: "cbse".into(), name: "CBSE".into(), is_active: true },
            Board { id: "icse".into(), name: "ICSE".into(), is_active: true },
            Board { id: "arch".into(), name: "Archive".into(), is_active: false },
        ],
        books: vec![
            book("m5", "cbse", "5", "Math", true),
            book("m5-old", "cbse", "5", "Math", false),
            book("s5", "cbse", "5", "Science", true),
            book("e5", "cbse", "5", "English", true),
            book("icse-m5", "icse", "5", "Math", true),
            book("arch-m5", "arch", "5", "Math", true),
        ],
        chapters: vec![Chapter {
            id: "m5-ch2".into(),
            book_id: "m5".into(),
            number: 2,
            title: "Fractions".into(),
        }],
        chunks,
    })
    .unwrap();
    db
}

fn service() -> RetrievalService {
    RetrievalService::new(Arc::new(corpus()), RetrievalConfig::default())
}

#[tokio::test]
async fn fulltext_scenario_respects_limit_and_order() {
    let req = RetrievalRequest::new("CBSE", "5", "Math", &["fraction", "decimal"]).with_limit(3);
    let resp = service().retrieve(&req).await.unwrap();

    assert_eq!(resp.search_type, Some(SearchType::Fulltext));
    assert_eq!(resp.chunks.len(), 3);
    let scores: Vec<f64> = resp
        .chunks
        .iter()
        .map(|c| c.relevance_score.expect("fulltext results carry a score"))
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores {scores:?}");
    for c in &resp.chunks {
        assert_eq!(c.board.name, "CBSE");
        assert_eq!(c.book.id, "m5");
    }
}

#[tokio::test]
async fn fallback_scenario_matches_substrings() {
    let req = RetrievalRequest::new("CBSE", "5", "English", &["fraction", "decimal"]);
    let resp = service().retrieve(&req).await.unwrap();

    assert_eq!(resp.search_type, Some(SearchType::Fallback));
    assert_eq!(resp.chunks.len(), 1);
    assert_eq!(resp.chunks[0].id, "e5-1");
    assert_eq!(resp.chunks[0].relevance_score, None);

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["searchType"], "fallback");
    assert!(json["chunks"][0].get("relevanceScore").is_none());
}

#[tokio::test]
async fn unknown_board_is_not_found() {
    let req = RetrievalRequest::new("NonExistentBoard", "5", "Math", &["x"]);
    assert_eq!(service().retrieve(&req).await.unwrap_err().kind(), "not_found");
}

#[tokio::test]
async fn inactive_board_is_not_found() {
    let req = RetrievalRequest::new("archive", "5", "Math", &["fraction"]);
    assert_eq!(service().retrieve(&req).await.unwrap_err().kind(), "not_found");
}

#[tokio::test]
async fn empty_keywords_are_validation() {
    let req = RetrievalRequest::new("CBSE", "5", "Math", &[]);
    assert_eq!(service().retrieve(&req).await.unwrap_err().kind(), "validation");
}

#[tokio::test]
async fn no_matches_anywhere_is_empty_success() {
    let req = RetrievalRequest::new("CBSE", "5", "Math", &["photosynthesis"]);
    let resp = service().retrieve(&req).await.unwrap();
    assert!(resp.chunks.is_empty());
    assert_eq!(resp.search_type, None);
    assert_eq!(resp.message.as_deref(), Some(NO_CONTENT_MESSAGE));
}

#[tokio::test]
async fn results_stay_in_scope_on_both_paths() {
    let svc = service();
    for kws in [&["fraction", "decimal"][..], &["raction"][..]] {
        let req = RetrievalRequest::new("cbse", " 5 ", "MATH", kws).with_limit(50);
        let resp = svc.retrieve(&req).await.unwrap();
        assert!(!resp.chunks.is_empty());
        for c in &resp.chunks {
            assert_eq!(c.book.id, "m5", "chunk {} escaped scope", c.id);
            assert_eq!(c.board.name, "CBSE");
        }
    }
}

#[tokio::test]
async fn chapter_filter_applies_on_both_paths() {
    let svc = service();
    for kw in ["fraction", "strip"] {
        let req = RetrievalRequest::new("CBSE", "5", "Math", &[kw]).with_chapter("m5-ch2");
        let resp = svc.retrieve(&req).await.unwrap();
        assert_eq!(resp.chunks.len(), 1, "keyword {kw}");
        assert_eq!(resp.chunks[0].id, "m5-ch");
        let chapter = resp.chunks[0].chapter.as_ref().unwrap();
        assert_eq!(chapter.number, 2);
        assert_eq!(chapter.title, "Fractions");
    }
}

#[tokio::test]
async fn repeated_calls_are_deterministic() {
    let svc = service();
    let req = RetrievalRequest::new("CBSE", "5", "Math", &["decimal"]).with_limit(10);
    let first = svc.retrieve(&req).await.unwrap();
    for _ in 0..3 {
        assert_eq!(svc.retrieve(&req).await.unwrap(), first);
    }
}

#[tokio::test]
async fn injection_keywords_stay_scoped() {
    let svc = service();
    let crafted = [
        "' OR '1'='1",
        "x') OR 1=1 --",
        "fraction\" OR \"icse",
        "%",
        "_",
        "fraction OR NOT x",
    ];
    for kw in crafted {
        let req = RetrievalRequest::new("CBSE", "5", "Math", &[kw]).with_limit(50);
        let resp = svc.retrieve(&req).await.unwrap();
        for c in &resp.chunks {
            assert_eq!(c.book.id, "m5", "keyword {kw:?} leaked chunk {}", c.id);
        }
    }
}

#[tokio::test]
async fn large_keyword_list_reaches_fallback() {
    let mut keywords: Vec<String> = (0..2000).map(|i| format!("zzfiller{i}")).collect();
    keywords.push("fractio".into());
    let req = RetrievalRequest {
        board: Some("CBSE".into()),
        grade: Some("5".into()),
        subject: Some("English".into()),
        chapter_id: None,
        seed_keywords: Some(keywords),
        limit: None,
    };
    let resp = service().retrieve(&req).await.unwrap();
    assert_eq!(resp.search_type, Some(SearchType::Fallback));
    assert_eq!(resp.chunks.len(), 1);
    assert_eq!(resp.chunks[0].id, "e5-1");
}

#[tokio::test]
async fn accents_are_matched_literally_on_both_paths() {
    let corpus = corpus();
    corpus
        .upsert_chunk(&chunk("e5-cv", "e5", None, "Write your résumé before the career fair."))
        .unwrap();
    let svc = RetrievalService::new(Arc::new(corpus), RetrievalConfig::default());

    let req = RetrievalRequest::new("CBSE", "5", "English", &["resume"]);
    let resp = svc.retrieve(&req).await.unwrap();
    assert!(resp.chunks.is_empty());
    assert_eq!(resp.message.as_deref(), Some(NO_CONTENT_MESSAGE));

    let req = RetrievalRequest::new("CBSE", "5", "English", &["résumé"]);
    let resp = svc.retrieve(&req).await.unwrap();
    assert_eq!(resp.search_type, Some(SearchType::Fulltext));
    assert_eq!(resp.chunks[0].id, "e5-cv");
}
