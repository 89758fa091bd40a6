#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use salsa::Setter;

use super::*;
use crate::db::CinderDb;

fn file(db: &CinderDb, text: &str) -> SourceFile {
    SourceFile::new(db, PathBuf::from("/inc/test.h"), text.to_string())
}

#[test]
fn test_tokens_skip_directives() {
    let db = CinderDb::new();
    let f = file(&db, "#include \"other.h\"\nint x;\n");
    let out = tokens(&db, f);
    assert!(!out.has_errors());
    assert_eq!(directives(&db, f).includes.len(), 1);
    // `int`, `x`, `;`, EOF
    assert_eq!(out.tokens.len(), 4);
}

#[test]
fn test_fingerprint_tracks_text() {
    let mut db = CinderDb::new();
    let f = file(&db, "int x;");
    let before = fingerprint(&db, f);
    assert_eq!(fingerprint(&db, f), before);

    f.set_text(&mut db).to("int y;".to_string());
    assert_ne!(fingerprint(&db, f), before);
    assert_eq!(line_count(&db, f), 1);
}

#[test]
fn test_queries_are_cached_until_input_changes() {
    let mut db = CinderDb::new();
    let f = file(&db, "int x;\nint y;");
    db.enable_logging();

    tokens(&db, f);
    let first = db.take_logs();
    assert!(first.iter().any(|log| log.contains("tokens")), "{first:?}");

    tokens(&db, f);
    assert!(db.take_logs().is_empty());

    f.set_text(&mut db).to("int z;".to_string());
    tokens(&db, f);
    assert!(db.take_logs().iter().any(|log| log.contains("directives")));
}
