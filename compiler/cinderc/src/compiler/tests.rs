#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use cinder_diagnostic::ErrorCode;
use cinder_ir::{DeclKind, DeclLookup};
use pretty_assertions::assert_eq;

use super::{CompileOutput, CompileStatus, FailureKind, IncrementalCompiler};
use crate::error::SessionError;
use crate::options::CompileOptions;
use crate::transaction::{Ledger, TransactionStatus};

fn compiler() -> IncrementalCompiler {
    IncrementalCompiler::new(Vec::new())
}

fn codes(output: &CompileOutput) -> Vec<ErrorCode> {
    output.diagnostics.iter().map(|d| d.code).collect()
}

fn decl_name(c: &IncrementalCompiler, index: usize) -> &'static str {
    let decl = c.context().iter().nth(index).unwrap();
    c.interner().lookup(decl.name)
}

#[test]
fn test_wrapped_increment_commits_wrapper_last() {
    let mut c = compiler();
    let out = c.compile("int x = 1;\nx + 1", CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Success);
    let tx = out.transaction.unwrap();
    assert_eq!(tx.range.len(), 2);
    let last = c.context().decl(tx.last_decl()).unwrap();
    assert!(matches!(last.kind, DeclKind::Wrapper(_)));
    assert_eq!(decl_name(&c, 1), "__cinder_wrapper_1");
    assert_eq!(c.ledger().len(), 1);
}

#[test]
fn test_failed_increment_leaves_context_unchanged() {
    let mut c = compiler();
    c.compile("int base = 1;", CompileOptions::raw()).unwrap();
    let snapshot = c.context().clone();

    for _ in 0..2 {
        let out = c.compile("int y = missing + 1;", CompileOptions::default()).unwrap();
        assert_eq!(out.status, CompileStatus::Failed(FailureKind::Type));
        assert_eq!(codes(&out), vec![ErrorCode::E2002]);
        assert!(out.transaction.is_none());
        assert_eq!(c.context(), &snapshot);
        assert_eq!(c.ledger().len(), 1);
    }
    assert!(!c.is_poisoned());

    // The failed wrapper number is reused.
    c.compile("base", CompileOptions::default()).unwrap();
    assert_eq!(decl_name(&c, 1), "__cinder_wrapper_1");
}

#[test]
fn test_diagnostics_use_user_coordinates() {
    let mut c = compiler();
    let out = c.compile("int x = ;", CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Failed(FailureKind::Parse));
    let span = out.diagnostics[0].primary_span().unwrap();
    assert_eq!(span.start, 8);

    let out = c.compile("int y = @;", CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Failed(FailureKind::Parse));
    assert_eq!(out.diagnostics[0].code, ErrorCode::E0001);
    assert_eq!(out.diagnostics[0].primary_span().unwrap().start, 8);
}

#[test]
fn test_warnings_upgrade_status() {
    let mut c = compiler();
    c.compile("int f() { return 1; }", CompileOptions::raw()).unwrap();
    let out = c.compile("int f() { return 2; }", CompileOptions::raw()).unwrap();
    assert_eq!(out.status, CompileStatus::SuccessWithWarnings);
    assert_eq!(codes(&out), vec![ErrorCode::W2001]);
    assert_eq!(
        out.transaction.unwrap().status,
        TransactionStatus::SuccessWithWarnings
    );
}

#[test]
fn test_empty_input_commits_nothing() {
    let mut c = compiler();
    let out = c.compile("// nothing here", CompileOptions::raw()).unwrap();
    assert_eq!(out.status, CompileStatus::Success);
    assert!(out.transaction.is_none());
    let out = c.compile("   \n", CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Success);
    assert!(out.transaction.is_none());
}

#[test]
fn test_declarations_only_compiles_raw() {
    let mut c = compiler();
    let out = c
        .compile("int y = 1;", CompileOptions::declarations_only())
        .unwrap();
    let tx = out.transaction.unwrap();
    assert_eq!(tx.range.len(), 1);
    assert!(matches!(
        c.context().decl(tx.first_decl()).unwrap().kind,
        DeclKind::Variable(_)
    ));
}

#[test]
fn test_print_ast() {
    let mut c = compiler();
    let out = c
        .compile(
            "int twice(int v) { return v * 2; }",
            CompileOptions::raw().with_print_ast(true),
        )
        .unwrap();
    let ast = out.ast.unwrap();
    assert!(ast.contains("twice"), "{ast}");
}

#[test]
fn test_include_is_compiled_once() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("twice.h");
    fs::write(&header, "int twice(int v) { return v * 2; }\n").unwrap();
    let line = format!("#include \"{}\"", header.display());

    let mut c = compiler();
    let out = c.compile(&format!("{line}\ntwice(2)"), CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Success, "{:?}", out.diagnostics);
    assert_eq!(out.transaction.unwrap().range.len(), 2);
    assert!(c.lookup("twice").is_some());

    // Unchanged: skipped, so no redefinition warning.
    let out = c.compile(&line, CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Success);
    assert!(out.transaction.is_none());

    // Changed: compiled again under the redefinition rules.
    fs::write(&header, "int twice(int v) { return v + v; }\n").unwrap();
    let out = c.compile(&line, CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::SuccessWithWarnings);
    assert_eq!(codes(&out), vec![ErrorCode::W2001]);
}

#[test]
fn test_include_search_paths_and_nesting() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sys");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("inner.h"), "enum Mode { Off, On };\n").unwrap();
    fs::write(sub.join("outer.h"), "#include \"inner.h\"\nMode current = On;\n").unwrap();

    let mut c = IncrementalCompiler::new(vec![sub.clone()]);
    let out = c.compile("#include <outer.h>", CompileOptions::raw()).unwrap();
    assert_eq!(out.status, CompileStatus::Success, "{:?}", out.diagnostics);
    assert!(c.lookup("current").is_some());
    assert!(c.lookup("On").is_some());
}

#[test]
fn test_include_failures() {
    let mut c = compiler();
    let out = c
        .compile("#include \"definitely_missing.h\"\n1", CompileOptions::default())
        .unwrap();
    assert_eq!(out.status, CompileStatus::Failed(FailureKind::Include));
    assert_eq!(codes(&out), vec![ErrorCode::E3001]);
    assert!(c.context().is_empty());

    let out = c.compile("#include nothing", CompileOptions::default()).unwrap();
    assert_eq!(out.status, CompileStatus::Failed(FailureKind::Parse));
    assert_eq!(codes(&out), vec![ErrorCode::E1006]);
}

#[test]
fn test_errors_in_included_file_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("bad.h");
    fs::write(&header, "int broken(\n").unwrap();
    let mut c = compiler();
    let out = c
        .compile(&format!("#include \"{}\"", header.display()), CompileOptions::raw())
        .unwrap();
    assert_eq!(out.status, CompileStatus::Failed(FailureKind::Parse));
    let source = out.diagnostics[0].source.as_ref().unwrap();
    assert!(source.path.ends_with("bad.h"));
    assert!(c.context().is_empty());
}

#[test]
fn test_reset_discards_everything() {
    let mut c = compiler();
    c.compile("int a = 1;", CompileOptions::raw()).unwrap();
    c.reset();
    assert!(c.context().is_empty());
    assert!(c.ledger().is_empty());
    assert!(c.lookup("a").is_none());
}

#[test]
fn test_inconsistent_ledger_poisons_until_reset() {
    let mut c = compiler();
    c.compile("int a = 1;", CompileOptions::raw()).unwrap();
    // The context keeps its declaration; the ledger forgets it.
    c.ledger = Ledger::new();

    let err = c.compile("int b = 2;", CompileOptions::raw()).unwrap_err();
    assert!(matches!(err, SessionError::InternalInconsistency(_)), "{err:?}");
    assert!(c.is_poisoned());
    for text in ["int c = 3;", "1 +", ""] {
        assert_eq!(
            c.compile(text, CompileOptions::default()).unwrap_err(),
            SessionError::Poisoned
        );
    }

    c.reset();
    assert!(!c.is_poisoned());
    let out = c.compile("int a = 5;", CompileOptions::raw()).unwrap();
    assert_eq!(out.status, CompileStatus::Success);
    assert_eq!(c.ledger().len(), 1);
    assert_eq!(c.context().len(), 1);
}
