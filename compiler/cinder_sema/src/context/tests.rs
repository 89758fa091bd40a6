#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use cinder_ir::{DeclId, DeclKind, DeclRange, Name, Span, Type, VariableInfo};
use pretty_assertions::assert_eq;

use super::*;
use crate::PendingIncrement;

fn variable() -> DeclKind {
    DeclKind::Variable(VariableInfo {
        ty: Type::Int,
        is_const: false,
        init: None,
    })
}

fn stage_one(ctx: &CompilationContext, name: Name) -> StagedIncrement {
    let mut pending = PendingIncrement::new(ctx);
    let id = pending.push(name, Span::DUMMY, variable());
    pending.bind(name, id);
    pending.finish()
}

#[test]
fn test_commit_returns_contiguous_ranges() {
    let mut ctx = CompilationContext::new();
    let first = ctx.commit(stage_one(&ctx, Name::from_raw(1))).unwrap();
    let second = ctx.commit(stage_one(&ctx, Name::from_raw(2))).unwrap();
    assert_eq!(first, DeclRange::new(DeclId::from_raw(0), DeclId::from_raw(1)));
    assert_eq!(second, DeclRange::new(DeclId::from_raw(1), DeclId::from_raw(2)));
    assert_eq!(ctx.lookup(Name::from_raw(2)), Some(DeclId::from_raw(1)));
    assert_eq!(ctx.decls_in(second).len(), 1);
}

#[test]
fn test_stale_increment_is_rejected() {
    let mut ctx = CompilationContext::new();
    let stale = stage_one(&ctx, Name::from_raw(1));
    ctx.commit(stage_one(&ctx, Name::from_raw(2))).unwrap();
    let before = ctx.clone();
    assert!(matches!(
        ctx.commit(stale),
        Err(CommitError::StaleIncrement { .. })
    ));
    assert_eq!(ctx, before);
}

#[test]
fn test_mark_changes_only_on_commit() {
    let mut ctx = CompilationContext::new();
    let mark = ctx.mark();
    drop(stage_one(&ctx, Name::from_raw(1)));
    assert_eq!(ctx.mark(), mark);
    ctx.commit(stage_one(&ctx, Name::from_raw(1))).unwrap();
    assert_ne!(ctx.mark(), mark);
}

#[test]
fn test_include_records_are_committed() {
    let mut ctx = CompilationContext::new();
    let path = PathBuf::from("lib.h");
    let mut pending = PendingIncrement::new(&ctx);
    pending.record_include(path.clone(), 42);
    assert_eq!(pending.include_fingerprint(&path), Some(42));
    let staged = pending.finish();
    assert!(!staged.is_empty());
    ctx.commit(staged).unwrap();
    assert_eq!(ctx.include_fingerprint(&path), Some(42));
}

#[test]
fn test_resolve_definition_follows_links() {
    let mut ctx = CompilationContext::new();
    let mut pending = PendingIncrement::new(&ctx);
    let proto = pending.push(Name::from_raw(1), Span::DUMMY, variable());
    let def = pending.push(Name::from_raw(1), Span::DUMMY, variable());
    pending.link_definition(proto, def);
    ctx.commit(pending.finish()).unwrap();
    assert_eq!(ctx.resolve_definition(proto), def);
    assert_eq!(ctx.resolve_definition(def), def);
    assert_eq!(ctx.definition_of(proto), Some(def));
}
