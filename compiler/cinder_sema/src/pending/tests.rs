#![allow(clippy::unwrap_used, clippy::expect_used)]

use cinder_ir::{DeclId, DeclKind, DeclLookup, Name, Span, Type};

use super::*;

#[test]
fn test_overlay_shadows_context_bindings() {
    let mut ctx = CompilationContext::new();
    let name = Name::from_raw(5);
    let mut first = PendingIncrement::new(&ctx);
    let old = first.push(name, Span::DUMMY, DeclKind::Typedef(Type::Int));
    first.bind(name, old);
    ctx.commit(first.finish()).unwrap();

    let mut pending = PendingIncrement::new(&ctx);
    assert_eq!(pending.lookup(name), Some(old));
    assert!(pending.is_type_name(name));
    let new = pending.push(name, Span::DUMMY, DeclKind::Typedef(Type::Double));
    pending.bind(name, new);
    assert_eq!(pending.lookup(name), Some(new));
    assert_eq!(ctx.lookup(name), Some(old));
    assert_eq!(new, DeclId::from_raw(1));
    assert!(pending.is_staged(new));
    assert!(!pending.is_staged(old));
    assert!(matches!(
        pending.decl(new).map(|d| &d.kind),
        Some(DeclKind::Typedef(Type::Double))
    ));
}

#[test]
fn test_dropping_pending_discards_everything() {
    let ctx = CompilationContext::new();
    let before = ctx.clone();
    {
        let mut pending = PendingIncrement::new(&ctx);
        let id = pending.push(Name::from_raw(1), Span::DUMMY, DeclKind::Typedef(Type::Int));
        pending.bind(Name::from_raw(1), id);
    }
    assert_eq!(ctx, before);
    assert!(ctx.is_empty());
}
