use cinder_eval::{EvalErrorKind, Value};
use cinderc::{CompileOptions, CompileStatus, FailureKind, RunStatus};

use super::common::{eval, ok, session};

#[test]
fn test_unknown_name_fails_without_dynamic_lookup() {
    let mut s = session();
    let out = s.process("mystery + 1").unwrap();
    assert_eq!(out.compile.status, CompileStatus::Failed(FailureKind::Type));
    assert!(s.ledger().is_empty());
}

#[test]
fn test_dynamic_lookup_defers_to_run_time() {
    let mut s = session();
    let options = CompileOptions::default().with_dynamic_lookup(true);
    let out = s.process_with("mystery + 1", options).unwrap();
    assert_eq!(out.compile.status, CompileStatus::Success);
    let run = out.run.unwrap();
    assert_eq!(run.status, RunStatus::RuntimeFailure);
    assert!(matches!(
        run.error.unwrap().kind,
        EvalErrorKind::UnresolvedName(name) if name == "mystery"
    ));
    assert_eq!(s.ledger().len(), 1);
}

#[test]
fn test_deferred_name_resolves_once_defined() {
    let mut s = session();
    let options = CompileOptions::default().with_dynamic_lookup(true);
    s.set_options(options);
    ok(&mut s, "int doubled() { return mystery * 2; }");
    ok(&mut s, "int mystery = 21;");
    assert_eq!(eval(&mut s, "doubled()"), Value::Int(42));
}
