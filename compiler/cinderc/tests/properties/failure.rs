use cinder_eval::{EvalErrorKind, Value};
use cinderc::{CompileStatus, FailureKind, RunStatus};
use pretty_assertions::assert_eq;

use super::common::{eval, ok, session, status};

#[test]
fn test_failed_increment_is_idempotent() {
    let mut s = session();
    ok(&mut s, "int kept = 1;");
    let before = s.context().clone();

    for _ in 0..2 {
        let out = s.process("int partial = 2;\nint bad = kept + ;").unwrap();
        assert_eq!(out.compile.status, CompileStatus::Failed(FailureKind::Parse));
        assert!(out.compile.transaction.is_none());
        assert_eq!(s.context(), &before);
        assert_eq!(s.ledger().len(), 1);
    }

    assert_eq!(
        status(&mut s, "partial"),
        CompileStatus::Failed(FailureKind::Type)
    );
    assert_eq!(eval(&mut s, "kept + 1"), Value::Int(2));
}

#[test]
fn test_type_failure_commits_nothing() {
    let mut s = session();
    let out = s
        .process("int ok_part() { return 1; }\nint broken() { return nowhere(); }")
        .unwrap();
    assert_eq!(out.compile.status, CompileStatus::Failed(FailureKind::Type));
    assert!(s.context().is_empty());
    assert_eq!(
        status(&mut s, "ok_part()"),
        CompileStatus::Failed(FailureKind::Type)
    );
}

#[test]
fn test_runtime_failure_is_not_undone() {
    let mut s = session();
    ok(&mut s, "int zero = 0;");
    let out = s.process("int set_first = 7;\nint boom = 1 / zero;").unwrap();
    assert_eq!(out.compile.status, CompileStatus::Success);
    let run = out.run.unwrap();
    assert_eq!(run.status, RunStatus::RuntimeFailure);
    assert_eq!(run.error.unwrap().kind, EvalErrorKind::DivisionByZero);

    assert_eq!(s.ledger().len(), 2);
    assert_eq!(eval(&mut s, "set_first"), Value::Int(7));
    assert_eq!(eval(&mut s, "boom"), Value::Int(0));
}

#[test]
fn test_recursion_limit_is_a_runtime_failure() {
    let mut s = session();
    ok(&mut s, "int forever(int n) { return forever(n + 1); }");
    let out = s.process("forever(0)").unwrap();
    let run = out.run.unwrap();
    assert_eq!(run.status, RunStatus::RuntimeFailure);
    assert!(matches!(
        run.error.unwrap().kind,
        EvalErrorKind::RecursionLimit(_)
    ));
    assert_eq!(eval(&mut s, "1"), Value::Int(1));
}
