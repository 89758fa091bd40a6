use cinder_diagnostic::ErrorCode;
use cinder_eval::Value;
use cinderc::CompileStatus;

use super::common::{eval, ok, session};

#[test]
fn test_latest_definition_wins_for_new_calls() {
    let mut s = session();
    ok(&mut s, "int f() { return 1; }");
    let out = s.process("int f() { return 2; }").unwrap();
    assert_eq!(out.compile.status, CompileStatus::SuccessWithWarnings);
    assert_eq!(out.compile.diagnostics[0].code, ErrorCode::W2001);
    assert_eq!(eval(&mut s, "f()"), Value::Int(2));
}

#[test]
fn test_captured_function_keeps_original() {
    let mut s = session();
    ok(&mut s, "int f() { return 1; }\nauto g = f;");
    ok(&mut s, "int caller() { return f(); }");
    ok(&mut s, "int f() { return 2; }");

    assert_eq!(eval(&mut s, "f()"), Value::Int(2));
    assert_eq!(eval(&mut s, "g()"), Value::Int(1));
    assert_eq!(eval(&mut s, "caller()"), Value::Int(1));
}

#[test]
fn test_prototype_links_to_later_definition() {
    let mut s = session();
    ok(&mut s, "int twice(int v);");
    ok(&mut s, "int quad(int v) { return twice(twice(v)); }");
    ok(&mut s, "int twice(int v) { return v + v; }");
    assert_eq!(eval(&mut s, "quad(3)"), Value::Int(12));
}
