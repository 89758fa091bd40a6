use cinder_eval::Value;
use cinderc::{CompileStatus, FailureKind};

use super::common::{eval, ok, session, status};

#[test]
fn test_earlier_declarations_are_visible() {
    let mut s = session();
    ok(&mut s, "int base = 10;");
    ok(&mut s, "int scale(int v) { return v * base; }");
    assert_eq!(eval(&mut s, "scale(4)"), Value::Int(40));
}

#[test]
fn test_later_declarations_are_not_retroactive() {
    let mut s = session();
    assert_eq!(
        status(&mut s, "int early() { return later; }"),
        CompileStatus::Failed(FailureKind::Type)
    );
    ok(&mut s, "int later = 3;");
    assert_eq!(
        status(&mut s, "early()"),
        CompileStatus::Failed(FailureKind::Type)
    );
}

#[test]
fn test_globals_outlive_their_increment() {
    let mut s = session();
    ok(&mut s, "int counter = 0;");
    for _ in 0..3 {
        ok(&mut s, "counter++;");
    }
    assert_eq!(eval(&mut s, "counter"), Value::Int(3));
}

#[test]
fn test_locals_stay_inside_their_block() {
    let mut s = session();
    ok(&mut s, "{ int hidden = 1; }");
    assert_eq!(
        status(&mut s, "hidden"),
        CompileStatus::Failed(FailureKind::Type)
    );
}
