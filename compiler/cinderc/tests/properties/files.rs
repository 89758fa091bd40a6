use std::fs;

use cinder_eval::Value;
use cinderc::ExecuteFileError;

use super::common::{eval, session};

#[test]
fn test_execute_file_loads_then_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foo.ext");
    fs::write(
        &path,
        "int calls = 0;\nvoid foo(int a, int b) {\n  calls++;\n  printf(\"%d %d\\n\", a, b);\n}\n",
    )
    .unwrap();

    let mut s = session();
    let out = s.execute_file(&format!("{}(1,2)", path.display())).unwrap();
    let load_tx = out.load.compile.transaction.unwrap();
    let call_tx = out.call.unwrap().compile.transaction.unwrap();
    assert!(call_tx.id > load_tx.id);
    assert_eq!(call_tx.previous, Some(load_tx.id));
    assert_eq!(s.print_handler().take_output(), "1 2\n");
    assert_eq!(eval(&mut s, "calls"), Value::Int(1));
}

#[test]
fn test_missing_file_attempts_no_compile() {
    let mut s = session();
    let err = s.execute_file("missing/foo.ext(1,2)").unwrap_err();
    assert!(matches!(err, ExecuteFileError::FileNotFound(_)));
    assert!(s.ledger().is_empty());
    assert!(s.context().is_empty());
}

#[test]
fn test_reloading_unchanged_file_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("consts.h");
    fs::write(&path, "int limit = 5;\n").unwrap();

    let mut s = session();
    s.load_file(&path).unwrap();
    let again = s.load_file(&path).unwrap();
    assert!(again.compile.transaction.is_none());
    assert_eq!(s.ledger().len(), 1);
    assert_eq!(eval(&mut s, "limit"), Value::Int(5));
}
