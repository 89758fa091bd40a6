#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::thread;

use cinder_eval::{buffer_handler, EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use super::{Session, SessionConfig, SharedSession};
use crate::compiler::{CompileStatus, FailureKind};
use crate::engine::RunStatus;
use crate::error::ExecuteFileError;
use crate::options::CompileOptions;

fn session() -> Session {
    Session::new(SessionConfig::new().with_print_handler(buffer_handler()))
}

fn shown(session: &mut Session, text: &str) -> Option<String> {
    let out = session.process(text).unwrap();
    assert!(out.is_success(), "{text}: {:?}", out.compile.diagnostics);
    out.value.map(|v| v.to_string())
}

#[test]
fn test_result_value_display() {
    let mut s = session();
    assert_eq!(shown(&mut s, "1 + 2").as_deref(), Some("(int) 3"));
    assert_eq!(shown(&mut s, "7 / 2.0").as_deref(), Some("(double) 3.5"));
    assert_eq!(shown(&mut s, "'x'").as_deref(), Some("(char) 'x'"));
    assert_eq!(shown(&mut s, "\"hi\"").as_deref(), Some("(const char *) \"hi\""));
    assert_eq!(shown(&mut s, "int quiet = 1;"), None);
}

#[test]
fn test_value_carries_transaction() {
    let mut s = session();
    s.process("int x = 4;").unwrap();
    let out = s.process("x * x").unwrap();
    let value = out.value.unwrap();
    assert_eq!(value.value, Value::Int(16));
    assert_eq!(value.transaction, out.compile.transaction.unwrap().id);
    assert_eq!(s.ledger().len(), 2);
}

#[test]
fn test_void_call_has_no_value() {
    let mut s = session();
    s.process("void hello() { puts(\"hello\"); }").unwrap();
    let out = s.process("hello()").unwrap();
    assert!(out.is_success());
    assert!(out.value.is_none());
    assert_eq!(s.print_handler().take_output(), "hello\n");
}

#[test]
fn test_runtime_failure_keeps_commit() {
    let mut s = session();
    let out = s.process("int before = 1;\nint bad = 1 / 0;").unwrap();
    assert_eq!(out.compile.status, CompileStatus::Success);
    let run = out.run.unwrap();
    assert_eq!(run.status, RunStatus::RuntimeFailure);
    assert_eq!(run.error.unwrap().kind, EvalErrorKind::DivisionByZero);
    assert_eq!(s.ledger().len(), 1);
    assert_eq!(shown(&mut s, "before").as_deref(), Some("(int) 1"));
}

#[test]
fn test_oversized_printf_field_is_a_runtime_failure() {
    let mut s = session();
    for text in ["printf(\"%.99999999999999999999d\", 1);", "printf(\"%.70000f\", 1.0);"] {
        let run = s.process(text).unwrap().run.unwrap();
        assert_eq!(run.status, RunStatus::RuntimeFailure);
        assert!(matches!(run.error.unwrap().kind, EvalErrorKind::FormatError(_)));
    }
    assert_eq!(shown(&mut s, "1 + 1").as_deref(), Some("(int) 2"));
}

#[test]
fn test_compile_failure_does_not_run() {
    let mut s = session();
    let out = s.process("puts(\"never\"); nope();").unwrap();
    assert_eq!(out.compile.status, CompileStatus::Failed(FailureKind::Type));
    assert!(out.run.is_none());
    assert!(!out.is_success());
    assert_eq!(s.print_handler().get_output(), "");
}

#[test]
fn test_declarations_only_skips_execution() {
    let mut s = session();
    let out = s
        .process_with("int n = 3;", CompileOptions::declarations_only())
        .unwrap();
    assert!(out.compile.transaction.is_some());
    assert!(out.run.is_none());
}

#[test]
fn test_execute_file_calls_function_named_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foo.cpp");
    fs::write(
        &path,
        "void foo(int a, int b) {\n    printf(\"%d\\n\", a + b);\n}\n",
    )
    .unwrap();

    let mut s = session();
    let spec = format!("{}(1, 2)", path.display());
    let out = s.execute_file(&spec).unwrap();
    assert!(out.load.is_success());
    let call = out.call.unwrap();
    assert!(call.is_success());
    assert!(call.value.is_none());
    assert_eq!(s.print_handler().take_output(), "3\n");
    assert_eq!(s.ledger().len(), 2);
}

#[test]
fn test_execute_file_without_arguments_only_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lib.cpp");
    fs::write(&path, "int twice(int v) { return v * 2; }\nint seed = twice(21);\n").unwrap();

    let mut s = session();
    let out = s.execute_file(&path.display().to_string()).unwrap();
    assert!(out.call.is_none());
    assert_eq!(shown(&mut s, "seed").as_deref(), Some("(int) 42"));
}

#[test]
fn test_execute_missing_file() {
    let mut s = session();
    let err = s.execute_file("does/not/exist.cpp(1)").unwrap_err();
    assert!(matches!(err, ExecuteFileError::FileNotFound(_)));
    assert!(s.ledger().is_empty());
    assert!(s.context().is_empty());
}

#[test]
fn test_load_file_searches_include_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cinder_lib_on_path.h"), "int from_lib = 3;\nint triple(int v) { return v * 3; }\n").unwrap();

    let mut s = session();
    let relative = Path::new("cinder_lib_on_path.h");
    assert!(matches!(
        s.load_file(relative),
        Err(ExecuteFileError::FileNotFound(_))
    ));

    s.add_include_path(dir.path().to_path_buf());
    assert!(s.load_file(relative).unwrap().is_success());
    assert_eq!(shown(&mut s, "from_lib").as_deref(), Some("(int) 3"));

    match s.execute_file("cinder_lib_on_path.h(1)") {
        Err(ExecuteFileError::FunctionNotFound(name)) => assert_eq!(name, "cinder_lib_on_path"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_execute_file_missing_function() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entry.cpp");
    fs::write(&path, "int other() { return 0; }\n").unwrap();

    let mut s = session();
    let err = s.execute_file(&format!("{}()", path.display())).unwrap_err();
    match err {
        ExecuteFileError::FunctionNotFound(name) => assert_eq!(name, "entry"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_load_failure_reports_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.cpp");
    fs::write(&path, "int broken( {\n").unwrap();

    let mut s = session();
    match s.load_file(&path).unwrap_err() {
        ExecuteFileError::LoadFailed { diagnostics, .. } => assert!(!diagnostics.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(s.ledger().is_empty());
}

#[test]
fn test_native_library_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("libm.so");
    fs::write(&path, "").unwrap();

    let mut s = session();
    assert!(matches!(
        s.load_file(&path),
        Err(ExecuteFileError::LoadFailed { .. })
    ));
}

#[test]
fn test_stats_list_included_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("three.h");
    fs::write(&path, "int a = 1;\nint b = 2;\nint c = 3;\n").unwrap();

    let mut s = session();
    s.load_file(&path).unwrap();
    let stats = s.stats();
    assert_eq!(stats.transactions, 1);
    assert_eq!(stats.decls, 3);
    assert_eq!(stats.files.len(), 1);
    assert_eq!(stats.files[0].1, 3);
}

#[test]
fn test_reset_forgets_everything() {
    let mut s = session();
    s.process("int kept = 9;").unwrap();
    s.reset();
    assert!(s.ledger().is_empty());
    assert!(s.context().is_empty());
    let out = s.process("kept").unwrap();
    assert_eq!(out.compile.status, CompileStatus::Failed(FailureKind::Type));
    assert_eq!(shown(&mut s, "int kept = 1; kept").as_deref(), Some("(int) 1"));
}

#[test]
fn test_shared_session_serializes_submissions() {
    let shared = SharedSession::new(session());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut s = shared.lock();
                s.process(&format!("int v{i} = {i};")).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_success());
    }

    let s = shared.lock();
    assert_eq!(s.ledger().len(), 4);
    assert_eq!(s.context().len(), 8);
}
