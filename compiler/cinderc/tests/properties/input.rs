use cinderc::{InputValidator, LineResult, MetaProcessor, ValidationResult};

use super::common::session;

#[test]
fn test_open_brace_needs_more() {
    let mut v = InputValidator::new();
    assert_eq!(v.validate("{"), ValidationResult::NeedsMore { indent: 1 });
    v.reset();
    assert_eq!(v.validate("{}"), ValidationResult::Ready);
}

#[test]
fn test_brace_inside_string_is_ignored() {
    let mut v = InputValidator::new();
    assert_eq!(v.validate("puts(\"{\");"), ValidationResult::Ready);
    assert_eq!(v.take_input(), "puts(\"{\");");
}

#[test]
fn test_multiline_function_through_front_end() {
    let mut s = session();
    let mut meta = MetaProcessor::new();
    let lines = ["int fib(int n) {", "  if (n < 2) {", "    return n;", "  }"];
    let mut indents = Vec::new();
    for line in lines {
        match meta.process_line(&mut s, line).unwrap() {
            LineResult::NeedsMore { indent } => indents.push(indent),
            other => panic!("`{line}` completed early: {other:?}"),
        }
    }
    assert_eq!(indents, vec![1, 2, 2, 1]);

    meta.process_line(&mut s, "  return fib(n - 1) + fib(n - 2);").unwrap();
    assert!(matches!(
        meta.process_line(&mut s, "}").unwrap(),
        LineResult::Processed(out) if out.is_success()
    ));
    match meta.process_line(&mut s, "fib(10)").unwrap() {
        LineResult::Processed(out) => assert_eq!(out.value.unwrap().to_string(), "(int) 55"),
        other => panic!("unexpected result: {other:?}"),
    }
}
