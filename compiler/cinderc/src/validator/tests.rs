#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{InputValidator, ValidationResult};

fn check(lines: &[&str]) -> ValidationResult {
    let mut v = InputValidator::new();
    let mut result = ValidationResult::Ready;
    for line in lines {
        result = v.validate(line);
    }
    result
}

#[test]
fn test_braces() {
    assert_eq!(check(&["{"]), ValidationResult::NeedsMore { indent: 1 });
    assert_eq!(check(&["{}"]), ValidationResult::Ready);
    assert_eq!(
        check(&["int f() {", "  if (x) {"]),
        ValidationResult::NeedsMore { indent: 2 }
    );
    assert_eq!(check(&["int f() {", "  return (1 +", "2); }"]), ValidationResult::Ready);
}

#[test]
fn test_literals_do_not_affect_balance() {
    assert_eq!(check(&["puts(\"{\");"]), ValidationResult::Ready);
    assert_eq!(check(&["char c = '(';"]), ValidationResult::Ready);
    assert_eq!(check(&["puts(\"a \\\" {\");"]), ValidationResult::Ready);
    assert_eq!(
        check(&["puts(\"open"]),
        ValidationResult::NeedsMore { indent: 1 }
    );
}

#[test]
fn test_comments() {
    assert_eq!(check(&["int x; // {"]), ValidationResult::Ready);
    assert_eq!(check(&["/* {"]), ValidationResult::NeedsMore { indent: 0 });
    assert_eq!(check(&["/* {", "} */ int y;"]), ValidationResult::Ready);
}

#[test]
fn test_continuation_line() {
    assert_eq!(check(&["int x = \\"]), ValidationResult::NeedsMore { indent: 0 });
    assert_eq!(check(&["int x = \\", "1;"]), ValidationResult::Ready);
}

#[test]
fn test_mismatched_closer_is_ready() {
    assert_eq!(check(&["{ )"]), ValidationResult::Ready);
    assert_eq!(check(&["}"]), ValidationResult::Ready);
}

#[test]
fn test_take_input_resets() {
    let mut v = InputValidator::new();
    assert!(v.is_empty());
    v.validate("int f() {");
    assert_eq!(v.depth(), 1);
    assert_eq!(v.validate("return 1; }"), ValidationResult::Ready);
    assert_eq!(v.take_input(), "int f() {\nreturn 1; }");
    assert!(v.is_empty());
    assert_eq!(v.depth(), 0);

    v.validate("{");
    v.reset();
    assert_eq!(v.validate("1"), ValidationResult::Ready);
}

proptest! {
    #[test]
    fn prop_nesting_depth_is_reported(depth in 1usize..40) {
        let open = "{".repeat(depth);
        prop_assert_eq!(check(&[&open]), ValidationResult::NeedsMore { indent: depth });
        let closed = format!("{open}{}", "}".repeat(depth));
        prop_assert_eq!(check(&[&closed]), ValidationResult::Ready);
    }

    #[test]
    fn prop_string_contents_are_ignored(body in "[^\"\\\\\n]*") {
        let line = format!("puts(\"{body}\");");
        prop_assert_eq!(check(&[&line]), ValidationResult::Ready);
    }

    #[test]
    fn prop_split_lines_match_single_line(brackets in "[{}()\\[\\] a;]{0,30}", split in 0usize..30) {
        let split = split.min(brackets.len());
        let (head, tail) = brackets.split_at(split);
        prop_assert_eq!(check(&[head, tail]), check(&[&brackets]));
    }
}
