use super::*;
use crate::ErrorCode;
use cinder_ir::Span;

#[test]
fn test_counts_by_severity() {
    let mut queue = DiagnosticQueue::new();
    queue.push(Diagnostic::error(ErrorCode::E2002).with_message("a"));
    queue.push(Diagnostic::warning(ErrorCode::W2002).with_message("b"));
    queue.push(Diagnostic::warning(ErrorCode::W2001).with_message("c"));

    assert!(queue.has_errors());
    assert!(queue.has_warnings());
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.warning_count(), 2);
    assert_eq!(queue.len(), 3);
}

#[test]
fn test_exact_duplicates_are_dropped() {
    let mut queue = DiagnosticQueue::new();
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("expected `;`")
        .with_label(Span::new(3, 4), "here");
    queue.push(diag.clone());
    queue.push(diag);
    queue.push(
        Diagnostic::error(ErrorCode::E1001)
            .with_message("expected `;`")
            .with_label(Span::new(9, 10), "here"),
    );
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_into_vec_keeps_order() {
    let mut queue = DiagnosticQueue::new();
    queue.extend([
        Diagnostic::error(ErrorCode::E2001).with_message("first"),
        Diagnostic::error(ErrorCode::E2002).with_message("second"),
    ]);
    let messages: Vec<String> = queue.into_vec().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, ["first", "second"]);
}
