use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builder_collects_parts() {
    let diag = Diagnostic::error(ErrorCode::E2002)
        .with_message("use of undeclared identifier `x`")
        .with_label(Span::new(4, 5), "not found")
        .with_secondary_label(Span::new(0, 3), "in this call")
        .with_note("enable `.dynamicExtensions` to defer the lookup");

    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(4, 5)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes.len(), 1);
    assert_eq!(diag.labels[1].style, LabelStyle::Secondary);
}

#[test]
fn test_notes_and_help_keep_insertion_order() {
    let diag = Diagnostic::error(ErrorCode::E3001)
        .with_message("file not found")
        .with_suggestion("add a directory with `.I <dir>`")
        .with_note("searched the current directory");
    let kinds: Vec<_> = diag.notes.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, [NoteKind::Help, NoteKind::Note]);
    assert_eq!(
        diag.to_string(),
        "error [E3001]: file not found\n  \
         = help: add a directory with `.I <dir>`\n  \
         = note: searched the current directory"
    );
}

#[test]
fn test_display_names_included_file() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("expected `;`")
        .with_label(Span::new(12, 13), "here")
        .with_secondary_label(Span::new(0, 3), "declared here")
        .with_source(SourceInfo::new("lib.h", "int a;\nint b\nint c;"));
    assert_eq!(
        diag.to_string(),
        "error [E1001]: expected `;`\n  --> lib.h@12..13: here\n  ::: lib.h@0..3: declared here"
    );
}

#[test]
fn test_warning_is_not_error() {
    let diag = Diagnostic::warning(ErrorCode::W2002).with_message("expression result unused");
    assert!(!diag.is_error());
}

#[test]
fn test_display_format() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("expected `;`, found `}`")
        .with_label(Span::new(7, 8), "expected `;`");
    assert_eq!(
        diag.to_string(),
        "error [E1001]: expected `;`, found `}`\n  --> 7..8: expected `;`"
    );
}

#[test]
fn test_map_spans_moves_all_labels() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_label(Span::new(30, 35), "here")
        .with_secondary_label(Span::new(40, 41), "there")
        .map_spans(|span| span.shift_back(30));
    assert_eq!(diag.labels[0].span, Span::new(0, 5));
    assert_eq!(diag.labels[1].span, Span::new(10, 11));
}
