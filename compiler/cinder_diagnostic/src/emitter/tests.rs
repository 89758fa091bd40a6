#![allow(clippy::unwrap_used)]

use super::*;
use crate::ErrorCode;
use cinder_ir::Span;
use pretty_assertions::assert_eq;

fn render(diag: &Diagnostic, input: &SourceInfo) -> String {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit(diag, input);
    emitter.flush();
    String::from_utf8(emitter.into_inner()).unwrap()
}

#[test]
fn test_renders_line_col_and_caret() {
    let input = SourceInfo::new("input_line_1", "int y = x + 1;");
    let diag = Diagnostic::error(ErrorCode::E2002)
        .with_message("use of undeclared identifier `x`")
        .with_label(Span::new(8, 9), "not found in this scope")
        .with_note("names are looked up in earlier inputs");

    assert_eq!(
        render(&diag, &input),
        "error[E2002]: use of undeclared identifier `x`\n\
         \x20 --> input_line_1:1:9\n\
         \x20  |\n\
         \x201 | int y = x + 1;\n\
         \x20  |         ^ not found in this scope\n\
         \x20 = note: names are looked up in earlier inputs\n"
    );
}

#[test]
fn test_included_file_source_wins() {
    let input = SourceInfo::new("input_line_2", "#include \"lib.h\"");
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("expected `;`")
        .with_label(Span::new(12, 13), "here")
        .with_source(SourceInfo::new("lib.h", "int a;\nint b\nint c;"));

    let text = render(&diag, &input);
    assert!(text.contains("--> lib.h:2:6"), "{text}");
    assert!(text.contains("2 | int b"), "{text}");
}

#[test]
fn test_colors_when_enabled() {
    let input = SourceInfo::new("input_line_1", "1;");
    let diag = Diagnostic::warning(ErrorCode::W2002)
        .with_message("expression result unused")
        .with_label(Span::new(0, 1), "value discarded");
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Always, false);
    emitter.emit(&diag, &input);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.contains("\x1b["));
    assert!(text.contains("W2002"));
}

#[test]
fn test_span_past_end_of_empty_source_renders_at_column_one() {
    let input = SourceInfo::new("input_line_3", "");
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("expected expression")
        .with_label(Span::new(5, 6), "input ends here");

    assert_eq!(
        render(&diag, &input),
        "error[E1001]: expected expression\n\
         \x20 --> input_line_3:1:1\n\
         \x20  |\n\
         \x201 | \n\
         \x20  | ^ input ends here\n"
    );
}

#[test]
fn test_secondary_label_and_help_line() {
    let input = SourceInfo::new("input_line_4", "int f();\nint f(int);");
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message("conflicting declaration of `f`")
        .with_label(Span::new(13, 14), "redeclared here")
        .with_secondary_label(Span::new(4, 5), "first declared here")
        .with_suggestion("rename one of them");

    let text = render(&diag, &input);
    assert!(text.contains("--> input_line_4:2:5"), "{text}");
    assert!(text.contains("::: input_line_4:1:5"), "{text}");
    assert!(text.contains("    - first declared here"), "{text}");
    assert!(text.ends_with("  = help: rename one of them\n"), "{text}");
}
