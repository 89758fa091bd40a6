//! [`Diagnostic`] and its parts.

use std::fmt;

use cinder_ir::Span;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    /// Rejects the increment.
    Error,
    /// Reported, but the increment still commits.
    Warning,
    Note,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Included file a diagnostic's spans point into.
///
/// Absent for diagnostics about the submitted text itself; the emitter is
/// handed that text separately.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    /// Canonical path the include resolved to.
    pub path: String,
    /// Text of the file as it was compiled.
    pub content: String,
}

impl SourceInfo {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        SourceInfo {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LabelStyle {
    /// Where the problem is.
    Primary,
    /// A related location, such as an earlier declaration.
    Secondary,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.style == LabelStyle::Primary
    }
}

/// Kind of trailing remark.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NoteKind {
    /// Extra context, such as the directories an include was searched in.
    Note,
    /// How to fix it.
    Help,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Note {
    pub kind: NoteKind,
    pub text: String,
}

/// One compile-time problem of an increment.
///
/// Built with [`Diagnostic::error`] or [`Diagnostic::warning`] and the
/// `with_*` methods:
///
/// ```text
/// Diagnostic::error(ErrorCode::E2002)
///     .with_message("use of undeclared identifier `x`")
///     .with_label(span, "not found")
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "a diagnostic does nothing until it is queued or returned"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Highlighted spans; the first primary one is the location.
    pub labels: Vec<Label>,
    /// Notes and help lines, in the order they were added.
    pub notes: Vec<Note>,
    /// Set when the spans refer to an included file.
    pub source: Option<SourceInfo>,
}

impl Diagnostic {
    #[cold]
    fn new(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            source: None,
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(self, text: impl Into<String>) -> Self {
        self.with_remark(NoteKind::Note, text.into())
    }

    pub fn with_suggestion(self, text: impl Into<String>) -> Self {
        self.with_remark(NoteKind::Help, text.into())
    }

    fn with_remark(mut self, kind: NoteKind, text: String) -> Self {
        self.notes.push(Note { kind, text });
        self
    }

    /// Attribute the spans to an included file.
    pub fn with_source(mut self, source: SourceInfo) -> Self {
        self.source = Some(source);
        self
    }

    /// Rewrite every label span, e.g. from wrapped text back to the
    /// user's own offsets.
    pub fn map_spans(mut self, f: impl Fn(Span) -> Span) -> Self {
        for label in &mut self.labels {
            label.span = f(label.span);
        }
        self
    }

    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary()).map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Compact one-line-per-part rendering, for logs and tests. The terminal
/// emitter resolves spans to lines and columns instead.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        let file = self.source.as_ref().map(|src| src.path.as_str());
        for label in &self.labels {
            let marker = match label.style {
                LabelStyle::Primary => "-->",
                LabelStyle::Secondary => ":::",
            };
            write!(f, "\n  {marker} ")?;
            if let Some(file) = file {
                write!(f, "{file}@")?;
            }
            write!(f, "{}..{}: {}", label.span.start, label.span.end, label.message)?;
        }
        for note in &self.notes {
            let kind = match note.kind {
                NoteKind::Note => "note",
                NoteKind::Help => "help",
            };
            write!(f, "\n  = {kind}: {}", note.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
