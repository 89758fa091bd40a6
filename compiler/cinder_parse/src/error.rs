//! Parse error type.

use cinder_diagnostic::{Diagnostic, ErrorCode};
use cinder_ir::Span;

/// A parse error. Parsing stops at the first one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// Label text at the error location; defaults to the message.
    pub label: Option<String>,
    pub note: Option<String>,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            label: None,
            note: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = self.label.clone().unwrap_or_else(|| self.message.clone());
        let diag = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, label);
        match &self.note {
            Some(note) => diag.with_note(note.clone()),
            None => diag,
        }
    }
}

/// Error for a C++ feature outside the supported subset.
#[cold]
pub(crate) fn unsupported(what: impl std::fmt::Display, span: Span) -> ParseError {
    ParseError::new(ErrorCode::E1004, format!("{what} is not supported"), span)
        .with_label("not supported by this interpreter")
}
