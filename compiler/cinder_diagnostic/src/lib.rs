//! Diagnostic system for compile-time error reporting.
//!
//! Every compile-time problem of an increment (lexing, parsing, type
//! checking, include resolution) is a [`Diagnostic`]:
//! - an [`ErrorCode`] whose first digit names the phase
//! - a message (what went wrong)
//! - labeled spans (where it went wrong)
//! - notes and suggestions (context and how to fix)
//!
//! Spans are relative to the text the user submitted, or to an included
//! file when [`Diagnostic::source`] names one.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, LabelStyle, Note, NoteKind, Severity, SourceInfo};
pub use error_code::{ErrorCode, Phase};
pub use queue::DiagnosticQueue;
