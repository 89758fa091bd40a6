//! Diagnostic emitters.
//!
//! The terminal emitter renders a diagnostic with its location as
//! `path:line:col`, the offending source line, and a caret underline.

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, LabelStyle, NoteKind, Severity, SourceInfo};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit one diagnostic. `input` is the submitted text the spans refer
    /// to unless the diagnostic names its own source.
    fn emit(&mut self, diagnostic: &Diagnostic, input: &SourceInfo);

    /// Emit multiple diagnostics against the same input.
    fn emit_all(&mut self, diagnostics: &[Diagnostic], input: &SourceInfo) {
        for diag in diagnostics {
            self.emit(diag, input);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Human-readable emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    /// Recover the writer (used by tests to inspect output).
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }
}

impl TerminalEmitter<io::Stderr> {
    /// Terminal emitter for stderr.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        Self::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, input: &SourceInfo) {
        self.write_severity(diagnostic.severity);
        let code = format!("[{}]", diagnostic.code);
        self.write_colored(&code, colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        let source = diagnostic.source.as_ref().unwrap_or(input);
        let table = LineOffsetTable::build(&source.content);

        for label in &diagnostic.labels {
            let (line, col) = table.offset_to_line_col(&source.content, label.span.start);
            let (marker, stroke, color) = match label.style {
                LabelStyle::Primary => ("-->", "^", colors::ERROR),
                LabelStyle::Secondary => (":::", "-", colors::SECONDARY),
            };
            let _ = writeln!(self.writer, "  {marker} {}:{line}:{col}", source.path);

            let text = table.line_text(&source.content, line);
            let gutter = line.to_string();
            let pad = " ".repeat(gutter.len());
            let _ = writeln!(self.writer, " {pad} |");
            let _ = writeln!(self.writer, " {gutter} | {text}");

            // Underline at least one column; spans past the line end stop there.
            let indent = col.saturating_sub(1);
            let line_len = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
            let room = line_len.saturating_sub(indent).max(1);
            let width = label.span.len().max(1).min(room);
            let _ = write!(self.writer, " {pad} | {}", " ".repeat(indent as usize));
            self.write_colored(
                &format!("{} {}", stroke.repeat(width as usize), label.message),
                color,
            );
            let _ = writeln!(self.writer);
        }

        for note in &diagnostic.notes {
            let (kind, color) = match note.kind {
                NoteKind::Note => ("note", colors::BOLD),
                NoteKind::Help => ("help", colors::HELP),
            };
            let _ = write!(self.writer, "  = ");
            self.write_colored(kind, color);
            let _ = writeln!(self.writer, ": {}", note.text);
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests;
