//! `#include` directive extraction.
//!
//! Directives are removed before lexing: each directive line is replaced
//! by spaces of the same byte length, so every other span in the text keeps
//! its offset and diagnostics point at the user's own columns.

use cinder_ir::Span;

/// One `#include` directive.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct IncludeDirective {
    /// Path exactly as written between the delimiters.
    pub path: String,
    /// `<path>` rather than `"path"`.
    pub angled: bool,
    /// The directive text, for diagnostics.
    pub span: Span,
}

/// Text with its include directives blanked out.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Directives {
    pub text: String,
    pub includes: Vec<IncludeDirective>,
    /// `#include` lines without a usable path.
    pub malformed: Vec<Span>,
}

/// Split `source` into include directives and the remaining text.
pub fn extract_includes(source: &str) -> Directives {
    let mut directives = Directives {
        text: String::with_capacity(source.len()),
        ..Directives::default()
    };
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim_start();
        let argument = trimmed
            .strip_prefix('#')
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix("include"));

        match argument {
            Some(argument) => {
                let start = offset + (body.len() - trimmed.len());
                let span = Span::from_range(start..offset + body.len());
                match parse_target(argument.trim()) {
                    Some((path, angled)) => directives.includes.push(IncludeDirective {
                        path: path.to_owned(),
                        angled,
                        span,
                    }),
                    None => directives.malformed.push(span),
                }
                directives.text.push_str(&" ".repeat(body.len()));
                directives.text.push_str(&line[body.len()..]);
            }
            None => directives.text.push_str(line),
        }
        offset += line.len();
    }
    directives
}

/// `"path"` or `<path>`, optionally followed by a line comment.
fn parse_target(argument: &str) -> Option<(&str, bool)> {
    let (close, angled) = match argument.chars().next()? {
        '"' => ('"', false),
        '<' => ('>', true),
        _ => return None,
    };
    let inner = &argument[1..];
    let end = inner.find(close)?;
    let (path, rest) = (&inner[..end], inner[end + 1..].trim());
    (!path.is_empty() && (rest.is_empty() || rest.starts_with("//"))).then_some((path, angled))
}
