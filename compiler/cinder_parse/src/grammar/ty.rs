//! Type specifiers.

use cinder_diagnostic::ErrorCode;
use cinder_ir::ast::{ParsedType, TypeSpec};
use cinder_ir::TokenKind;

use crate::error::unsupported;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Does the current token start a declaration (as opposed to a statement)?
    pub(crate) fn at_decl_start(&self) -> bool {
        let kind = self.cursor.current_kind();
        if kind.starts_builtin_type() {
            return true;
        }
        match kind {
            // `T x` is a declaration even when `T` is not (yet) a known type;
            // the checker reports unknown type names.
            TokenKind::Ident(name) => {
                self.is_type_name(name) || matches!(self.cursor.peek_kind(1), TokenKind::Ident(_))
            }
            _ => false,
        }
    }

    /// Does the token `n` ahead start a type (used to recognize casts)?
    pub(crate) fn is_type_start_at(&self, n: usize) -> bool {
        let kind = self.cursor.peek_kind(n);
        if kind.starts_builtin_type() {
            return true;
        }
        match kind {
            TokenKind::Ident(name) => {
                self.is_type_name(name)
                    && matches!(
                        self.cursor.peek_kind(n + 1),
                        TokenKind::RParen | TokenKind::Star
                    )
            }
            _ => false,
        }
    }

    /// Parse a type: qualifiers, base type, and at most one `*` on `char`.
    pub(crate) fn parse_type(&mut self) -> Result<ParsedType, ParseError> {
        let start = self.cursor.current_span();
        let mut is_const = false;
        let mut has_int_modifier = false;
        let mut spec: Option<TypeSpec> = None;

        loop {
            let token = self.cursor.current();
            let next = match token.kind {
                TokenKind::Const => {
                    is_const = true;
                    None
                }
                TokenKind::Signed | TokenKind::Unsigned | TokenKind::Short | TokenKind::Long => {
                    has_int_modifier = true;
                    None
                }
                TokenKind::IntKw => Some(TypeSpec::Int),
                TokenKind::CharKw => Some(TypeSpec::Char),
                TokenKind::Bool => Some(TypeSpec::Bool),
                TokenKind::Void => Some(TypeSpec::Void),
                TokenKind::FloatKw | TokenKind::Double => Some(TypeSpec::Double),
                TokenKind::Auto => Some(TypeSpec::Auto),
                TokenKind::Ident(name) if spec.is_none() && !has_int_modifier => {
                    Some(TypeSpec::Named(name))
                }
                _ => break,
            };
            if let Some(next) = next {
                if spec.is_some() {
                    return Err(ParseError::new(
                        ErrorCode::E1005,
                        "two or more data types in declaration",
                        token.span,
                    )
                    .with_label("second type specifier"));
                }
                spec = Some(next);
            }
            self.cursor.advance();
        }

        let mut spec = match (spec, has_int_modifier) {
            (None, true) => TypeSpec::Int,
            (None, false) => {
                return Err(ParseError::new(
                    ErrorCode::E1005,
                    format!("expected type, found {}", self.cursor.current_kind()),
                    self.cursor.current_span(),
                ));
            }
            (Some(base), false)
            | (Some(base @ (TypeSpec::Int | TypeSpec::Char | TypeSpec::Double)), true) => base,
            (Some(_), true) => {
                return Err(ParseError::new(
                    ErrorCode::E1005,
                    "integer modifiers can only be combined with `int`, `char` or `double`",
                    start.merge(self.cursor.previous_span()),
                ));
            }
        };

        if self.cursor.check(TokenKind::Star) {
            let star = self.cursor.advance().span;
            if spec != TypeSpec::Char {
                return Err(unsupported("pointer types other than `const char*`", star));
            }
            spec = TypeSpec::Str;
            self.cursor.eat(TokenKind::Const);
            if self.cursor.check(TokenKind::Star) {
                return Err(unsupported("pointers to pointers", self.cursor.current_span()));
            }
        }
        if self.cursor.check(TokenKind::Amp) || self.cursor.check(TokenKind::AndAnd) {
            return Err(unsupported("reference types", self.cursor.current_span()));
        }

        Ok(ParsedType {
            spec,
            is_const,
            span: start.merge(self.cursor.previous_span()),
        })
    }
}
