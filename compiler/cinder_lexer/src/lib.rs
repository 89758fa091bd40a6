//! Lexer for the C++ subset using logos with string interning.
//!
//! Produces a [`LexOutput`] (tokens plus lexical errors) that the file
//! database caches per included file.

mod escape;

use cinder_diagnostic::{Diagnostic, ErrorCode};
use cinder_ir::{Span, StringInterner, Token, TokenKind, TokenList};
use logos::Logos;

use escape::{unescape, Unescaped};

/// How a block comment ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentEnd {
    Closed,
    Unclosed,
}

fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> CommentEnd {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            CommentEnd::Closed
        }
        None => {
            lex.bump(rest.len());
            CommentEnd::Unclosed
        }
    }
}

fn parse_int(text: &str, radix: u32) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    // Unsigned literals above i64::MAX wrap, like a conversion to `long`.
    u64::from_str_radix(digits, radix)
        .ok()
        .map(|v| v as i64)
}

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment(CommentEnd),

    #[regex(r"\\[ \t]*\n")]
    LineContinuation,

    // Type keywords
    #[token("void")]
    Void,
    #[token("bool")]
    Bool,
    #[token("char")]
    Char,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("short")]
    Short,
    #[token("signed")]
    Signed,
    #[token("unsigned")]
    Unsigned,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("auto")]
    Auto,
    #[token("const")]
    Const,

    // Other keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("enum")]
    Enum,
    #[token("typedef")]
    Typedef,
    #[token("using")]
    Using,
    #[token("throw")]
    Throw,

    // Full C++ keywords outside the subset
    #[token("class")]
    #[token("struct")]
    #[token("union")]
    #[token("template")]
    #[token("typename")]
    #[token("namespace")]
    #[token("new")]
    #[token("delete")]
    #[token("try")]
    #[token("catch")]
    #[token("operator")]
    #[token("switch")]
    #[token("case")]
    #[token("default")]
    #[token("goto")]
    #[token("sizeof")]
    #[token("static")]
    #[token("extern")]
    #[token("inline")]
    #[token("virtual")]
    #[token("this")]
    #[token("nullptr")]
    Unsupported,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("#")]
    Hash,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    // Hex integer
    #[regex(r"0[xX][0-9a-fA-F]+[uUlL]*", |lex| parse_int(&lex.slice()[2..], 16))]
    HexInt(i64),

    // Decimal integer (a leading 0 is still read as decimal)
    #[regex(r"[0-9]+[uUlL]*", |lex| parse_int(lex.slice(), 10))]
    DecInt(i64),

    // Float
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFlL]?", |lex| parse_float(lex.slice()))]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fFlL]?", |lex| parse_float(lex.slice()))]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFlL]?", |lex| parse_float(lex.slice()))]
    FloatLit(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedStr,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    CharLit,

    #[regex(r"'([^'\\\n]|\\.)*")]
    UnterminatedChar,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

fn parse_float(text: &str) -> Option<f64> {
    text.trim_end_matches(['f', 'F', 'l', 'L']).parse::<f64>().ok()
}

/// Kind of lexical error.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    InvalidCharLiteral,
    InvalidNumber,
    UnterminatedComment,
}

/// A lexical error with its location.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let text = source.get(self.span.to_range()).unwrap_or("");
        match self.kind {
            LexErrorKind::UnexpectedCharacter => Diagnostic::error(ErrorCode::E0001)
                .with_message(format!("unexpected character `{text}`"))
                .with_label(self.span, "not valid here"),
            LexErrorKind::UnterminatedString => Diagnostic::error(ErrorCode::E0002)
                .with_message("missing terminating `\"` character")
                .with_label(self.span, "string starts here"),
            LexErrorKind::InvalidCharLiteral => Diagnostic::error(ErrorCode::E0003)
                .with_message("invalid character literal")
                .with_label(self.span, "expected exactly one character between `'`")
                .with_note("multi-character and empty literals are not supported"),
            LexErrorKind::InvalidNumber => Diagnostic::error(ErrorCode::E0004)
                .with_message(format!("invalid number literal `{text}`"))
                .with_label(self.span, "out of range or malformed"),
            LexErrorKind::UnterminatedComment => Diagnostic::error(ErrorCode::E0005)
                .with_message("unterminated `/*` comment")
                .with_label(self.span, "comment starts here"),
        }
    }
}

/// Tokens and errors for one source buffer.
///
/// # Salsa Compatibility
/// Clone, Eq, Hash, Debug so it can be returned from a tracked query.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LexOutput {
    pub tokens: TokenList,
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn diagnostics(&self, source: &str) -> Vec<Diagnostic> {
        self.errors.iter().map(|e| e.to_diagnostic(source)).collect()
    }
}

/// Lex source code into tokens, collecting errors instead of stopping.
///
/// The token list always ends with [`TokenKind::Eof`].
pub fn lex(source: &str, interner: &StringInterner) -> LexOutput {
    let mut output = LexOutput::default();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        let raw = match token_result {
            Ok(raw) => raw,
            Err(()) => {
                let kind = if slice.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                    LexErrorKind::InvalidNumber
                } else {
                    LexErrorKind::UnexpectedCharacter
                };
                output.errors.push(LexError { kind, span });
                continue;
            }
        };

        let kind = match raw {
            RawToken::LineComment
            | RawToken::LineContinuation
            | RawToken::BlockComment(CommentEnd::Closed) => continue,
            RawToken::BlockComment(CommentEnd::Unclosed) => {
                output.errors.push(LexError {
                    kind: LexErrorKind::UnterminatedComment,
                    span: Span::new(span.start, span.start + 2),
                });
                continue;
            }
            RawToken::UnterminatedStr => {
                output.errors.push(LexError {
                    kind: LexErrorKind::UnterminatedString,
                    span,
                });
                continue;
            }
            RawToken::UnterminatedChar => {
                output.errors.push(LexError {
                    kind: LexErrorKind::InvalidCharLiteral,
                    span,
                });
                continue;
            }
            RawToken::CharLit => match unescape(&slice[1..slice.len() - 1]) {
                Unescaped::Single(c) => TokenKind::Char(c),
                Unescaped::Text(_) => {
                    output.errors.push(LexError {
                        kind: LexErrorKind::InvalidCharLiteral,
                        span,
                    });
                    continue;
                }
            },
            other => convert_token(other, slice, interner),
        };
        output.tokens.push(Token::new(kind, span));
    }

    let eof = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
    output.tokens.push(Token::new(TokenKind::Eof, eof));
    output
}

/// Convert a raw token to a `TokenKind`, interning strings.
fn convert_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::HexInt(n) | RawToken::DecInt(n) => TokenKind::Int(n),
        RawToken::FloatLit(f) => TokenKind::float(f),
        RawToken::Str => {
            let text = unescape(&slice[1..slice.len() - 1]).into_string();
            TokenKind::Str(interner.intern(&text))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
        RawToken::Unsupported => TokenKind::Unsupported(interner.intern(slice)),

        RawToken::Void => TokenKind::Void,
        RawToken::Bool => TokenKind::Bool,
        RawToken::Char => TokenKind::CharKw,
        RawToken::Int => TokenKind::IntKw,
        RawToken::Long => TokenKind::Long,
        RawToken::Short => TokenKind::Short,
        RawToken::Signed => TokenKind::Signed,
        RawToken::Unsigned => TokenKind::Unsigned,
        RawToken::Float => TokenKind::FloatKw,
        RawToken::Double => TokenKind::Double,
        RawToken::Auto => TokenKind::Auto,
        RawToken::Const => TokenKind::Const,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Enum => TokenKind::Enum,
        RawToken::Typedef => TokenKind::Typedef,
        RawToken::Using => TokenKind::Using,
        RawToken::Throw => TokenKind::Throw,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Question => TokenKind::Question,
        RawToken::Colon => TokenKind::Colon,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Hash => TokenKind::Hash,

        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::Eq => TokenKind::Eq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,

        // Trivia and error tokens are filtered out by `lex`.
        RawToken::LineComment
        | RawToken::LineContinuation
        | RawToken::BlockComment(_)
        | RawToken::UnterminatedStr
        | RawToken::UnterminatedChar
        | RawToken::CharLit => TokenKind::Eof,
    }
}

#[cfg(test)]
mod tests;
