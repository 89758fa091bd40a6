//! Tokens produced by the lexer.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{Name, Span};

/// Token kinds for the C++ subset.
///
/// Floating literals are stored as raw bits so the whole token stream can be
/// `Eq + Hash` (required for salsa-cached token lists).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(u64),
    Str(Name),
    Char(char),
    Ident(Name),

    // Type keywords
    Void,
    Bool,
    CharKw,
    IntKw,
    Long,
    Short,
    Signed,
    Unsigned,
    FloatKw,
    Double,
    Auto,
    Const,

    // Other keywords
    If,
    Else,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,
    True,
    False,
    Enum,
    Typedef,
    Using,
    Throw,
    /// Keywords from full C++ that the subset rejects with a clear message.
    Unsupported(Name),

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Question,
    Colon,
    ColonColon,
    Dot,
    Arrow,
    Hash,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,

    Eof,
}

impl TokenKind {
    /// Wrap an `f64` literal.
    pub fn float(value: f64) -> Self {
        TokenKind::Float(value.to_bits())
    }

    /// Does this token start a type specifier?
    pub fn starts_builtin_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Bool
                | TokenKind::CharKw
                | TokenKind::IntKw
                | TokenKind::Long
                | TokenKind::Short
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::FloatKw
                | TokenKind::Double
                | TokenKind::Auto
                | TokenKind::Const
        )
    }

    /// Human-readable description used in "expected X, found Y" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Int(_) => "integer literal",
            TokenKind::Float(_) => "floating literal",
            TokenKind::Str(_) => "string literal",
            TokenKind::Char(_) => "character literal",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Void => "`void`",
            TokenKind::Bool => "`bool`",
            TokenKind::CharKw => "`char`",
            TokenKind::IntKw => "`int`",
            TokenKind::Long => "`long`",
            TokenKind::Short => "`short`",
            TokenKind::Signed => "`signed`",
            TokenKind::Unsigned => "`unsigned`",
            TokenKind::FloatKw => "`float`",
            TokenKind::Double => "`double`",
            TokenKind::Auto => "`auto`",
            TokenKind::Const => "`const`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::Do => "`do`",
            TokenKind::For => "`for`",
            TokenKind::Return => "`return`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Enum => "`enum`",
            TokenKind::Typedef => "`typedef`",
            TokenKind::Using => "`using`",
            TokenKind::Throw => "`throw`",
            TokenKind::Unsupported(_) => "unsupported keyword",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Semi => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Question => "`?`",
            TokenKind::Colon => "`:`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Dot => "`.`",
            TokenKind::Arrow => "`->`",
            TokenKind::Hash => "`#`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::Eq => "`=`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its source span.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// A lexed token stream, always terminated by [`TokenKind::Eof`].
///
/// # Salsa Compatibility
/// Clone, Eq, Hash, Debug. Equality ignores spans so that a whitespace-only
/// edit of an included file produces an equal token list.
#[derive(Clone, Default, Debug)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl PartialEq for TokenList {
    fn eq(&self, other: &Self) -> bool {
        self.tokens.len() == other.tokens.len()
            && self
                .tokens
                .iter()
                .zip(&other.tokens)
                .all(|(a, b)| a.kind == b.kind)
    }
}

impl Eq for TokenList {}

impl Hash for TokenList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.len().hash(state);
        for token in &self.tokens {
            token.kind.hash(state);
        }
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}
