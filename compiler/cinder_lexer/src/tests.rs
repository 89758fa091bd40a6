use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str, interner: &StringInterner) -> Vec<TokenKind> {
    lex(source, interner).tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_lex_declaration() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    assert_eq!(
        kinds("const int x = 0x1F;", &interner),
        vec![
            TokenKind::Const,
            TokenKind::IntKw,
            TokenKind::Ident(x),
            TokenKind::Eq,
            TokenKind::Int(31),
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_float_forms() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds("1.5 .25 2e3 3.f", &interner),
        vec![
            TokenKind::float(1.5),
            TokenKind::float(0.25),
            TokenKind::float(2000.0),
            TokenKind::float(3.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_integer_suffixes() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds("10u 20L 30ull", &interner),
        vec![
            TokenKind::Int(10),
            TokenKind::Int(20),
            TokenKind::Int(30),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_string_escapes() {
    let interner = StringInterner::new();
    let output = lex(r#""a\tb\n" '\n' '\x41'"#, &interner);
    assert!(!output.has_errors());
    let TokenKind::Str(name) = output.tokens[0].kind else {
        panic!("expected string token, got {:?}", output.tokens[0].kind);
    };
    assert_eq!(interner.lookup(name), "a\tb\n");
    assert_eq!(output.tokens[1].kind, TokenKind::Char('\n'));
    assert_eq!(output.tokens[2].kind, TokenKind::Char('A'));
}

#[test]
fn test_comments_are_skipped() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds("1 // one\n/* two\n lines */ 2", &interner),
        vec![TokenKind::Int(1), TokenKind::Int(2), TokenKind::Eof]
    );
}

#[test]
fn test_compound_operators() {
    let interner = StringInterner::new();
    assert_eq!(
        kinds("a += b << 2 && !c", &interner)[1..],
        [
            TokenKind::PlusEq,
            TokenKind::Ident(interner.intern("b")),
            TokenKind::Shl,
            TokenKind::Int(2),
            TokenKind::AndAnd,
            TokenKind::Bang,
            TokenKind::Ident(interner.intern("c")),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_unsupported_keywords_are_marked() {
    let interner = StringInterner::new();
    let class = interner.intern("class");
    assert_eq!(kinds("class", &interner)[0], TokenKind::Unsupported(class));
}

#[test]
fn test_unterminated_string_is_error() {
    let interner = StringInterner::new();
    let output = lex("\"abc", &interner);
    assert_eq!(
        output.errors,
        vec![LexError {
            kind: LexErrorKind::UnterminatedString,
            span: Span::new(0, 4),
        }]
    );
    let diag = output.errors[0].to_diagnostic("\"abc");
    assert_eq!(diag.code, ErrorCode::E0002);
}

#[test]
fn test_unterminated_block_comment_is_error() {
    let interner = StringInterner::new();
    let output = lex("1 /* open", &interner);
    assert_eq!(output.errors[0].kind, LexErrorKind::UnterminatedComment);
    assert_eq!(output.errors[0].span, Span::new(2, 4));
}

#[test]
fn test_bad_char_literal() {
    let interner = StringInterner::new();
    let output = lex("'ab' ''", &interner);
    assert_eq!(output.errors.len(), 2);
    assert!(output
        .errors
        .iter()
        .all(|e| e.kind == LexErrorKind::InvalidCharLiteral));
}

#[test]
fn test_unexpected_character() {
    let interner = StringInterner::new();
    let output = lex("int $x;", &interner);
    assert_eq!(output.errors[0].kind, LexErrorKind::UnexpectedCharacter);
    let diag = output.diagnostics("int $x;");
    assert_eq!(diag[0].code, ErrorCode::E0001);
    assert!(diag[0].message.contains('$'));
}

#[test]
fn test_token_list_equality_ignores_spans() {
    let interner = StringInterner::new();
    let a = lex("int x;", &interner);
    let b = lex("int   x ;", &interner);
    assert_eq!(a, b);
}
