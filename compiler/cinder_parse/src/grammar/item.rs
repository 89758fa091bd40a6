//! Top-level items: the wrapper, declarations, enums and typedefs.

use cinder_diagnostic::ErrorCode;
use cinder_ir::ast::{
    EnumDef, EnumeratorDef, FunctionDef, Item, Param, ParsedIncrement, ParsedType, Stmt, StmtKind,
    TypedefDef, VarDecl,
};
use cinder_ir::{Name, Span, TokenKind};

use crate::error::unsupported;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse translation-unit declarations until end of input.
    pub(crate) fn parse_raw(&mut self) -> Result<ParsedIncrement, ParseError> {
        let mut items = Vec::new();
        while !self.cursor.is_at_end() {
            if self.cursor.eat(TokenKind::Semi) {
                continue;
            }
            items.push(self.parse_decl_item()?);
        }
        Ok(ParsedIncrement {
            items,
            wrapper: None,
            value_item: None,
        })
    }

    /// Parse `void NAME() { items }` produced by the compiler's wrapping.
    pub(crate) fn parse_wrapped(&mut self) -> Result<ParsedIncrement, ParseError> {
        self.cursor.expect(TokenKind::Void)?;
        let (wrapper, _) = self.cursor.expect_ident()?;
        self.cursor.expect(TokenKind::LParen)?;
        self.cursor.expect(TokenKind::RParen)?;
        self.cursor.expect(TokenKind::LBrace)?;

        let mut items = Vec::new();
        let mut value_item = None;
        while !self.cursor.check(TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    "expected `}`, found end of input",
                    self.cursor.current_span(),
                ));
            }
            let (item, is_value) = self.parse_wrapped_item()?;
            if is_value {
                value_item = Some(items.len());
            }
            items.push(item);
        }
        self.cursor.expect(TokenKind::RBrace)?;
        if !self.cursor.is_at_end() {
            return Err(ParseError::new(
                ErrorCode::E1001,
                format!("unexpected {} after end of input", self.cursor.current_kind()),
                self.cursor.previous_span(),
            )
            .with_label("this closing brace has no matching `{`"));
        }

        Ok(ParsedIncrement {
            items,
            wrapper: Some(wrapper),
            value_item,
        })
    }

    /// The trailing item of a wrapped increment may omit its `;`: the
    /// wrapper's own closing brace follows directly.
    fn at_value_end(&self) -> bool {
        self.cursor.check(TokenKind::RBrace) && self.cursor.peek_kind(1) == TokenKind::Eof
    }

    /// Consume the `;` ending an item; returns true when it was omitted and
    /// the item is the increment's value.
    fn finish_item(&mut self, allow_value: bool) -> Result<bool, ParseError> {
        if self.cursor.eat(TokenKind::Semi) {
            Ok(false)
        } else if allow_value && self.at_value_end() {
            Ok(true)
        } else {
            self.cursor.expect(TokenKind::Semi).map(|_| false)
        }
    }

    fn parse_wrapped_item(&mut self) -> Result<(Item, bool), ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Hash | TokenKind::Unsupported(_) | TokenKind::Enum | TokenKind::Typedef
            | TokenKind::Using => Ok((self.parse_decl_item()?, false)),
            _ if self.at_decl_start() => self.parse_declaration(true),
            TokenKind::LBrace
            | TokenKind::If
            | TokenKind::While
            | TokenKind::Do
            | TokenKind::For
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::Throw
            | TokenKind::Semi => Ok((Item::Stmt(self.parse_stmt()?), false)),
            _ => {
                let expr = self.parse_expr()?;
                let is_value = self.finish_item(true)?;
                let span = expr.span.merge(self.cursor.previous_span());
                Ok((Item::Stmt(Stmt::new(StmtKind::Expr(expr), span)), is_value))
            }
        }
    }

    /// Parse one declaration item; anything else is an error.
    fn parse_decl_item(&mut self) -> Result<Item, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Hash => Err(self.preprocessor_error()),
            TokenKind::Unsupported(name) => Err(unsupported(
                format_args!("`{}`", self.interner.lookup(name)),
                self.cursor.current_span(),
            )),
            TokenKind::Enum => self.parse_enum().map(Item::Enum),
            TokenKind::Typedef | TokenKind::Using => self.parse_typedef().map(Item::Typedef),
            _ if self.at_decl_start() => self.parse_declaration(false).map(|(item, _)| item),
            other => Err(ParseError::new(
                ErrorCode::E1003,
                format!("expected declaration, found {other}"),
                self.cursor.current_span(),
            )
            .with_note("raw input accepts only declarations; statements need wrapped input")),
        }
    }

    pub(crate) fn preprocessor_error(&self) -> ParseError {
        let directive = match self.cursor.peek_kind(1) {
            TokenKind::Ident(name) => format!("`#{}`", self.interner.lookup(name)),
            _ => "this preprocessor directive".to_owned(),
        };
        ParseError::new(
            ErrorCode::E1006,
            format!("{directive} is not supported"),
            self.cursor.current_span(),
        )
        .with_note("only `#include` lines are understood")
    }

    /// Variable or function declaration starting with a type.
    fn parse_declaration(&mut self, allow_value: bool) -> Result<(Item, bool), ParseError> {
        let ty = self.parse_type()?;
        let (name, name_span) = self.cursor.expect_ident()?;
        if self.cursor.check(TokenKind::LParen) {
            return self
                .parse_function(ty, name, name_span)
                .map(|f| (Item::Function(f), false));
        }
        let vars = self.parse_declarators(ty, name, name_span)?;
        let is_value = self.finish_item(allow_value)?;
        Ok((Item::Vars(vars), is_value))
    }

    /// Declarators after the type: `a = 1, b, c = f(2)`.
    pub(crate) fn parse_declarators(
        &mut self,
        ty: ParsedType,
        first: Name,
        first_span: Span,
    ) -> Result<Vec<VarDecl>, ParseError> {
        let mut vars = Vec::new();
        let (mut name, mut name_span) = (first, first_span);
        loop {
            if self.cursor.check(TokenKind::LBracket) {
                return Err(unsupported("arrays", self.cursor.current_span()));
            }
            if self.cursor.check(TokenKind::LBrace) {
                return Err(unsupported("brace initialization", self.cursor.current_span()));
            }
            let init = if self.cursor.eat(TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            vars.push(VarDecl {
                ty,
                name,
                name_span,
                init,
                span: name_span.merge(self.cursor.previous_span()),
            });
            if !self.cursor.eat(TokenKind::Comma) {
                return Ok(vars);
            }
            (name, name_span) = self.cursor.expect_ident()?;
        }
    }

    fn parse_function(
        &mut self,
        ret: ParsedType,
        name: Name,
        name_span: Span,
    ) -> Result<FunctionDef, ParseError> {
        self.cursor.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.cursor.check(TokenKind::Void) && self.cursor.peek_kind(1) == TokenKind::RParen {
            self.cursor.advance();
        } else if !self.cursor.check(TokenKind::RParen) {
            loop {
                let ty = self.parse_type()?;
                let param_name = match self.cursor.current_kind() {
                    TokenKind::Ident(n) => {
                        self.cursor.advance();
                        Some(n)
                    }
                    _ => None,
                };
                if self.cursor.check(TokenKind::LBracket) {
                    return Err(unsupported("array parameters", self.cursor.current_span()));
                }
                if self.cursor.check(TokenKind::Eq) {
                    return Err(unsupported("default arguments", self.cursor.current_span()));
                }
                params.push(Param {
                    ty,
                    name: param_name,
                    span: ty.span.merge(self.cursor.previous_span()),
                });
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(TokenKind::RParen)?;

        let body = if self.cursor.eat(TokenKind::Semi) {
            None
        } else if self.cursor.check(TokenKind::LBrace) {
            Some(self.parse_block_stmts()?)
        } else {
            return Err(ParseError::new(
                ErrorCode::E1001,
                format!(
                    "expected `;` or function body, found {}",
                    self.cursor.current_kind()
                ),
                self.cursor.current_span(),
            ));
        };

        Ok(FunctionDef {
            ret,
            name,
            name_span,
            params,
            body,
            span: ret.span.merge(self.cursor.previous_span()),
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDef, ParseError> {
        let start = self.cursor.expect(TokenKind::Enum)?.span;
        if let TokenKind::Unsupported(_) = self.cursor.current_kind() {
            return Err(unsupported("scoped enums", self.cursor.current_span()));
        }
        let name = match self.cursor.current_kind() {
            TokenKind::Ident(n) => {
                self.cursor.advance();
                Some(n)
            }
            _ => None,
        };
        if self.cursor.check(TokenKind::Colon) {
            return Err(unsupported(
                "enums with an underlying type",
                self.cursor.current_span(),
            ));
        }
        self.cursor.expect(TokenKind::LBrace)?;

        let mut enumerators = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) {
            let (enumerator, span) = self.cursor.expect_ident()?;
            let value = if self.cursor.eat(TokenKind::Eq) {
                Some(self.parse_ternary()?)
            } else {
                None
            };
            enumerators.push(EnumeratorDef {
                name: enumerator,
                value,
                span: span.merge(self.cursor.previous_span()),
            });
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(TokenKind::RBrace)?;
        if let TokenKind::Ident(_) = self.cursor.current_kind() {
            return Err(unsupported(
                "declaring variables in an enum definition",
                self.cursor.current_span(),
            ));
        }
        self.cursor.expect(TokenKind::Semi)?;

        if let Some(name) = name {
            self.local_types.insert(name);
        }
        Ok(EnumDef {
            name,
            enumerators,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `typedef T name;` or `using name = T;`.
    fn parse_typedef(&mut self) -> Result<TypedefDef, ParseError> {
        let start = self.cursor.current_span();
        let (name, ty) = if self.cursor.eat(TokenKind::Typedef) {
            let ty = self.parse_type()?;
            let (name, _) = self.cursor.expect_ident()?;
            (name, ty)
        } else {
            self.cursor.expect(TokenKind::Using)?;
            if let TokenKind::Unsupported(_) = self.cursor.current_kind() {
                return Err(unsupported("`using namespace`", self.cursor.current_span()));
            }
            let (name, _) = self.cursor.expect_ident()?;
            self.cursor.expect(TokenKind::Eq)?;
            (name, self.parse_type()?)
        };
        self.cursor.expect(TokenKind::Semi)?;
        self.local_types.insert(name);
        Ok(TypedefDef {
            name,
            ty,
            span: start.merge(self.cursor.previous_span()),
        })
    }
}
