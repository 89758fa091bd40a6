//! Statements inside function bodies and the wrapper.

use cinder_diagnostic::ErrorCode;
use cinder_ir::ast::{Stmt, StmtKind};
use cinder_ir::TokenKind;
use cinder_stack::ensure_sufficient_stack;

use crate::error::unsupported;
use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block_stmts()?),
            TokenKind::If => {
                self.cursor.advance();
                let cond = self.parse_paren_cond()?;
                let then_branch = Box::new(self.parse_stmt()?);
                let else_branch = if self.cursor.eat(TokenKind::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_paren_cond()?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::While { cond, body }
            }
            TokenKind::Do => {
                self.cursor.advance();
                let body = Box::new(self.parse_stmt()?);
                self.cursor.expect(TokenKind::While)?;
                let cond = self.parse_paren_cond()?;
                self.cursor.expect(TokenKind::Semi)?;
                StmtKind::DoWhile { body, cond }
            }
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.cursor.check(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.cursor.expect(TokenKind::Semi)?;
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::Semi)?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::Semi)?;
                StmtKind::Continue
            }
            TokenKind::Throw => {
                self.cursor.advance();
                let value = if self.cursor.check(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.cursor.expect(TokenKind::Semi)?;
                StmtKind::Throw(value)
            }
            TokenKind::Semi => {
                self.cursor.advance();
                StmtKind::Empty
            }
            TokenKind::Enum | TokenKind::Typedef | TokenKind::Using => {
                return Err(unsupported("local type declarations", start));
            }
            TokenKind::Hash => return Err(self.preprocessor_error()),
            TokenKind::Unsupported(name) => {
                return Err(unsupported(
                    format_args!("`{}`", self.interner.lookup(name)),
                    start,
                ));
            }
            _ if self.at_decl_start() => {
                let kind = self.parse_local_vars()?;
                self.cursor.expect(TokenKind::Semi)?;
                kind
            }
            _ => {
                let expr = self.parse_expr()?;
                self.cursor.expect(TokenKind::Semi)?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt::new(kind, start.merge(self.cursor.previous_span())))
    }

    /// `{ stmts }`
    pub(crate) fn parse_block_stmts(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.cursor.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) {
            if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ErrorCode::E1001,
                    "expected `}`, found end of input",
                    self.cursor.current_span(),
                ));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.cursor.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_paren_cond(&mut self) -> Result<cinder_ir::ast::Expr, ParseError> {
        self.cursor.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.cursor.expect(TokenKind::RParen)?;
        Ok(cond)
    }

    /// Local variable declaration without its terminating `;`.
    fn parse_local_vars(&mut self) -> Result<StmtKind, ParseError> {
        let ty = self.parse_type()?;
        let (name, name_span) = self.cursor.expect_ident()?;
        if self.cursor.check(TokenKind::LParen) {
            return Err(unsupported(
                "function declarations inside a function body",
                name_span,
            ));
        }
        Ok(StmtKind::Vars(self.parse_declarators(ty, name, name_span)?))
    }

    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.cursor.expect(TokenKind::For)?;
        self.cursor.expect(TokenKind::LParen)?;

        let init_start = self.cursor.current_span();
        let init = if self.cursor.eat(TokenKind::Semi) {
            None
        } else {
            let kind = if self.at_decl_start() {
                self.parse_local_vars()?
            } else {
                StmtKind::Expr(self.parse_expr()?)
            };
            self.cursor.expect(TokenKind::Semi)?;
            Some(Box::new(Stmt::new(
                kind,
                init_start.merge(self.cursor.previous_span()),
            )))
        };

        let cond = if self.cursor.check(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(TokenKind::Semi)?;

        let step = if self.cursor.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.cursor.expect(TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }
}
