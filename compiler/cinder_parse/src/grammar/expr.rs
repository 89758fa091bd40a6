//! Expressions, by C++ precedence.
//!
//! assignment → ternary → binary (precedence climbing) → unary/cast →
//! postfix → primary.

use cinder_diagnostic::ErrorCode;
use cinder_ir::ast::{Expr, ExprKind, UnaryOp};
use cinder_ir::{BinaryOp, TokenKind};
use cinder_stack::ensure_sufficient_stack;

use crate::error::unsupported;
use crate::{ParseError, Parser};

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        _ => return None,
    })
}

/// `=` maps to `Some(None)`, `op=` to `Some(Some(op))`.
fn assign_op(kind: TokenKind) -> Option<Option<BinaryOp>> {
    Some(match kind {
        TokenKind::Eq => None,
        TokenKind::PlusEq => Some(BinaryOp::Add),
        TokenKind::MinusEq => Some(BinaryOp::Sub),
        TokenKind::StarEq => Some(BinaryOp::Mul),
        TokenKind::SlashEq => Some(BinaryOp::Div),
        TokenKind::PercentEq => Some(BinaryOp::Rem),
        _ => return None,
    })
}

impl Parser<'_> {
    /// Full expression (the comma operator is not supported).
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Assignment is right-associative: `a = b = c` is `a = (b = c)`.
    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_ternary()?;
        let Some(op) = assign_op(self.cursor.current_kind()) else {
            return Ok(target);
        };
        self.cursor.advance();
        let value = ensure_sufficient_stack(|| self.parse_assignment())?;
        let span = target.span.merge(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    pub(crate) fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_binary(1)?;
        if !self.cursor.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.cursor.expect(TokenKind::Colon)?;
        let else_expr = self.parse_assignment()?;
        let span = cond.span.merge(else_expr.span);
        Ok(Expr::new(
            ExprKind::Ternary {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    /// Precedence climbing over left-associative binary operators.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let rhs = self.parse_binary(prec + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let increment = self.cursor.advance().kind == TokenKind::PlusPlus;
                let target = self.parse_unary()?;
                let span = start.merge(target.span);
                return Ok(Expr::new(
                    ExprKind::IncDec {
                        increment,
                        prefix: true,
                        target: Box::new(target),
                    },
                    span,
                ));
            }
            TokenKind::Amp => return Err(unsupported("taking addresses", start)),
            TokenKind::Star => return Err(unsupported("pointer dereference", start)),
            TokenKind::LParen if self.is_type_start_at(1) => {
                self.cursor.advance();
                let ty = self.parse_type()?;
                self.cursor.expect(TokenKind::RParen)?;
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                return Ok(Expr::new(
                    ExprKind::Cast {
                        ty,
                        expr: Box::new(operand),
                    },
                    span,
                ));
            }
            _ => None,
        };

        match op {
            Some(op) => {
                self.cursor.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(operand.span);
                Ok(Expr::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let mut args = Vec::new();
                    if !self.cursor.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_assignment()?);
                            if !self.cursor.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let end = self.cursor.expect(TokenKind::RParen)?.span;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let token = self.cursor.advance();
                    let span = expr.span.merge(token.span);
                    expr = Expr::new(
                        ExprKind::IncDec {
                            increment: token.kind == TokenKind::PlusPlus,
                            prefix: false,
                            target: Box::new(expr),
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    return Err(unsupported("array subscripts", self.cursor.current_span()));
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    return Err(unsupported("member access", self.cursor.current_span()));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.current();
        let kind = match token.kind {
            TokenKind::Int(v) => ExprKind::Int(v),
            TokenKind::Float(bits) => ExprKind::Float(f64::from_bits(bits)),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Char(c) => ExprKind::Char(c),
            TokenKind::Str(first) => return Ok(self.parse_string_literal(first)),
            TokenKind::Ident(name) => {
                if self.cursor.peek_kind(1) == TokenKind::ColonColon {
                    return Err(unsupported("qualified names", token.span));
                }
                ExprKind::Ident(name)
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                let end = self.cursor.expect(TokenKind::RParen)?.span;
                return Ok(Expr::new(inner.kind, token.span.merge(end)));
            }
            TokenKind::ColonColon => return Err(unsupported("qualified names", token.span)),
            TokenKind::Unsupported(name) => {
                return Err(unsupported(
                    format_args!("`{}`", self.interner.lookup(name)),
                    token.span,
                ));
            }
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1002,
                    format!("expected expression, found {other}"),
                    token.span,
                )
                .with_label("expected expression"));
            }
        };
        self.cursor.advance();
        Ok(Expr::new(kind, token.span))
    }

    /// Adjacent string literals concatenate: `"ab" "cd"` is `"abcd"`.
    fn parse_string_literal(&mut self, first: cinder_ir::Name) -> Expr {
        let start = self.cursor.advance().span;
        let mut name = first;
        while let TokenKind::Str(next) = self.cursor.current_kind() {
            self.cursor.advance();
            let joined = format!(
                "{}{}",
                self.interner.lookup(name),
                self.interner.lookup(next)
            );
            name = self.interner.intern(&joined);
        }
        Expr::new(
            ExprKind::Str(name),
            start.merge(self.cursor.previous_span()),
        )
    }
}
