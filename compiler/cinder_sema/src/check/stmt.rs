//! Statement checking and control-flow termination.

use cinder_diagnostic::{Diagnostic, ErrorCode};
use cinder_ir::ast::{Expr, Stmt, StmtKind};
use cinder_ir::{HExpr, HStmt, HStmtKind, Type};
use cinder_stack::ensure_sufficient_stack;

use super::{CheckResult, Checker};
use crate::const_eval::is_always_true;

impl Checker<'_, '_> {
    /// Check `stmt`, appending the result to `out`. Errors are reported and
    /// the statement is dropped.
    pub(super) fn check_stmt_into(&mut self, stmt: &Stmt, out: &mut Vec<HStmt>) {
        let result = ensure_sufficient_stack(|| self.try_check_stmt(stmt, out));
        self.report(result);
    }

    /// Check a statement in its own scope, as the body of a control
    /// statement.
    fn check_scoped(&mut self, stmt: &Stmt) -> HStmt {
        self.func.push_scope();
        let mut out = Vec::new();
        self.check_stmt_into(stmt, &mut out);
        self.func.pop_scope();
        single(out, stmt)
    }

    fn check_loop_body(&mut self, body: &Stmt) -> Box<HStmt> {
        self.func.loop_depth += 1;
        let body = self.check_scoped(body);
        self.func.loop_depth -= 1;
        Box::new(body)
    }

    fn try_check_stmt(&mut self, stmt: &Stmt, out: &mut Vec<HStmt>) -> CheckResult<()> {
        let span = stmt.span;
        let kind = match &stmt.kind {
            StmtKind::Empty => return Ok(()),
            StmtKind::Expr(expr) => {
                let expr = self.check_expr(expr)?;
                if !expr.ty.is_void() && !expr.has_side_effects() {
                    self.diagnostics.push(
                        Diagnostic::warning(ErrorCode::W2002)
                            .with_message("expression result unused")
                            .with_label(expr.span, "this value is discarded"),
                    );
                }
                HStmtKind::Expr(expr)
            }
            StmtKind::Vars(vars) => {
                for var in vars {
                    let (ty, init) = self.declared_type_and_init(var)?;
                    let slot = self.declare_local(var.name, ty.clone(), var.ty.is_const, var.name_span);
                    out.push(HStmt::new(
                        HStmtKind::Local {
                            slot,
                            name: var.name,
                            ty,
                            init,
                        },
                        var.span,
                    ));
                }
                return Ok(());
            }
            StmtKind::Block(stmts) => {
                self.func.push_scope();
                let mut inner = Vec::with_capacity(stmts.len());
                for stmt in stmts {
                    self.check_stmt_into(stmt, &mut inner);
                }
                self.func.pop_scope();
                HStmtKind::Block(inner)
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.check_cond(cond)?;
                let then_branch = Box::new(self.check_scoped(then_branch));
                let else_branch = else_branch.as_ref().map(|s| Box::new(self.check_scoped(s)));
                HStmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            StmtKind::While { cond, body } => {
                let cond = self.check_cond(cond)?;
                let body = self.check_loop_body(body);
                HStmtKind::While { cond, body }
            }
            StmtKind::DoWhile { body, cond } => {
                let body = self.check_loop_body(body);
                let cond = self.check_cond(cond)?;
                HStmtKind::DoWhile { body, cond }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.func.push_scope();
                let result = self.check_for(init.as_deref(), cond.as_ref(), step.as_ref(), body);
                self.func.pop_scope();
                result?
            }
            StmtKind::Return(value) => HStmtKind::Return(self.check_return(value.as_ref(), span)?),
            StmtKind::Break | StmtKind::Continue => {
                let is_break = matches!(stmt.kind, StmtKind::Break);
                if self.func.loop_depth == 0 {
                    let keyword = if is_break { "break" } else { "continue" };
                    return Err(Diagnostic::error(ErrorCode::E2011)
                        .with_message(format!("`{keyword}` statement not in loop"))
                        .with_label(span, "outside of any loop"));
                }
                if is_break {
                    HStmtKind::Break
                } else {
                    HStmtKind::Continue
                }
            }
            StmtKind::Throw(value) => {
                let value = value.as_ref().map(|v| self.check_expr(v)).transpose()?;
                if let Some(v) = &value {
                    if v.ty.is_void() {
                        return Err(self.void_value(v.span));
                    }
                }
                HStmtKind::Throw(value)
            }
        };
        out.push(HStmt::new(kind, span));
        Ok(())
    }

    fn check_cond(&mut self, cond: &Expr) -> CheckResult<HExpr> {
        let cond = self.check_expr(cond)?;
        self.condition(cond)
    }

    fn check_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        step: Option<&Expr>,
        body: &Stmt,
    ) -> CheckResult<HStmtKind> {
        let init = init.map(|s| {
            let mut out = Vec::new();
            self.check_stmt_into(s, &mut out);
            Box::new(single(out, s))
        });
        let cond = cond.map(|c| self.check_cond(c)).transpose()?;
        let step = step.map(|s| self.check_expr(s)).transpose()?;
        let body = self.check_loop_body(body);
        Ok(HStmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    fn check_return(
        &mut self,
        value: Option<&Expr>,
        span: cinder_ir::Span,
    ) -> CheckResult<Option<HExpr>> {
        let ret = self.func.ret.clone();
        match value {
            None if ret.is_void() => Ok(None),
            None => Err(Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "non-void function should return a value of type `{}`",
                    ret.display(self.interner)
                ))
                .with_label(span, "missing return value")),
            Some(value) => {
                let value = self.check_expr(value)?;
                if ret.is_void() {
                    if value.ty.is_void() {
                        return Ok(Some(value));
                    }
                    return Err(Diagnostic::error(ErrorCode::E2001)
                        .with_message("void function should not return a value")
                        .with_label(value.span, "unexpected return value"));
                }
                self.coerce(value, &ret).map(Some)
            }
        }
    }

    /// Check the trailing value item of a wrapped increment.
    pub(super) fn check_value_stmt(
        &mut self,
        stmt: &Stmt,
        out: &mut Vec<HStmt>,
    ) -> CheckResult<()> {
        let StmtKind::Expr(expr) = &stmt.kind else {
            self.check_stmt_into(stmt, out);
            return Ok(());
        };
        let expr = self.check_expr(expr)?;
        let kind = if expr.ty == Type::Void {
            HStmtKind::Expr(expr)
        } else {
            HStmtKind::Value(expr)
        };
        out.push(HStmt::new(kind, stmt.span));
        Ok(())
    }
}

fn single(mut out: Vec<HStmt>, origin: &Stmt) -> HStmt {
    if out.len() == 1 {
        if let Some(stmt) = out.pop() {
            return stmt;
        }
    }
    HStmt::new(HStmtKind::Block(out), origin.span)
}

/// Does control never fall off the end of `stmts`?
pub(super) fn terminates(stmts: &[HStmt]) -> bool {
    stmts.iter().any(stmt_terminates)
}

fn stmt_terminates(stmt: &HStmt) -> bool {
    match &stmt.kind {
        HStmtKind::Return(_) | HStmtKind::Throw(_) => true,
        HStmtKind::Block(stmts) => terminates(stmts),
        HStmtKind::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => stmt_terminates(then_branch) && stmt_terminates(else_branch),
        HStmtKind::While { cond, body } => is_always_true(cond) && !breaks(body),
        HStmtKind::For { cond, body, .. } => {
            cond.as_ref().map_or(true, is_always_true) && !breaks(body)
        }
        HStmtKind::DoWhile { body, cond } => {
            stmt_terminates(body) || (is_always_true(cond) && !breaks(body))
        }
        _ => false,
    }
}

/// Does `stmt` contain a `break` that leaves the enclosing loop?
fn breaks(stmt: &HStmt) -> bool {
    match &stmt.kind {
        HStmtKind::Break => true,
        HStmtKind::Block(stmts) => stmts.iter().any(breaks),
        HStmtKind::If {
            then_branch,
            else_branch,
            ..
        } => breaks(then_branch) || else_branch.as_deref().is_some_and(breaks),
        _ => false,
    }
}
