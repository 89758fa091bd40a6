//! Statement execution.

use cinder_ir::{HStmt, HStmtKind};
use cinder_stack::ensure_sufficient_stack;

use super::{Flow, Frame, Interpreter};
use crate::{EvalError, EvalErrorKind, Value};

impl Interpreter<'_> {
    pub(super) fn exec_block(
        &mut self,
        stmts: &[HStmt],
        frame: &mut Frame,
    ) -> Result<Flow, EvalError> {
        for stmt in stmts {
            match self.exec_stmt(stmt, frame)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &HStmt, frame: &mut Frame) -> Result<Flow, EvalError> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt, frame))
    }

    fn exec_stmt_inner(&mut self, stmt: &HStmt, frame: &mut Frame) -> Result<Flow, EvalError> {
        match &stmt.kind {
            HStmtKind::Expr(expr) => {
                self.eval(expr, frame)?;
            }
            HStmtKind::Local { slot, ty, init, .. } => {
                let value = match init {
                    Some(init) => self.eval(init, frame)?.convert(ty)?,
                    None => Value::zero_of(ty),
                };
                frame.set(*slot, value)?;
            }
            HStmtKind::InitGlobal { decl, init } => {
                let ty = self.global_type(*decl)?;
                let value = self.eval(init, frame)?.convert(ty)?;
                self.globals.set(*decl, value);
            }
            HStmtKind::Block(stmts) => return self.exec_block(stmts, frame),
            HStmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond, frame)?.truthy()? {
                    return self.exec_stmt(then_branch, frame);
                }
                if let Some(else_branch) = else_branch {
                    return self.exec_stmt(else_branch, frame);
                }
            }
            HStmtKind::While { cond, body } => {
                while self.eval(cond, frame)?.truthy()? {
                    match self.exec_stmt(body, frame)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            HStmtKind::DoWhile { body, cond } => loop {
                match self.exec_stmt(body, frame)? {
                    Flow::Break => break,
                    Flow::Return(value) => return Ok(Flow::Return(value)),
                    Flow::Normal | Flow::Continue => {}
                }
                if !self.eval(cond, frame)?.truthy()? {
                    break;
                }
            },
            HStmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.exec_stmt(init, frame)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval(cond, frame)?.truthy()? {
                            break;
                        }
                    }
                    match self.exec_stmt(body, frame)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if let Some(step) = step {
                        self.eval(step, frame)?;
                    }
                }
            }
            HStmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, frame)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            }
            HStmtKind::Break => return Ok(Flow::Break),
            HStmtKind::Continue => return Ok(Flow::Continue),
            HStmtKind::Throw(value) => {
                let text = match value {
                    Some(expr) => Some(self.eval(expr, frame)?.display(self.interner).to_string()),
                    None => None,
                };
                return Err(EvalError::new(EvalErrorKind::Thrown(text)).at(stmt.span));
            }
            HStmtKind::Value(expr) => {
                let value = self.eval(expr, frame)?;
                self.captured = Some(value);
            }
        }
        Ok(Flow::Normal)
    }
}
