//! Expression evaluation, places and calls.

use cinder_ir::{
    BinaryOp, Builtin, Callee, DeclId, DeclKind, DeclLookup, DeferredRef, HExpr, HExprKind, Place,
    Type,
};
use cinder_stack::ensure_sufficient_stack;

use super::format::format_printf;
use super::operators::{binary, unary};
use super::{Args, Frame, Interpreter};
use crate::errors::{format_error, internal, not_callable, unresolved_name};
use crate::{EvalError, EvalResult, Value};

impl Interpreter<'_> {
    /// Evaluate `expr`, attaching its span to errors raised inside it.
    pub(super) fn eval(&mut self, expr: &HExpr, frame: &mut Frame) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr, frame)).map_err(|e| e.at(expr.span))
    }

    fn eval_inner(&mut self, expr: &HExpr, frame: &mut Frame) -> EvalResult {
        match &expr.kind {
            HExprKind::Int(v) => Ok(Value::Int(*v)),
            HExprKind::Float(v) => Ok(Value::Double(*v)),
            HExprKind::Bool(v) => Ok(Value::Bool(*v)),
            HExprKind::Char(v) => Ok(Value::Char(*v)),
            HExprKind::Str(v) => Ok(Value::Str(*v)),
            HExprKind::Local(slot) => frame.get(*slot),
            HExprKind::Global(id) => self.read_global(*id),
            HExprKind::FunctionRef(id) => Ok(Value::Function(*id)),
            HExprKind::Deferred(r) => self.read_deferred(r),
            HExprKind::Unary { op, operand } => {
                let value = self.eval(operand, frame)?;
                unary(*op, value)
            }
            HExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, frame)?;
                let rhs = self.eval(rhs, frame)?;
                binary(*op, lhs, rhs, self.interner)
            }
            HExprKind::Logical { is_and, lhs, rhs } => {
                let lhs = self.eval(lhs, frame)?.truthy()?;
                if lhs != *is_and {
                    return Ok(Value::Bool(lhs));
                }
                Ok(Value::Bool(self.eval(rhs, frame)?.truthy()?))
            }
            HExprKind::Assign { place, op, value } => {
                let value = self.eval(value, frame)?;
                let value = match op {
                    None => value,
                    Some(op) => {
                        let current = self.read_place(place, frame)?;
                        binary(*op, current, value, self.interner)?
                    }
                };
                self.write_place(place, value, &expr.ty, frame)
            }
            HExprKind::IncDec {
                place,
                increment,
                prefix,
            } => {
                let current = self.read_place(place, frame)?;
                let op = if *increment {
                    BinaryOp::Add
                } else {
                    BinaryOp::Sub
                };
                let next = binary(op, current, Value::Int(1), self.interner)?;
                let stored = self.write_place(place, next, &expr.ty, frame)?;
                Ok(if *prefix { stored } else { current })
            }
            HExprKind::Call { callee, args } => self.eval_call(callee, args, frame),
            HExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval(cond, frame)?.truthy()? {
                    self.eval(then_expr, frame)
                } else {
                    self.eval(else_expr, frame)
                }
            }
            HExprKind::Convert(inner) => self.eval(inner, frame)?.convert(&expr.ty),
        }
    }

    fn read_global(&self, id: DeclId) -> EvalResult {
        let ty = self.global_type(id)?;
        Ok(self.globals.get(id, ty))
    }

    fn read_place(&mut self, place: &Place, frame: &Frame) -> EvalResult {
        match place {
            Place::Local(slot) => frame.get(*slot),
            Place::Global(id) => self.read_global(*id),
            Place::Deferred(r) => {
                let id = self.resolve_deferred(r)?;
                self.read_global(id)
            }
        }
    }

    /// Store `value` converted to the place's type; returns the stored value.
    fn write_place(
        &mut self,
        place: &Place,
        value: Value,
        ty: &Type,
        frame: &mut Frame,
    ) -> EvalResult {
        match place {
            Place::Local(slot) => {
                let value = value.convert(ty)?;
                frame.set(*slot, value)?;
                Ok(value)
            }
            Place::Global(id) => {
                let value = value.convert(ty)?;
                self.globals.set(*id, value);
                Ok(value)
            }
            Place::Deferred(r) => {
                let id = self.resolve_deferred(r)?;
                let Ok(var_ty) = self.global_type(id) else {
                    return Err(unresolved_name(self.interner.lookup(r.name)));
                };
                let value = value.convert(var_ty)?;
                self.globals.set(id, value);
                Ok(value)
            }
        }
    }

    fn resolve_deferred(&self, r: &DeferredRef) -> Result<DeclId, EvalError> {
        let ctx = self.ctx;
        r.resolve_with(|name| ctx.lookup(name))
            .ok_or_else(|| unresolved_name(self.interner.lookup(r.name)))
    }

    fn read_deferred(&self, r: &DeferredRef) -> EvalResult {
        let id = self.resolve_deferred(r)?;
        match self.ctx.decl(id).map(|d| &d.kind) {
            Some(DeclKind::Variable(info)) => Ok(self.globals.get(id, &info.ty)),
            Some(DeclKind::Function(_)) => Ok(Value::Function(id)),
            Some(DeclKind::Enumerator { value, .. }) => Ok(Value::Int(*value)),
            _ => Err(unresolved_name(self.interner.lookup(r.name))),
        }
    }

    fn eval_call(&mut self, callee: &Callee, args: &[HExpr], frame: &mut Frame) -> EvalResult {
        let mut values = Args::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, frame)?);
        }
        match callee {
            Callee::Direct(id) => self.call_function(*id, values),
            Callee::Indirect(target) => match self.eval(target, frame)? {
                Value::Function(id) => self.call_function(id, values),
                other => Err(not_callable(other.type_name())),
            },
            Callee::Builtin(builtin) => self.call_builtin(*builtin, &values),
            Callee::Deferred(r) => match self.read_deferred(r)? {
                Value::Function(id) => self.call_function(id, values),
                other => Err(not_callable(other.type_name())),
            },
        }
    }

    fn call_builtin(&self, builtin: Builtin, args: &[Value]) -> EvalResult {
        let text = |value: Option<&Value>| match value {
            Some(Value::Str(name)) => Ok(self.interner.lookup(*name)),
            Some(other) => Err(format_error(format!(
                "`{}` expects a string, got {}",
                builtin.name(),
                other.type_name()
            ))),
            None => Err(internal(format!("`{}` called without arguments", builtin.name()))),
        };
        match builtin {
            Builtin::Printf => {
                let fmt = text(args.first())?;
                let rest = args.get(1..).unwrap_or_default();
                let out = format_printf(fmt, rest, self.interner)?;
                self.print.print(&out);
                Ok(Value::Int(i64::try_from(out.len()).unwrap_or(i64::MAX)))
            }
            Builtin::Puts => {
                let line = text(args.first())?;
                self.print.println(line);
                Ok(Value::Int(0))
            }
        }
    }
}
