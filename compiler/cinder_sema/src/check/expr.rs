//! Expression checking and name resolution.

use cinder_diagnostic::{Diagnostic, ErrorCode};
use cinder_ir::ast::{Expr, ExprKind, TypeSpec, UnaryOp};
use cinder_ir::{
    BinaryOp, Builtin, Callee, DeclId, DeclKind, DeclLookup, DeferredRef, HExpr, HExprKind, Name,
    Place, Signature, Span, Type,
};
use cinder_stack::ensure_sufficient_stack;

use super::types::{arithmetic_result, binary_type};
use super::{CheckResult, Checker};

impl Checker<'_, '_> {
    pub(super) fn check_expr(&mut self, expr: &Expr) -> CheckResult<HExpr> {
        ensure_sufficient_stack(|| self.check_expr_inner(expr))
    }

    fn check_expr_inner(&mut self, expr: &Expr) -> CheckResult<HExpr> {
        let span = expr.span;
        let (kind, ty) = match &expr.kind {
            ExprKind::Int(v) => (HExprKind::Int(*v), Type::Int),
            ExprKind::Float(v) => (HExprKind::Float(*v), Type::Double),
            ExprKind::Bool(v) => (HExprKind::Bool(*v), Type::Bool),
            ExprKind::Char(c) => (HExprKind::Char(*c), Type::Char),
            ExprKind::Str(s) => (HExprKind::Str(*s), Type::Str),
            ExprKind::Ident(name) => return self.check_ident(*name, span),
            ExprKind::Unary { op, operand } => {
                let operand = self.check_expr(operand)?;
                let ty = self.unary_type(*op, &operand)?;
                (
                    HExprKind::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                    ty,
                )
            }
            ExprKind::Binary { op, lhs, rhs } => return self.check_binary(*op, lhs, rhs, span),
            ExprKind::Assign { op, target, value } => {
                let (place, place_ty) = self.check_place(target)?;
                let value = self.check_expr(value)?;
                let value = match op {
                    None => self.coerce(value, &place_ty)?,
                    Some(op) => {
                        if binary_type(*op, &place_ty, &value.ty).is_none()
                            || matches!(place_ty, Type::Enum { .. })
                        {
                            return Err(self.invalid_operands(*op, &place_ty, &value.ty, span));
                        }
                        value
                    }
                };
                (
                    HExprKind::Assign {
                        place,
                        op: *op,
                        value: Box::new(value),
                    },
                    place_ty,
                )
            }
            ExprKind::IncDec {
                increment,
                prefix,
                target,
            } => {
                let (place, ty) = self.check_place(target)?;
                if !(ty.is_arithmetic() || ty.is_dynamic()) || matches!(ty, Type::Enum { .. }) {
                    return Err(Diagnostic::error(ErrorCode::E2005)
                        .with_message(format!(
                            "cannot {} a value of type `{}`",
                            if *increment { "increment" } else { "decrement" },
                            ty.display(self.interner)
                        ))
                        .with_label(target.span, "not an arithmetic variable"));
                }
                (
                    HExprKind::IncDec {
                        place,
                        increment: *increment,
                        prefix: *prefix,
                    },
                    ty,
                )
            }
            ExprKind::Call { callee, args } => return self.check_call(callee, args, span),
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let cond = self.check_expr(cond)?;
                let cond = self.condition(cond)?;
                let then_expr = self.check_expr(then_expr)?;
                let else_expr = self.check_expr(else_expr)?;
                let ty = if then_expr.ty == else_expr.ty {
                    then_expr.ty.clone()
                } else if then_expr.ty.is_dynamic() || else_expr.ty.is_dynamic() {
                    Type::Dynamic
                } else if then_expr.ty.is_arithmetic() && else_expr.ty.is_arithmetic() {
                    arithmetic_result(&then_expr.ty, &else_expr.ty)
                } else {
                    return Err(Diagnostic::error(ErrorCode::E2001)
                        .with_message(format!(
                            "incompatible operand types (`{}` and `{}`)",
                            then_expr.ty.display(self.interner),
                            else_expr.ty.display(self.interner)
                        ))
                        .with_label(span, "branches of `?:` disagree"));
                };
                let then_expr = self.coerce(then_expr, &ty)?;
                let else_expr = self.coerce(else_expr, &ty)?;
                (
                    HExprKind::Ternary {
                        cond: Box::new(cond),
                        then_expr: Box::new(then_expr),
                        else_expr: Box::new(else_expr),
                    },
                    ty,
                )
            }
            ExprKind::Cast { ty, expr: inner } => {
                let target = if ty.spec == TypeSpec::Auto {
                    return Err(Diagnostic::error(ErrorCode::E2013)
                        .with_message("`auto` is not allowed in a cast")
                        .with_label(ty.span, "type cannot be deduced"));
                } else {
                    self.resolve_type(*ty)?
                };
                let inner = self.check_expr(inner)?;
                let mut cast = self.cast(inner, target)?;
                cast.span = span;
                return Ok(cast);
            }
        };
        Ok(HExpr::new(kind, ty, span))
    }

    fn check_ident(&mut self, name: Name, span: Span) -> CheckResult<HExpr> {
        if let Some(local) = self.func.lookup(name) {
            return Ok(HExpr::new(
                HExprKind::Local(local.slot),
                local.ty.clone(),
                span,
            ));
        }
        match self.pending.lookup(name) {
            Some(id) => self.decl_value(id, name, span),
            None if Builtin::from_name(self.name(name)).is_some() => {
                Err(Diagnostic::error(ErrorCode::E2009)
                    .with_message(format!(
                        "builtin `{}` can only be called",
                        self.name(name)
                    ))
                    .with_label(span, "not a value"))
            }
            None if self.options.dynamic_lookup => Ok(HExpr::new(
                HExprKind::Deferred(DeferredRef::new(name)),
                Type::Dynamic,
                span,
            )),
            None => Err(self.undeclared(name, span)),
        }
    }

    /// Value of a translation-unit declaration used as an expression.
    fn decl_value(&self, id: DeclId, name: Name, span: Span) -> CheckResult<HExpr> {
        let Some(decl) = self.pending.decl(id) else {
            return Err(internal_error(span));
        };
        let (kind, ty) = match &decl.kind {
            DeclKind::Variable(info) => (HExprKind::Global(id), info.ty.clone()),
            DeclKind::Function(info) => (
                HExprKind::FunctionRef(id),
                Type::Function(Box::new(info.sig.clone())),
            ),
            DeclKind::Enumerator { parent, value } => {
                (HExprKind::Int(*value), self.enumerator_type(*parent))
            }
            DeclKind::Enum { .. } | DeclKind::Typedef(_) => {
                return Err(Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "`{}` names a type, not a value",
                        self.name(name)
                    ))
                    .with_label(span, "expected a value"));
            }
            DeclKind::Wrapper(_) => return Err(self.undeclared(name, span)),
        };
        Ok(HExpr::new(kind, ty, span))
    }

    fn enumerator_type(&self, parent: DeclId) -> Type {
        match self.pending.decl(parent) {
            Some(decl) if decl.name != Name::EMPTY => Type::Enum {
                decl: parent,
                name: decl.name,
            },
            _ => Type::Int,
        }
    }

    /// Resolve an assignment target.
    fn check_place(&mut self, target: &Expr) -> CheckResult<(Place, Type)> {
        let ExprKind::Ident(name) = target.kind else {
            return Err(Diagnostic::error(ErrorCode::E2006)
                .with_message("expression is not assignable")
                .with_label(target.span, "cannot assign to this expression"));
        };
        if let Some(local) = self.func.lookup(name) {
            if local.is_const {
                return Err(self.const_assignment(name, target.span));
            }
            return Ok((Place::Local(local.slot), local.ty.clone()));
        }
        match self.pending.lookup(name) {
            Some(id) => match self.pending.decl(id).map(|d| &d.kind) {
                Some(DeclKind::Variable(info)) if info.is_const => {
                    Err(self.const_assignment(name, target.span))
                }
                Some(DeclKind::Variable(info)) => Ok((Place::Global(id), info.ty.clone())),
                _ => Err(Diagnostic::error(ErrorCode::E2006)
                    .with_message(format!("`{}` is not assignable", self.name(name)))
                    .with_label(target.span, "not a variable")),
            },
            None if self.options.dynamic_lookup => {
                Ok((Place::Deferred(DeferredRef::new(name)), Type::Dynamic))
            }
            None => Err(self.undeclared(name, target.span)),
        }
    }

    #[cold]
    fn const_assignment(&self, name: Name, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E2007)
            .with_message(format!(
                "cannot assign to variable `{}` with const-qualified type",
                self.name(name)
            ))
            .with_label(span, "variable is const")
    }

    fn unary_type(&self, op: UnaryOp, operand: &HExpr) -> CheckResult<Type> {
        let ty = &operand.ty;
        let result = match op {
            UnaryOp::Neg | UnaryOp::Plus if ty.is_dynamic() => Some(Type::Dynamic),
            UnaryOp::Neg | UnaryOp::Plus if ty.is_arithmetic() => {
                Some(arithmetic_result(ty, &Type::Int))
            }
            UnaryOp::Not if ty.is_scalar() => Some(Type::Bool),
            UnaryOp::BitNot if ty.is_dynamic() => Some(Type::Dynamic),
            UnaryOp::BitNot if ty.is_integral() => Some(Type::Int),
            _ => None,
        };
        result.ok_or_else(|| {
            Diagnostic::error(ErrorCode::E2005)
                .with_message(format!(
                    "invalid argument type `{}` to unary expression `{}`",
                    ty.display(self.interner),
                    op.as_str()
                ))
                .with_label(operand.span, "invalid operand")
        })
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> CheckResult<HExpr> {
        let lhs = self.check_expr(lhs)?;
        let rhs = self.check_expr(rhs)?;
        if op.is_logical() {
            let lhs = self.condition(lhs)?;
            let rhs = self.condition(rhs)?;
            return Ok(HExpr::new(
                HExprKind::Logical {
                    is_and: op == BinaryOp::And,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                Type::Bool,
                span,
            ));
        }
        let Some(ty) = binary_type(op, &lhs.ty, &rhs.ty) else {
            return Err(self.invalid_operands(op, &lhs.ty, &rhs.ty, span));
        };
        Ok(HExpr::new(
            HExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
            span,
        ))
    }

    #[cold]
    fn invalid_operands(&self, op: BinaryOp, lhs: &Type, rhs: &Type, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E2005)
            .with_message(format!(
                "invalid operands to binary expression (`{}` and `{}`)",
                lhs.display(self.interner),
                rhs.display(self.interner)
            ))
            .with_label(span, format!("`{}` cannot be applied here", op.as_str()))
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> CheckResult<HExpr> {
        let mut checked = Vec::with_capacity(args.len());
        for arg in args {
            let arg = self.check_expr(arg)?;
            if arg.ty.is_void() {
                return Err(self.void_value(arg.span));
            }
            checked.push(arg);
        }

        if let ExprKind::Ident(name) = callee.kind {
            if self.func.lookup(name).is_none() {
                match self.pending.lookup(name) {
                    Some(id) => {
                        if let Some(DeclKind::Function(info)) =
                            self.pending.decl(id).map(|d| &d.kind)
                        {
                            let sig = info.sig.clone();
                            return self.finish_call(Callee::Direct(id), &sig, checked, span);
                        }
                    }
                    None => {
                        if let Some(builtin) = Builtin::from_name(self.name(name)) {
                            return self.check_builtin_call(builtin, checked, span);
                        }
                        if self.options.dynamic_lookup {
                            return Ok(HExpr::new(
                                HExprKind::Call {
                                    callee: Callee::Deferred(DeferredRef::new(name)),
                                    args: checked,
                                },
                                Type::Dynamic,
                                span,
                            ));
                        }
                        return Err(self.undeclared(name, callee.span));
                    }
                }
            }
        }

        let callee = self.check_expr(callee)?;
        match &callee.ty {
            Type::Function(sig) => {
                let sig = (**sig).clone();
                self.finish_call(Callee::Indirect(Box::new(callee)), &sig, checked, span)
            }
            Type::Dynamic => Ok(HExpr::new(
                HExprKind::Call {
                    callee: Callee::Indirect(Box::new(callee)),
                    args: checked,
                },
                Type::Dynamic,
                span,
            )),
            other => Err(Diagnostic::error(ErrorCode::E2009)
                .with_message(format!(
                    "called object type `{}` is not a function",
                    other.display(self.interner)
                ))
                .with_label(callee.span, "not callable")),
        }
    }

    fn finish_call(
        &self,
        callee: Callee,
        sig: &Signature,
        args: Vec<HExpr>,
        span: Span,
    ) -> CheckResult<HExpr> {
        if args.len() != sig.params.len() {
            let which = if args.len() > sig.params.len() {
                "many"
            } else {
                "few"
            };
            return Err(Diagnostic::error(ErrorCode::E2008)
                .with_message(format!(
                    "too {which} arguments to function call, expected {}, have {}",
                    sig.params.len(),
                    args.len()
                ))
                .with_label(span, "in this call"));
        }
        let args = args
            .into_iter()
            .zip(&sig.params)
            .map(|(arg, param)| self.coerce(arg, param))
            .collect::<CheckResult<Vec<_>>>()?;
        Ok(HExpr::new(
            HExprKind::Call { callee, args },
            sig.ret.clone(),
            span,
        ))
    }

    fn check_builtin_call(
        &self,
        builtin: Builtin,
        args: Vec<HExpr>,
        span: Span,
    ) -> CheckResult<HExpr> {
        let arity_ok = match builtin {
            Builtin::Printf => !args.is_empty(),
            Builtin::Puts => args.len() == 1,
        };
        if !arity_ok {
            return Err(Diagnostic::error(ErrorCode::E2008)
                .with_message(format!(
                    "wrong number of arguments to `{}`",
                    builtin.name()
                ))
                .with_label(span, "in this call"));
        }
        if let Some(first) = args.first() {
            if !matches!(first.ty, Type::Str | Type::Dynamic) {
                return Err(self.mismatch(first, &Type::Str));
            }
        }
        Ok(HExpr::new(
            HExprKind::Call {
                callee: Callee::Builtin(builtin),
                args,
            },
            Type::Int,
            span,
        ))
    }
}

#[cold]
fn internal_error(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9001)
        .with_message("declaration bound to a name is missing")
        .with_label(span, "while resolving this name")
}
