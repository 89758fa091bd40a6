//! Type resolution, implicit conversions and operator typing.

use cinder_diagnostic::{Diagnostic, ErrorCode};
use cinder_ir::ast::{ParsedType, TypeSpec};
use cinder_ir::{BinaryOp, DeclKind, DeclLookup, HExpr, HExprKind, Type};

use super::{CheckResult, Checker};

/// Usual arithmetic conversions, collapsed to the types this language has.
pub(super) fn arithmetic_result(lhs: &Type, rhs: &Type) -> Type {
    if lhs.is_dynamic() || rhs.is_dynamic() {
        Type::Dynamic
    } else if matches!(lhs, Type::Double) || matches!(rhs, Type::Double) {
        Type::Double
    } else {
        Type::Int
    }
}

fn arithmetic_or_dynamic(ty: &Type) -> bool {
    ty.is_arithmetic() || ty.is_dynamic()
}

fn integral_or_dynamic(ty: &Type) -> bool {
    ty.is_integral() || ty.is_dynamic()
}

/// Result type of a non-logical binary operator, or `None` when the
/// operands are invalid.
pub(super) fn binary_type(op: BinaryOp, lhs: &Type, rhs: &Type) -> Option<Type> {
    if lhs.is_void() || rhs.is_void() {
        return None;
    }
    if op.is_comparison() {
        let numeric = arithmetic_or_dynamic(lhs) && arithmetic_or_dynamic(rhs);
        let strings = matches!((lhs, rhs), (Type::Str, Type::Str));
        let functions = matches!(op, BinaryOp::Eq | BinaryOp::NotEq)
            && lhs.as_function().is_some()
            && lhs == rhs;
        let dynamic = (lhs.is_dynamic() && rhs.is_scalar()) || (rhs.is_dynamic() && lhs.is_scalar());
        return (numeric || strings || functions || dynamic).then_some(Type::Bool);
    }
    if op.is_integral_only() {
        return (integral_or_dynamic(lhs) && integral_or_dynamic(rhs))
            .then(|| arithmetic_result(lhs, rhs));
    }
    (arithmetic_or_dynamic(lhs) && arithmetic_or_dynamic(rhs)).then(|| arithmetic_result(lhs, rhs))
}

impl Checker<'_, '_> {
    pub(super) fn resolve_type(&self, parsed: ParsedType) -> CheckResult<Type> {
        Ok(match parsed.spec {
            TypeSpec::Void => Type::Void,
            TypeSpec::Bool => Type::Bool,
            TypeSpec::Char => Type::Char,
            TypeSpec::Int => Type::Int,
            TypeSpec::Double => Type::Double,
            TypeSpec::Str => Type::Str,
            TypeSpec::Auto => {
                return Err(Diagnostic::error(ErrorCode::E2013)
                    .with_message("`auto` is not allowed here")
                    .with_label(parsed.span, "type cannot be deduced"));
            }
            TypeSpec::Named(name) => {
                let decl = self.pending.lookup(name).and_then(|id| self.pending.decl(id));
                match decl.map(|d| (d.id, &d.kind)) {
                    Some((id, DeclKind::Enum { .. })) => Type::Enum { decl: id, name },
                    Some((_, DeclKind::Typedef(ty))) => ty.clone(),
                    _ => {
                        return Err(Diagnostic::error(ErrorCode::E2013)
                            .with_message(format!("unknown type name `{}`", self.name(name)))
                            .with_label(parsed.span, "not a type"));
                    }
                }
            }
        })
    }

    /// Implicitly convert `expr` to `target`.
    pub(super) fn coerce(&self, expr: HExpr, target: &Type) -> CheckResult<HExpr> {
        if expr.ty == *target {
            return Ok(expr);
        }
        let allowed = match (&expr.ty, target) {
            (Type::Void, _) => return Err(self.void_value(expr.span)),
            (_, Type::Dynamic) => return Ok(expr),
            (Type::Dynamic, _) | (_, Type::Bool) => expr.ty.is_scalar(),
            (_, Type::Enum { .. }) => false,
            (from, to) => from.is_arithmetic() && to.is_arithmetic(),
        };
        if !allowed {
            return Err(self.mismatch(&expr, target));
        }
        let span = expr.span;
        Ok(HExpr::new(
            HExprKind::Convert(Box::new(expr)),
            target.clone(),
            span,
        ))
    }

    /// Explicit (C-style) conversion of `expr` to `target`.
    pub(super) fn cast(&self, expr: HExpr, target: Type) -> CheckResult<HExpr> {
        if expr.ty == target {
            return Ok(expr);
        }
        let allowed = target.is_void()
            || expr.ty.is_dynamic()
            || (expr.ty.is_arithmetic() && target.is_arithmetic())
            || (matches!(target, Type::Bool) && expr.ty.is_scalar());
        if !allowed || expr.ty.is_void() {
            return Err(Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "invalid cast from `{}` to `{}`",
                    expr.ty.display(self.interner),
                    target.display(self.interner)
                ))
                .with_label(expr.span, "cannot be converted"));
        }
        let span = expr.span;
        Ok(HExpr::new(HExprKind::Convert(Box::new(expr)), target, span))
    }

    /// Require a type usable as a condition.
    pub(super) fn condition(&self, expr: HExpr) -> CheckResult<HExpr> {
        if expr.ty.is_scalar() {
            Ok(expr)
        } else {
            Err(Diagnostic::error(ErrorCode::E2001)
                .with_message(format!(
                    "value of type `{}` is not contextually convertible to `bool`",
                    expr.ty.display(self.interner)
                ))
                .with_label(expr.span, "used as a condition here"))
        }
    }

    #[cold]
    pub(super) fn mismatch(&self, expr: &HExpr, expected: &Type) -> Diagnostic {
        Diagnostic::error(ErrorCode::E2001)
            .with_message(format!(
                "cannot convert `{}` to `{}`",
                expr.ty.display(self.interner),
                expected.display(self.interner)
            ))
            .with_label(
                expr.span,
                format!(
                    "expected `{}`, found `{}`",
                    expected.display(self.interner),
                    expr.ty.display(self.interner)
                ),
            )
    }
}
