//! Integer constant folding for enumerator values.

use cinder_ir::{BinaryOp, HExpr, HExprKind, UnaryOp};

/// Fold an integral constant expression; `None` if it is not constant.
pub(crate) fn fold_int(expr: &HExpr) -> Option<i64> {
    match &expr.kind {
        HExprKind::Int(v) => Some(*v),
        HExprKind::Bool(b) => Some(i64::from(*b)),
        HExprKind::Char(c) => Some(i64::from(u32::from(*c))),
        HExprKind::Convert(inner) if expr.ty.is_integral() => fold_int(inner),
        HExprKind::Unary { op, operand } => {
            let v = fold_int(operand)?;
            Some(match op {
                UnaryOp::Neg => v.checked_neg()?,
                UnaryOp::Plus => v,
                UnaryOp::Not => i64::from(v == 0),
                UnaryOp::BitNot => !v,
            })
        }
        HExprKind::Binary { op, lhs, rhs } => {
            let (a, b) = (fold_int(lhs)?, fold_int(rhs)?);
            Some(match op {
                BinaryOp::Add => a.checked_add(b)?,
                BinaryOp::Sub => a.checked_sub(b)?,
                BinaryOp::Mul => a.checked_mul(b)?,
                BinaryOp::Div => a.checked_div(b)?,
                BinaryOp::Rem => a.checked_rem(b)?,
                BinaryOp::Shl => a.checked_shl(u32::try_from(b).ok()?)?,
                BinaryOp::Shr => a.checked_shr(u32::try_from(b).ok()?)?,
                BinaryOp::Lt => i64::from(a < b),
                BinaryOp::LtEq => i64::from(a <= b),
                BinaryOp::Gt => i64::from(a > b),
                BinaryOp::GtEq => i64::from(a >= b),
                BinaryOp::Eq => i64::from(a == b),
                BinaryOp::NotEq => i64::from(a != b),
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitXor => a ^ b,
                BinaryOp::BitOr => a | b,
                BinaryOp::And => i64::from(a != 0 && b != 0),
                BinaryOp::Or => i64::from(a != 0 || b != 0),
            })
        }
        HExprKind::Logical { is_and, lhs, rhs } => {
            let (a, b) = (fold_int(lhs)?, fold_int(rhs)?);
            Some(i64::from(if *is_and {
                a != 0 && b != 0
            } else {
                a != 0 || b != 0
            }))
        }
        HExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            if fold_int(cond)? == 0 {
                fold_int(else_expr)
            } else {
                fold_int(then_expr)
            }
        }
        _ => None,
    }
}

/// Is `expr` a constant that is always true (as in `while (1)`)?
pub(crate) fn is_always_true(expr: &HExpr) -> bool {
    fold_int(expr).is_some_and(|v| v != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_ir::{Span, Type};

    fn int(v: i64) -> HExpr {
        HExpr::new(HExprKind::Int(v), Type::Int, Span::DUMMY)
    }

    fn binary(op: BinaryOp, lhs: HExpr, rhs: HExpr) -> HExpr {
        HExpr::new(
            HExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            Type::Int,
            Span::DUMMY,
        )
    }

    #[test]
    fn test_fold_arithmetic() {
        let e = binary(BinaryOp::Add, int(2), binary(BinaryOp::Shl, int(1), int(4)));
        assert_eq!(fold_int(&e), Some(18));
    }

    #[test]
    fn test_division_by_zero_is_not_constant() {
        assert_eq!(fold_int(&binary(BinaryOp::Div, int(1), int(0))), None);
    }

    #[test]
    fn test_non_literal_is_not_constant() {
        let global = HExpr::new(
            HExprKind::Global(cinder_ir::DeclId::from_raw(0)),
            Type::Int,
            Span::DUMMY,
        );
        assert_eq!(fold_int(&global), None);
        assert!(!is_always_true(&global));
        assert!(is_always_true(&int(7)));
    }
}
