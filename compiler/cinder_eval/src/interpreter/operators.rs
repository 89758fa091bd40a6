//! Unary and binary operators on runtime values.
//!
//! Mixed arithmetic promotes to `double` when either side is floating and
//! to 64-bit integers otherwise. Integer arithmetic wraps.

use std::cmp::Ordering;

use cinder_ir::{BinaryOp, StringInterner, UnaryOp};

use crate::errors::{division_by_zero, invalid_operands};
use crate::{EvalResult, Value};

pub(crate) fn unary(op: UnaryOp, value: Value) -> EvalResult {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.truthy()?)),
        (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Plus, Value::Double(d)) => Ok(Value::Double(d)),
        (UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot, v) => {
            let i = v
                .as_int()
                .ok_or_else(|| invalid_operands(op.as_str(), v.type_name()))?;
            Ok(Value::Int(match op {
                UnaryOp::Neg => i.wrapping_neg(),
                UnaryOp::BitNot => !i,
                _ => i,
            }))
        }
    }
}

pub(crate) fn binary(op: BinaryOp, lhs: Value, rhs: Value, interner: &StringInterner) -> EvalResult {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) if is_comparison(op) => {
            let ordering = interner.lookup(a).cmp(interner.lookup(b));
            return Ok(Value::Bool(compare(op, Some(ordering))));
        }
        (Value::Function(a), Value::Function(b)) if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) => {
            return Ok(Value::Bool((a == b) == (op == BinaryOp::Eq)));
        }
        _ => {}
    }
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let (a, b) = (lhs.truthy()?, rhs.truthy()?);
        return Ok(Value::Bool(if op == BinaryOp::And { a && b } else { a || b }));
    }

    let invalid = || {
        invalid_operands(
            op.as_str(),
            format!("{} and {}", lhs.type_name(), rhs.type_name()),
        )
    };
    if matches!(lhs, Value::Double(_)) || matches!(rhs, Value::Double(_)) {
        let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
            return Err(invalid());
        };
        return float_op(op, a, b).ok_or_else(invalid);
    }
    let (Some(a), Some(b)) = (lhs.as_int(), rhs.as_int()) else {
        return Err(invalid());
    };
    int_op(op, a, b)
}

fn is_comparison(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::Eq
            | BinaryOp::NotEq
    )
}

/// Comparison result; unordered operands (NaN) only satisfy `!=`.
fn compare(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return op == BinaryOp::NotEq;
    };
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::NotEq => ordering.is_ne(),
        _ => false,
    }
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let shift = || u32::try_from(b & 63).unwrap_or(0);
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(division_by_zero()),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Rem => a.wrapping_rem(b),
        BinaryOp::Shl => a.wrapping_shl(shift()),
        BinaryOp::Shr => a.wrapping_shr(shift()),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::BitOr => a | b,
        _ => return Ok(Value::Bool(compare(op, Some(a.cmp(&b))))),
    };
    Ok(Value::Int(value))
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        op if is_comparison(op) => return Some(Value::Bool(compare(op, a.partial_cmp(&b)))),
        _ => return None,
    };
    Some(Value::Double(value))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::EvalErrorKind;

    fn bin(op: BinaryOp, lhs: Value, rhs: Value) -> EvalResult {
        binary(op, lhs, rhs, &StringInterner::new())
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        assert_eq!(
            bin(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)).unwrap(),
            Value::Int(i64::MIN)
        );
        assert_eq!(bin(BinaryOp::Div, Value::Int(7), Value::Int(2)).unwrap(), Value::Int(3));
        assert_eq!(bin(BinaryOp::Rem, Value::Int(-7), Value::Int(2)).unwrap(), Value::Int(-1));
        assert_eq!(bin(BinaryOp::Shl, Value::Int(1), Value::Int(65)).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_division_by_zero() {
        for op in [BinaryOp::Div, BinaryOp::Rem] {
            let err = bin(op, Value::Int(1), Value::Int(0)).unwrap_err();
            assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
        }
        let inf = bin(BinaryOp::Div, Value::Double(1.0), Value::Int(0)).unwrap();
        assert_eq!(inf, Value::Double(f64::INFINITY));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(
            bin(BinaryOp::Mul, Value::Int(3), Value::Double(0.5)).unwrap(),
            Value::Double(1.5)
        );
        assert_eq!(
            bin(BinaryOp::Add, Value::Char('a'), Value::Bool(true)).unwrap(),
            Value::Int(98)
        );
        assert!(bin(BinaryOp::Rem, Value::Double(1.0), Value::Int(1)).is_err());
    }

    #[test]
    fn test_comparisons() {
        let nan = Value::Double(f64::NAN);
        assert_eq!(bin(BinaryOp::Eq, nan, nan).unwrap(), Value::Bool(false));
        assert_eq!(bin(BinaryOp::NotEq, nan, nan).unwrap(), Value::Bool(true));
        assert_eq!(bin(BinaryOp::LtEq, Value::Int(2), Value::Int(2)).unwrap(), Value::Bool(true));

        let interner = StringInterner::new();
        let (a, b) = (interner.intern("abc"), interner.intern("abd"));
        let lt = binary(BinaryOp::Lt, Value::Str(a), Value::Str(b), &interner).unwrap();
        assert_eq!(lt, Value::Bool(true));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, Value::Int(i64::MIN)).unwrap(), Value::Int(i64::MIN));
        assert_eq!(unary(UnaryOp::BitNot, Value::Int(0)).unwrap(), Value::Int(-1));
        assert_eq!(unary(UnaryOp::Not, Value::Double(0.0)).unwrap(), Value::Bool(true));
        assert!(unary(UnaryOp::Neg, Value::Void).is_err());
    }
}
