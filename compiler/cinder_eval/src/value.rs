//! Runtime values.

use std::fmt;

use cinder_ir::{DeclId, Name, StringInterner, Type};

use crate::errors::{invalid_conversion, invalid_operands};
use crate::EvalError;

/// A runtime value.
///
/// Strings only originate from literals, so they are interned names.
/// Enum values are plain integers; the static type carries the enum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    Char(char),
    Int(i64),
    Double(f64),
    Str(Name),
    Function(DeclId),
}

impl Value {
    /// Value of a variable of type `ty` that was never assigned.
    pub fn zero_of(ty: &Type) -> Value {
        match ty {
            Type::Bool => Value::Bool(false),
            Type::Char => Value::Char('\0'),
            Type::Double => Value::Double(0.0),
            Type::Str => Value::Str(Name::EMPTY),
            Type::Void | Type::Function(_) => Value::Void,
            Type::Int | Type::Enum { .. } | Type::Dynamic => Value::Int(0),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "const char *",
            Value::Function(_) => "function",
        }
    }

    /// Integer view of an integral value.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Bool(b) => Some(i64::from(b)),
            Value::Char(c) => Some(i64::from(u32::from(c))),
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Floating view of an arithmetic value.
    #[expect(clippy::cast_precision_loss, reason = "C++ integral to floating conversion")]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(d) => Some(d),
            other => other.as_int().map(|i| i as f64),
        }
    }

    /// C++ contextual conversion to `bool`.
    pub fn truthy(&self) -> Result<bool, EvalError> {
        match *self {
            Value::Bool(b) => Ok(b),
            Value::Char(c) => Ok(c != '\0'),
            Value::Int(i) => Ok(i != 0),
            Value::Double(d) => Ok(d != 0.0),
            Value::Str(_) | Value::Function(_) => Ok(true),
            Value::Void => Err(invalid_operands("condition", "void value")),
        }
    }

    /// Convert to a value of type `ty`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "C++ floating to integral conversion truncates"
    )]
    pub fn convert(self, ty: &Type) -> Result<Value, EvalError> {
        let converted = match (ty, self) {
            (Type::Dynamic, v) => Some(v),
            (Type::Void, _) => Some(Value::Void),
            (Type::Bool, v) => Some(Value::Bool(v.truthy()?)),
            (Type::Int | Type::Enum { .. }, Value::Double(d)) => Some(Value::Int(d as i64)),
            (Type::Int | Type::Enum { .. }, v) => v.as_int().map(Value::Int),
            (Type::Char, Value::Char(c)) => Some(Value::Char(c)),
            (Type::Char, v) => v
                .as_f64()
                .map(|f| f as i64)
                .and_then(|i| u32::try_from(i & 0xFF).ok())
                .and_then(char::from_u32)
                .map(Value::Char),
            (Type::Double, v) => v.as_f64().map(Value::Double),
            (Type::Str, Value::Str(s)) => Some(Value::Str(s)),
            (Type::Function(_), Value::Function(id)) => Some(Value::Function(id)),
            _ => None,
        };
        converted.ok_or_else(|| invalid_conversion(self.type_name(), type_label(ty)))
    }

    /// Render with strings resolved through `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> ValueDisplay<'a> {
        ValueDisplay {
            value: self,
            interner,
        }
    }
}

fn type_label(ty: &Type) -> &'static str {
    match ty {
        Type::Void => "void",
        Type::Bool => "bool",
        Type::Char => "char",
        Type::Int => "int",
        Type::Double => "double",
        Type::Str => "const char *",
        Type::Enum { .. } => "enum",
        Type::Function(_) => "function",
        Type::Dynamic => "dynamic",
    }
}

/// [`Display`](fmt::Display) adapter returned by [`Value::display`].
pub struct ValueDisplay<'a> {
    value: &'a Value,
    interner: &'a StringInterner,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.value {
            Value::Void => f.write_str("void"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::Str(s) => write!(f, "{:?}", self.interner.lookup(s)),
            Value::Function(id) => write!(f, "<function #{}>", id.raw()),
        }
    }
}
