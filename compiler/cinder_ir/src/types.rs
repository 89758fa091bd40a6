//! Semantic types of checked declarations and expressions.

use std::fmt;

use crate::{DeclId, Name, StringInterner};

/// A checked type.
///
/// All integer spellings (`short`, `long`, `unsigned`, ...) collapse into
/// [`Type::Int`], a 64-bit signed integer. `float` and `double` collapse
/// into [`Type::Double`]. `const char*` is [`Type::Str`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Void,
    Bool,
    Char,
    Int,
    Double,
    Str,
    /// A user enum; `decl` is the enum declaration.
    Enum { decl: DeclId, name: Name },
    Function(Box<Signature>),
    /// Type of a deferred (late-bound) reference; checked at run time.
    Dynamic,
}

/// Function signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Signature {
    pub ret: Type,
    pub params: Vec<Type>,
}

impl Type {
    /// Arithmetic types: usable in `+ - * /` and comparisons.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Type::Bool | Type::Char | Type::Int | Type::Double | Type::Enum { .. }
        )
    }

    /// Integral types: usable in `% << >> & | ^ ~`.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Type::Bool | Type::Char | Type::Int | Type::Enum { .. }
        )
    }

    /// Types that can be tested in a condition.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || matches!(self, Type::Str | Type::Function(_) | Type::Dynamic)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    pub fn as_function(&self) -> Option<&Signature> {
        match self {
            Type::Function(sig) => Some(sig),
            _ => None,
        }
    }

    /// Render the type with names resolved through `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, interner }
    }
}

/// [`Display`](fmt::Display) adapter returned by [`Type::display`].
pub struct TypeDisplay<'a> {
    ty: &'a Type,
    interner: &'a StringInterner,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Type::Void => f.write_str("void"),
            Type::Bool => f.write_str("bool"),
            Type::Char => f.write_str("char"),
            Type::Int => f.write_str("int"),
            Type::Double => f.write_str("double"),
            Type::Str => f.write_str("const char *"),
            Type::Enum { name, .. } => f.write_str(self.interner.lookup(*name)),
            Type::Dynamic => f.write_str("dynamic"),
            Type::Function(sig) => {
                write!(f, "{} (*)(", sig.ret.display(self.interner))?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", param.display(self.interner))?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        let interner = StringInterner::new();
        let color = interner.intern("Color");
        let sig = Signature {
            ret: Type::Int,
            params: vec![Type::Int, Type::Str],
        };
        assert_eq!(Type::Str.display(&interner).to_string(), "const char *");
        assert_eq!(
            Type::Enum {
                decl: DeclId::from_raw(3),
                name: color
            }
            .display(&interner)
            .to_string(),
            "Color"
        );
        assert_eq!(
            Type::Function(Box::new(sig))
                .display(&interner)
                .to_string(),
            "int (*)(int, const char *)"
        );
    }

    #[test]
    fn test_type_classes() {
        assert!(Type::Char.is_integral());
        assert!(!Type::Double.is_integral());
        assert!(Type::Double.is_arithmetic());
        assert!(Type::Str.is_scalar());
        assert!(!Type::Void.is_scalar());
    }
}
