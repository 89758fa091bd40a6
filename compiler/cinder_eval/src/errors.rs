//! Runtime errors.
//!
//! A runtime fault aborts the running increment. It never undoes the
//! commit: declarations made by the increment stay visible, and globals
//! assigned before the fault keep their values.

use cinder_ir::Span;

use crate::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Typed runtime error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("division by zero")]
    DivisionByZero,
    #[error("uncaught exception{}", .0.as_ref().map(|v| format!(": {v}")).unwrap_or_default())]
    Thrown(Option<String>),
    #[error("use of undeclared identifier `{0}`")]
    UnresolvedName(String),
    #[error("function `{0}` is declared but never defined")]
    UndefinedFunction(String),
    #[error("call depth exceeded the limit of {0}")]
    RecursionLimit(usize),
    #[error("{0} is not callable")]
    NotCallable(String),
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("cannot convert {from} to {to}")]
    InvalidConversion { from: String, to: String },
    #[error("`{0}` is not a variable")]
    NotAssignable(String),
    #[error("invalid operands to `{op}`: {detail}")]
    InvalidOperands { op: &'static str, detail: String },
    #[error("printf: {0}")]
    FormatError(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// A runtime error with the location of the failing expression.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Option<Span>,
}

impl EvalError {
    #[cold]
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach `span` unless a more precise one is already set.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

#[cold]
pub(crate) fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

#[cold]
pub(crate) fn unresolved_name(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UnresolvedName(name.to_owned()))
}

#[cold]
pub(crate) fn undefined_function(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedFunction(name.to_owned()))
}

#[cold]
pub(crate) fn not_callable(what: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable(what.into()))
}

#[cold]
pub(crate) fn invalid_conversion(from: impl Into<String>, to: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidConversion {
        from: from.into(),
        to: to.into(),
    })
}

#[cold]
pub(crate) fn invalid_operands(op: &'static str, detail: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidOperands {
        op,
        detail: detail.into(),
    })
}

#[cold]
pub(crate) fn format_error(detail: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::FormatError(detail.into()))
}

#[cold]
pub(crate) fn internal(detail: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Internal(detail.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(division_by_zero().to_string(), "division by zero");
        assert_eq!(
            EvalError::new(EvalErrorKind::Thrown(Some("42".into()))).to_string(),
            "uncaught exception: 42"
        );
        assert_eq!(
            EvalError::new(EvalErrorKind::Thrown(None)).to_string(),
            "uncaught exception"
        );
    }

    #[test]
    fn test_first_span_wins() {
        let err = unresolved_name("x")
            .at(Span::new(3, 4))
            .at(Span::new(0, 10));
        assert_eq!(err.span, Some(Span::new(3, 4)));
    }
}
