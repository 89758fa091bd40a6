//! Execution engine.
//!
//! Runs the executable declarations of a committed transaction: raw-mode
//! variable initializers and the wrapper body, in declaration order.
//! Runtime failures are reported, never undone; the transaction stays
//! committed and globals keep whatever was assigned before the fault.

use std::path::PathBuf;

use cinder_eval::{EvalError, Globals, Interpreter, SharedPrintHandler, Value};
use cinder_ir::{DeclKind, DeclLookup, HStmtKind, StringInterner, Type};
use cinder_sema::CompilationContext;

use crate::transaction::Transaction;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RunStatus {
    Success,
    RuntimeFailure,
}

/// Result of running one transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Trailing value of a wrapped increment.
    pub value: Option<Value>,
    /// Static type of the trailing value, as written in diagnostics.
    pub value_type: Option<String>,
    pub error: Option<EvalError>,
}

/// Runtime state of a session: global storage and output.
pub struct ExecutionEngine {
    globals: Globals,
    print: SharedPrintHandler,
    max_depth: usize,
}

impl ExecutionEngine {
    pub fn new(print: SharedPrintHandler, max_depth: usize) -> Self {
        ExecutionEngine {
            globals: Globals::new(),
            print,
            max_depth,
        }
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    /// Forget every global value.
    pub fn reset(&mut self) {
        self.globals.clear();
    }

    #[tracing::instrument(level = "debug", skip_all, fields(transaction = %transaction.id))]
    pub fn run(
        &mut self,
        ctx: &CompilationContext,
        interner: &StringInterner,
        transaction: &Transaction,
    ) -> RunOutcome {
        let mut interp = Interpreter::new(ctx, interner, &mut self.globals, &self.print)
            .with_max_depth(self.max_depth);
        let mut value = None;
        for decl in ctx.decls_in(transaction.range) {
            if !decl.kind.is_executable() {
                continue;
            }
            match interp.execute(decl) {
                Ok(Some(v)) => value = Some(v),
                Ok(None) => {}
                Err(error) => {
                    tracing::debug!(%error, "runtime failure");
                    return RunOutcome {
                        status: RunStatus::RuntimeFailure,
                        value: None,
                        value_type: None,
                        error: Some(error),
                    };
                }
            }
        }

        let value_type = value.map(|v| match trailing_type(ctx, transaction) {
            Some(ty) if !ty.is_dynamic() => ty.display(interner).to_string(),
            _ => v.type_name().to_owned(),
        });
        RunOutcome {
            status: RunStatus::Success,
            value,
            value_type,
            error: None,
        }
    }
}

/// Static type of the wrapper's trailing value.
fn trailing_type<'c>(ctx: &'c CompilationContext, transaction: &Transaction) -> Option<&'c Type> {
    let DeclKind::Wrapper(body) = &ctx.decl(transaction.last_decl())?.kind else {
        return None;
    };
    body.stmts.iter().rev().find_map(|stmt| match &stmt.kind {
        HStmtKind::Value(expr) => Some(&expr.ty),
        _ => None,
    })
}

/// `path` optionally followed by a call argument list, as in `.x file.cpp(1, 2)`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FileSpec {
    pub path: PathBuf,
    /// Text between the parentheses; `Some("")` for `file()`.
    pub args: Option<String>,
}

impl FileSpec {
    pub fn parse(spec: &str) -> FileSpec {
        let spec = spec.trim();
        if let Some(call) = spec.strip_suffix(')') {
            if let Some(open) = call.find('(') {
                return FileSpec {
                    path: PathBuf::from(call[..open].trim_end()),
                    args: Some(call[open + 1..].to_owned()),
                };
            }
        }
        FileSpec {
            path: PathBuf::from(spec),
            args: None,
        }
    }

    /// Function called after loading: the file stem.
    pub fn function_name(&self) -> Option<&str> {
        self.path.file_stem()?.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_spec() {
        assert_eq!(
            FileSpec::parse("dir/foo.cpp(1, 2)"),
            FileSpec {
                path: PathBuf::from("dir/foo.cpp"),
                args: Some("1, 2".to_owned()),
            }
        );
        assert_eq!(FileSpec::parse("foo.cpp()").args, Some(String::new()));
        let plain = FileSpec::parse("  foo.cpp ");
        assert_eq!(plain.args, None);
        assert_eq!(plain.function_name(), Some("foo"));
    }
}
