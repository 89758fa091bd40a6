//! Sessions.
//!
//! A [`Session`] ties the compiler core to the execution engine: each
//! submitted chunk is compiled, committed, and run, and its trailing value
//! handed back as a [`ResultValue`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cinder_eval::{stdout_handler, SharedPrintHandler, Value, DEFAULT_MAX_DEPTH};
use cinder_ir::{DeclKind, DeclLookup, StringInterner, WrapPolicy};
use cinder_sema::CompilationContext;
use parking_lot::{Mutex, MutexGuard};

use crate::compiler::{CompileOutput, IncrementalCompiler};
use crate::db::Db;
use crate::engine::{ExecutionEngine, FileSpec, RunOutcome, RunStatus};
use crate::error::{ExecuteFileError, SessionError};
use crate::options::CompileOptions;
use crate::query;
use crate::transaction::{Ledger, Transaction, TransactionId};

/// Extensions of native libraries, which cannot be loaded.
const NATIVE_LIBRARY_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

/// Session construction parameters.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub include_paths: Vec<PathBuf>,
    /// Limit on nested interpreted calls.
    pub max_depth: usize,
    pub print: SharedPrintHandler,
    /// Options for chunks submitted through [`Session::process`].
    pub options: CompileOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            include_paths: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            print: stdout_handler(),
            options: CompileOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_print_handler(mut self, print: SharedPrintHandler) -> Self {
        self.print = print;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }
}

/// Trailing value of an increment, owned by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultValue {
    pub value: Value,
    pub type_name: String,
    /// Transaction that produced the value.
    pub transaction: TransactionId,
    rendered: String,
}

impl ResultValue {
    fn new(value: Value, type_name: String, transaction: TransactionId, interner: &StringInterner) -> Self {
        ResultValue {
            value,
            type_name,
            transaction,
            rendered: value.display(interner).to_string(),
        }
    }
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.type_name, self.rendered)
    }
}

/// Everything that happened to one submitted chunk.
#[derive(Clone, Debug)]
pub struct ProcessOutput {
    pub compile: CompileOutput,
    /// Present when a transaction was committed and executed.
    pub run: Option<RunOutcome>,
    pub value: Option<ResultValue>,
}

impl ProcessOutput {
    /// Compiled, and ran without a runtime failure if it ran.
    pub fn is_success(&self) -> bool {
        self.compile.status.is_success()
            && self
                .run
                .as_ref()
                .map_or(true, |run| run.status == RunStatus::Success)
    }
}

/// Result of `.x`: the load, then the call when arguments were given.
#[derive(Clone, Debug)]
pub struct ExecuteFileOutput {
    pub load: ProcessOutput,
    pub call: Option<ProcessOutput>,
}

/// Summary shown by `.file`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStats {
    pub transactions: usize,
    pub decls: usize,
    /// Included files with their line counts.
    pub files: Vec<(PathBuf, usize)>,
}

/// One interactive session.
pub struct Session {
    compiler: IncrementalCompiler,
    engine: ExecutionEngine,
    options: CompileOptions,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        tracing::debug!(include_paths = config.include_paths.len(), max_depth = config.max_depth, "session created");
        Session {
            compiler: IncrementalCompiler::new(config.include_paths),
            engine: ExecutionEngine::new(config.print, config.max_depth),
            options: config.options,
        }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn set_options(&mut self, options: CompileOptions) {
        self.options = options;
    }

    pub fn context(&self) -> &CompilationContext {
        self.compiler.context()
    }

    pub fn ledger(&self) -> &Ledger {
        self.compiler.ledger()
    }

    pub fn interner(&self) -> &StringInterner {
        self.compiler.interner()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        self.engine.print_handler()
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        self.compiler.include_paths()
    }

    pub fn add_include_path(&mut self, path: PathBuf) {
        self.compiler.add_include_path(path);
    }

    /// Compile and run `text` with the session's options.
    pub fn process(&mut self, text: &str) -> Result<ProcessOutput, SessionError> {
        self.process_with(text, self.options)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn process_with(
        &mut self,
        text: &str,
        options: CompileOptions,
    ) -> Result<ProcessOutput, SessionError> {
        let compile = self.compiler.compile(text, options)?;
        let transaction = match compile.transaction {
            Some(transaction) if options.codegen => transaction,
            _ => {
                return Ok(ProcessOutput {
                    compile,
                    run: None,
                    value: None,
                })
            }
        };
        let run = self.run(&transaction);
        let value = match (run.value, &run.value_type) {
            (Some(value), Some(type_name)) if value != Value::Void => Some(ResultValue::new(
                value,
                type_name.clone(),
                transaction.id,
                self.compiler.interner(),
            )),
            _ => None,
        };
        Ok(ProcessOutput {
            compile,
            run: Some(run),
            value,
        })
    }

    /// Compile without running.
    pub fn compile(
        &mut self,
        text: &str,
        options: CompileOptions,
    ) -> Result<CompileOutput, SessionError> {
        self.compiler.compile(text, options)
    }

    /// Run a committed transaction.
    pub fn run(&mut self, transaction: &Transaction) -> RunOutcome {
        self.engine
            .run(self.compiler.context(), self.compiler.interner(), transaction)
    }

    /// Compile `path` raw, as if `#include`d, and run its initializers.
    ///
    /// `path` is searched like a quoted include: the working directory,
    /// then the include paths.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn load_file(&mut self, path: &Path) -> Result<ProcessOutput, ExecuteFileError> {
        let Some(resolved) = self.compiler.resolve_include(path) else {
            return Err(ExecuteFileError::FileNotFound(path.to_path_buf()));
        };
        let native = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| NATIVE_LIBRARY_EXTENSIONS.contains(&ext));
        if native {
            return Err(ExecuteFileError::LoadFailed {
                path: path.to_path_buf(),
                reason: "native libraries cannot be loaded".to_owned(),
                diagnostics: Vec::new(),
            });
        }

        let options = CompileOptions {
            print_ast: self.options.print_ast,
            dynamic_lookup: self.options.dynamic_lookup,
            ..CompileOptions::raw()
        };
        let output = self.process_with(&format!("#include \"{}\"", resolved.display()), options)?;
        if !output.compile.status.is_success() {
            return Err(ExecuteFileError::LoadFailed {
                path: path.to_path_buf(),
                reason: "compilation failed".to_owned(),
                diagnostics: output.compile.diagnostics,
            });
        }
        Ok(output)
    }

    /// Load a file and, if an argument list follows the path, call the
    /// function named after the file with it.
    pub fn execute_file(&mut self, spec: &str) -> Result<ExecuteFileOutput, ExecuteFileError> {
        let spec = FileSpec::parse(spec);
        let load = self.load_file(&spec.path)?;
        let Some(args) = spec.args.as_deref() else {
            return Ok(ExecuteFileOutput { load, call: None });
        };

        let name = spec.function_name().unwrap_or_default().to_owned();
        let is_function = self
            .compiler
            .lookup(&name)
            .and_then(|id| self.context().decl(id))
            .is_some_and(|decl| matches!(decl.kind, DeclKind::Function(_)));
        if !is_function {
            return Err(ExecuteFileError::FunctionNotFound(name));
        }

        let options = self.options.with_wrap(WrapPolicy::Wrap);
        let options = CompileOptions {
            codegen: true,
            ..options
        };
        let call = self.process_with(&format!("{name}({args})"), options)?;
        Ok(ExecuteFileOutput {
            load,
            call: Some(call),
        })
    }

    pub fn stats(&self) -> SessionStats {
        let db = self.compiler.db();
        let mut files: Vec<_> = self
            .context()
            .includes()
            .filter_map(|(path, _)| {
                let file = db.load_file(path)?;
                Some((path.to_path_buf(), query::line_count(db, file)))
            })
            .collect();
        files.sort();
        SessionStats {
            transactions: self.ledger().len(),
            decls: self.context().len(),
            files,
        }
    }

    /// Discard all compiled state and global values.
    pub fn reset(&mut self) {
        tracing::debug!("session reset");
        self.compiler.reset();
        self.engine.reset();
    }
}

/// A session shared between threads; submissions are serialized by the lock.
#[derive(Clone)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub fn new(session: Session) -> Self {
        SharedSession(Arc::new(Mutex::new(session)))
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock()
    }
}

#[cfg(test)]
mod tests;
