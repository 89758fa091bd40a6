//! Incremental compiler core.
//!
//! Owns the session's [`CompilationContext`] and [`Ledger`]. Each call to
//! [`IncrementalCompiler::compile`] stages one increment on top of the
//! context:
//!
//! ```text
//! text ─► #include extraction ─► included files (raw, via salsa)
//!      └► wrap / raw ─► lex ─► parse ─► check ─► PendingIncrement
//!                                                    │
//!                      errors: discarded ◄───────────┤
//!                      success: context.commit + ledger.commit
//! ```
//!
//! Nothing reaches the context before the whole increment checked
//! cleanly, so a failed increment leaves it exactly as it was.

use std::path::{Path, PathBuf};

use cinder_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, Phase, SourceInfo};
use cinder_ir::printer::print_decls;
use cinder_ir::{DeclId, Span, StringInterner, WrapPolicy};
use cinder_sema::{check_increment, CheckOptions, CompilationContext, PendingIncrement};
use smallvec::SmallVec;

use crate::db::{CinderDb, Db};
use crate::error::SessionError;
use crate::include::{extract_includes, IncludeDirective};
use crate::options::CompileOptions;
use crate::query;
use crate::transaction::{Ledger, Transaction, TransactionStatus};

/// Name prefix of the synthetic functions wrapping statement input.
pub const WRAPPER_PREFIX: &str = "__cinder_wrapper_";

/// Why an increment failed to compile.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FailureKind {
    /// Lexing or parsing failed.
    Parse,
    /// Type checking failed.
    Type,
    /// An `#include` could not be resolved or read.
    Include,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompileStatus {
    Success,
    SuccessWithWarnings,
    Failed(FailureKind),
}

impl CompileStatus {
    pub fn is_success(self) -> bool {
        !matches!(self, CompileStatus::Failed(_))
    }
}

/// Result of compiling one increment.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub status: CompileStatus,
    /// The committed transaction; `None` on failure or when the increment
    /// declared nothing.
    pub transaction: Option<Transaction>,
    /// Errors and warnings, in the user's coordinates.
    pub diagnostics: Vec<Diagnostic>,
    /// Printed declarations, when requested.
    pub ast: Option<String>,
}

/// The persistent compilation state of a session.
pub struct IncrementalCompiler {
    db: CinderDb,
    ctx: CompilationContext,
    ledger: Ledger,
    include_paths: Vec<PathBuf>,
    /// Number of wrappers committed so far.
    wrappers: u32,
    poisoned: bool,
}

impl IncrementalCompiler {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        IncrementalCompiler {
            db: CinderDb::new(),
            ctx: CompilationContext::new(),
            ledger: Ledger::new(),
            include_paths,
            wrappers: 0,
            poisoned: false,
        }
    }

    pub fn context(&self) -> &CompilationContext {
        &self.ctx
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn db(&self) -> &CinderDb {
        &self.db
    }

    pub fn interner(&self) -> &StringInterner {
        self.db.interner()
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn add_include_path(&mut self, path: PathBuf) {
        if !self.include_paths.contains(&path) {
            self.include_paths.push(path);
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Where `#include "path"` in user input would find `path`.
    pub fn resolve_include(&self, path: &Path) -> Option<PathBuf> {
        resolve_include(path, None, &self.include_paths)
    }

    /// Declaration currently bound to `name`.
    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.ctx.lookup(self.interner().intern(name))
    }

    /// Discard every committed declaration and transaction.
    ///
    /// Loaded files stay cached in the database.
    pub fn reset(&mut self) {
        self.ctx = CompilationContext::new();
        self.ledger = Ledger::new();
        self.wrappers = 0;
        self.poisoned = false;
    }

    /// Compile one increment and commit it if it is free of errors.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(len = text.len(), wrap = ?options.effective_wrap(), dynamic = options.dynamic_lookup)
    )]
    pub fn compile(
        &mut self,
        text: &str,
        options: CompileOptions,
    ) -> Result<CompileOutput, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }
        let before = self.ctx.mark();
        let policy = options.effective_wrap();
        let wrapper = self.wrappers + 1;
        let mut diagnostics = DiagnosticQueue::new();
        let mut wrapped = false;

        let staged = {
            let mut pending = PendingIncrement::new(&self.ctx);
            let directives = extract_includes(text);
            for span in &directives.malformed {
                diagnostics.push(malformed_include(*span));
            }

            let mut loader = IncludeLoader {
                db: &mut self.db,
                include_paths: &self.include_paths,
                options: options.check_options(),
                active: SmallVec::new(),
            };
            for directive in &directives.includes {
                loader.include(directive, None, &mut pending, &mut diagnostics, None);
            }

            if !diagnostics.has_errors() && !directives.text.trim().is_empty() {
                wrapped = policy == WrapPolicy::Wrap;
                let unit = Unit {
                    text: &directives.text,
                    policy,
                    wrapper,
                };
                unit.compile(&mut pending, self.db.interner(), options, &mut diagnostics);
            }
            pending.finish()
        };

        if diagnostics.has_errors() {
            let kind = failure_kind(&diagnostics);
            tracing::debug!(?kind, errors = diagnostics.error_count(), "increment rejected");
            return Ok(CompileOutput {
                status: CompileStatus::Failed(kind),
                transaction: None,
                diagnostics: diagnostics.into_vec(),
                ast: None,
            });
        }

        let (status, recorded) = if diagnostics.has_warnings() {
            (CompileStatus::SuccessWithWarnings, TransactionStatus::SuccessWithWarnings)
        } else {
            (CompileStatus::Success, TransactionStatus::Success)
        };

        if staged.is_empty() {
            return Ok(CompileOutput {
                status,
                transaction: None,
                diagnostics: diagnostics.into_vec(),
                ast: None,
            });
        }

        let range = match self.ctx.commit(staged) {
            Ok(range) => range,
            Err(err) => return Err(self.poison(err.to_string())),
        };
        if wrapped {
            self.wrappers = wrapper;
        }
        // Re-including unchanged headers records state but no declarations.
        if range.is_empty() {
            return Ok(CompileOutput {
                status,
                transaction: None,
                diagnostics: diagnostics.into_vec(),
                ast: None,
            });
        }
        let transaction = match self.ledger.commit(range, before, recorded) {
            Ok(transaction) => transaction,
            Err(err) => return Err(self.poison(err.to_string())),
        };
        tracing::debug!(id = %transaction.id, decls = range.len(), "increment committed");

        let ast = options
            .print_ast
            .then(|| print_decls(self.ctx.decls_in(range), &self.ctx, self.db.interner()));
        Ok(CompileOutput {
            status,
            transaction: Some(transaction),
            diagnostics: diagnostics.into_vec(),
            ast,
        })
    }

    #[cold]
    fn poison(&mut self, detail: String) -> SessionError {
        tracing::error!(%detail, "compiler state is inconsistent; poisoning the session");
        self.poisoned = true;
        SessionError::InternalInconsistency(detail)
    }
}

/// The user's own text within an increment.
struct Unit<'t> {
    text: &'t str,
    policy: WrapPolicy,
    /// Number of the wrapper function to generate.
    wrapper: u32,
}

impl Unit<'_> {
    fn compile(
        &self,
        pending: &mut PendingIncrement<'_>,
        interner: &StringInterner,
        options: CompileOptions,
        diagnostics: &mut DiagnosticQueue,
    ) {
        let (source, prefix) = match self.policy {
            WrapPolicy::Wrap => {
                let prefix = format!("void {WRAPPER_PREFIX}{}() {{\n", self.wrapper);
                let source = format!("{prefix}{}\n}}", self.text);
                (source, prefix.len())
            }
            WrapPolicy::Raw => (self.text.to_owned(), 0),
        };
        let prefix = u32::try_from(prefix).unwrap_or(u32::MAX);
        let end = u32::try_from(self.text.len()).unwrap_or(u32::MAX);
        let to_user = |diag: Diagnostic| {
            diag.map_spans(|span| {
                let span = span.shift_back(prefix);
                Span::new(span.start.min(end), span.end.min(end))
            })
        };

        let lexed = cinder_lexer::lex(&source, interner);
        if lexed.has_errors() {
            diagnostics.extend(lexed.diagnostics(&source).into_iter().map(to_user));
            return;
        }
        let parsed = match cinder_parse::parse(&lexed.tokens, interner, &*pending, self.policy) {
            Ok(parsed) => parsed,
            Err(err) => {
                diagnostics.push(to_user(err.to_diagnostic()));
                return;
            }
        };
        let found = check_increment(&parsed, pending, interner, options.check_options());
        diagnostics.extend(found.into_vec().into_iter().map(to_user));
    }
}

/// Resolves and compiles `#include` directives into the pending increment.
struct IncludeLoader<'a> {
    db: &'a mut CinderDb,
    include_paths: &'a [PathBuf],
    options: CheckOptions,
    /// Canonical paths of the files being included, innermost last.
    active: SmallVec<[PathBuf; 4]>,
}

impl IncludeLoader<'_> {
    fn resolve(&self, directive: &IncludeDirective, including_dir: Option<&Path>) -> Option<PathBuf> {
        resolve_include(
            Path::new(&directive.path),
            including_dir.filter(|_| !directive.angled),
            self.include_paths,
        )
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %directive.path))]
    fn include(
        &mut self,
        directive: &IncludeDirective,
        including_dir: Option<&Path>,
        pending: &mut PendingIncrement<'_>,
        diagnostics: &mut DiagnosticQueue,
        source: Option<&SourceInfo>,
    ) {
        let located = |diag: Diagnostic| match source {
            Some(info) => diag.with_source(info.clone()),
            None => diag,
        };
        let Some(path) = self.resolve(directive, including_dir) else {
            let mut diag = Diagnostic::error(ErrorCode::E3001)
                .with_message(format!("file `{}` not found", directive.path))
                .with_label(directive.span, "included here");
            if !self.include_paths.is_empty() {
                let searched: Vec<_> = self
                    .include_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                diag = diag.with_note(format!("searched the working directory and {}", searched.join(", ")));
            }
            diagnostics.push(located(diag));
            return;
        };
        let file = match self.db.refresh_file(&path) {
            Ok(file) => file,
            Err(err) => {
                diagnostics.push(located(
                    Diagnostic::error(ErrorCode::E3002)
                        .with_message(format!("cannot read `{}`: {err}", path.display()))
                        .with_label(directive.span, "included here"),
                ));
                return;
            }
        };

        let db: &CinderDb = self.db;
        let canonical = file.path(db).clone();
        if self.active.contains(&canonical) {
            tracing::debug!("skipping recursive include");
            return;
        }
        let fingerprint = query::fingerprint(db, file);
        if pending.include_fingerprint(&canonical) == Some(fingerprint) {
            tracing::debug!("file unchanged since it was last included");
            return;
        }

        let info = SourceInfo::new(canonical.display().to_string(), file.text(db).clone());
        let directives = query::directives(db, file);
        for span in &directives.malformed {
            diagnostics.push(malformed_include(*span).with_source(info.clone()));
        }
        self.active.push(canonical.clone());
        let dir = canonical.parent().map(Path::to_path_buf);
        for nested in &directives.includes {
            self.include(nested, dir.as_deref(), pending, diagnostics, Some(&info));
        }
        self.active.pop();
        if diagnostics.has_errors() {
            return;
        }

        let db: &CinderDb = self.db;
        let interner = db.interner();
        let lexed = query::tokens(db, file);
        if lexed.has_errors() {
            let found = lexed.diagnostics(&directives.text);
            diagnostics.extend(found.into_iter().map(|d| d.with_source(info.clone())));
            return;
        }
        match cinder_parse::parse(&lexed.tokens, interner, &*pending, WrapPolicy::Raw) {
            Ok(parsed) => {
                let found = check_increment(&parsed, pending, interner, self.options);
                diagnostics.extend(found.into_vec().into_iter().map(|d| d.with_source(info.clone())));
            }
            Err(err) => diagnostics.push(err.to_diagnostic().with_source(info.clone())),
        }
        pending.record_include(canonical, fingerprint);
    }
}

/// First existing candidate for an included `path`: `including_dir`, the
/// working directory, then the include paths. Absolute paths are taken as is.
fn resolve_include(path: &Path, including_dir: Option<&Path>, include_paths: &[PathBuf]) -> Option<PathBuf> {
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    including_dir
        .map(|dir| dir.join(path))
        .into_iter()
        .chain(std::iter::once(path.to_path_buf()))
        .chain(include_paths.iter().map(|dir| dir.join(path)))
        .find(|candidate| candidate.is_file())
}

fn malformed_include(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1006)
        .with_message("malformed `#include` directive")
        .with_label(span, "expected a file name")
        .with_note("write `#include \"file\"` or `#include <file>`")
}

/// Failure category of the first error.
fn failure_kind(diagnostics: &DiagnosticQueue) -> FailureKind {
    match diagnostics.iter().find(|d| d.is_error()).map(|d| d.code.phase()) {
        Some(Phase::Include) => FailureKind::Include,
        Some(Phase::Lexer | Phase::Parser) => FailureKind::Parse,
        _ => FailureKind::Type,
    }
}

#[cfg(test)]
mod tests;
