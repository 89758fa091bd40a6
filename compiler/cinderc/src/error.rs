//! Session-level errors.
//!
//! Compile and run failures of a single increment are not errors here:
//! they come back as a status with diagnostics. These types cover the
//! ledger, file execution, and failures fatal to the whole session.

use std::path::PathBuf;

use cinder_diagnostic::Diagnostic;
use cinder_ir::DeclId;
use thiserror::Error;

use crate::transaction::TransactionId;

/// Failure fatal to the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The compiler observed a state it cannot recover from.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
    /// An earlier internal inconsistency disabled the session.
    #[error("session is poisoned by an earlier internal error; reset it to continue")]
    Poisoned,
}

/// Rejected ledger operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("transaction range starts at {found:?}, expected {expected:?}")]
    NonContiguous { expected: DeclId, found: DeclId },
    #[error("transaction range is empty")]
    EmptyRange,
    #[error("unknown transaction {0}")]
    UnknownTransaction(TransactionId),
    #[error("transaction {from} comes after {to}")]
    Reversed { from: TransactionId, to: TransactionId },
}

/// Failure of `.x`/`.L` style file operations; the session stays usable.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExecuteFileError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to load {}: {reason}", path.display())]
    LoadFailed {
        path: PathBuf,
        reason: String,
        diagnostics: Vec<Diagnostic>,
    },
    #[error("no function `{0}` is visible after loading the file")]
    FunctionNotFound(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}
