//! Cinder: an incremental compile-and-run engine for a C++ subset.
//!
//! Input arrives in chunks. Each chunk is compiled against everything
//! committed before it and becomes one transaction; a chunk that fails to
//! compile leaves no trace. Committed code runs immediately in a tree-walking
//! interpreter.
//!
//! Layers, bottom up:
//! - [`validator`]: decides when typed lines form a complete chunk
//! - [`db`], [`query`]: salsa database caching included files
//! - [`compiler`]: wrapping, includes, and atomic commits
//! - [`transaction`]: the append-only ledger of commits
//! - [`engine`]: runs the executable part of a transaction
//! - [`session`]: compile plus run, with result values
//! - [`meta`]: the line-level front end and its dot commands

pub mod compiler;
pub mod db;
pub mod engine;
pub mod error;
pub mod include;
pub mod input;
pub mod meta;
pub mod options;
pub mod query;
pub mod session;
pub mod transaction;
pub mod validator;

pub use compiler::{CompileOutput, CompileStatus, FailureKind, IncrementalCompiler};
pub use db::{CinderDb, Db};
pub use engine::{ExecutionEngine, FileSpec, RunOutcome, RunStatus};
pub use error::{ExecuteFileError, LedgerError, SessionError};
pub use input::SourceFile;
pub use meta::{LineResult, MetaCommand, MetaFlags, MetaProcessor};
pub use options::CompileOptions;
pub use session::{
    ExecuteFileOutput, ProcessOutput, ResultValue, Session, SessionConfig, SessionStats,
    SharedSession,
};
pub use transaction::{Ledger, Transaction, TransactionId, TransactionStatus};
pub use validator::{InputValidator, ValidationResult};
