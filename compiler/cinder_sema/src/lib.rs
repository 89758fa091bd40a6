//! Semantic analysis against a persistent, append-only compilation context.
//!
//! [`CompilationContext`] holds every declaration committed so far. A compile
//! attempt stages its declarations in a [`PendingIncrement`] that reads through
//! to the context without mutating it; [`check_increment`] fills the overlay
//! from a parsed increment. Only [`CompilationContext::commit`] changes the
//! context, and it refuses staged work built against a different state.

mod check;
mod const_eval;
mod context;
mod pending;

pub use check::{check_increment, CheckOptions};
pub use context::{CommitError, CompilationContext, ContextMark};
pub use pending::{PendingIncrement, StagedIncrement};
