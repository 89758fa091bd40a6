//! Cinder IR - shared data structures for the incremental C++ engine.
//!
//! This crate holds everything the phases hand to each other:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Tokens and `TokenList` for lexer output
//! - The parsed AST of one increment
//! - Semantic types and checked declarations (the persistent form)
//! - A source-like printer for declarations
//!
//! # Salsa Compatibility
//!
//! Token-level types carry Clone, Eq, Hash and Debug so they can be cached
//! by the file database. Floats in tokens are stored as u64 bits for Hash.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
pub mod decl;
mod interner;
mod name;
pub mod printer;
mod span;
mod token;
mod types;

pub use ast::{BinaryOp, UnaryOp, WrapPolicy};
pub use decl::{
    Builtin, Callee, Decl, DeclId, DeclKind, DeclLookup, DeclRange, DeferredRef, FnBody,
    FunctionInfo, HExpr, HExprKind, HStmt, HStmtKind, LocalId, Place, VariableInfo,
};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
pub use token::{Token, TokenKind, TokenList};
pub use types::{Signature, Type, TypeDisplay};
