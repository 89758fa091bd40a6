//! Recursive descent parser for the C++ subset.
//!
//! One call parses one increment. In [`WrapPolicy::Wrap`] mode the token
//! stream is expected to be the synthetic wrapper the compiler generated
//! (`void NAME() { ... }`); its body may mix declarations and statements,
//! and the final item may omit its `;` to request its value. In
//! [`WrapPolicy::Raw`] mode only declarations are accepted.
//!
//! Parsing stops at the first error.

mod cursor;
mod error;
mod grammar;

use cinder_ir::ast::ParsedIncrement;
use cinder_ir::{Name, StringInterner, TokenList, WrapPolicy};
use rustc_hash::FxHashSet;

pub use cursor::Cursor;
pub use error::ParseError;

/// Knowledge of which identifiers name types.
///
/// C++ cannot be parsed without it: `(T) - x` is a cast when `T` is a type
/// and a subtraction otherwise. The compiler answers from the persistent
/// context; names the increment itself declares are tracked by the parser.
pub trait TypeNames {
    fn is_type_name(&self, name: Name) -> bool;
}

/// No type names beyond those the parsed text declares.
pub struct NoTypeNames;

impl TypeNames for NoTypeNames {
    fn is_type_name(&self, _name: Name) -> bool {
        false
    }
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    interner: &'a StringInterner,
    types: &'a dyn TypeNames,
    /// Enum and typedef names declared earlier in this increment.
    local_types: FxHashSet<Name>,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &'a TokenList,
        interner: &'a StringInterner,
        types: &'a dyn TypeNames,
    ) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            types,
            local_types: FxHashSet::default(),
        }
    }

    pub(crate) fn is_type_name(&self, name: Name) -> bool {
        self.local_types.contains(&name) || self.types.is_type_name(name)
    }
}

/// Parse one increment's tokens.
pub fn parse(
    tokens: &TokenList,
    interner: &StringInterner,
    types: &dyn TypeNames,
    policy: WrapPolicy,
) -> Result<ParsedIncrement, ParseError> {
    let mut parser = Parser::new(tokens, interner, types);
    match policy {
        WrapPolicy::Wrap => parser.parse_wrapped(),
        WrapPolicy::Raw => parser.parse_raw(),
    }
}
