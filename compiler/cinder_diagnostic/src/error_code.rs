//! Error codes for all engine diagnostics.
//!
//! Each code is a unique identifier (e.g. `E1001`) whose first digit names the
//! phase that produced it.

use std::fmt;

/// Error codes for all engine diagnostics.
///
/// Format: E#### / W#### where the first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Type errors, W2xxx: type-checker warnings
/// - E3xxx: Include errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Invalid character in source
    E0001,
    /// Unterminated string literal
    E0002,
    /// Invalid or unterminated character literal
    E0003,
    /// Invalid number literal
    E0004,
    /// Unterminated block comment
    E0005,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected declaration
    E1003,
    /// Unsupported C++ construct
    E1004,
    /// Expected type
    E1005,
    /// Malformed `#include` or other preprocessor line
    E1006,
    /// Statement not allowed here
    E1007,

    // Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Use of undeclared identifier
    E2002,
    /// Redefinition of a name
    E2003,
    /// Conflicting declaration
    E2004,
    /// Invalid operands to operator
    E2005,
    /// Expression is not assignable
    E2006,
    /// Assignment to const variable
    E2007,
    /// Wrong number of arguments
    E2008,
    /// Called object is not a function
    E2009,
    /// Invalid use of void
    E2010,
    /// Control statement outside its context (`break` outside a loop, ...)
    E2011,
    /// Enumerator value is not an integer constant
    E2012,
    /// Unknown type name
    E2013,

    // Type Warnings (W2xxx)
    /// Function redefinition (earlier callers keep the old body)
    W2001,
    /// Expression result unused
    W2002,
    /// Control reaches end of non-void function
    W2003,

    // Include Errors (E3xxx)
    /// Include file not found
    E3001,
    /// Include file could not be read
    E3002,

    // Internal Errors (E9xxx)
    /// Internal engine error
    E9001,
}

/// Phase an error code belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
    Lexer,
    Parser,
    Type,
    Include,
    Internal,
}

impl ErrorCode {
    /// Get the code as a string (e.g. `"E1001"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::W2001 => "W2001",
            ErrorCode::W2002 => "W2002",
            ErrorCode::W2003 => "W2003",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ErrorCode::E0001
            | ErrorCode::E0002
            | ErrorCode::E0003
            | ErrorCode::E0004
            | ErrorCode::E0005 => Phase::Lexer,
            ErrorCode::E1001
            | ErrorCode::E1002
            | ErrorCode::E1003
            | ErrorCode::E1004
            | ErrorCode::E1005
            | ErrorCode::E1006
            | ErrorCode::E1007 => Phase::Parser,
            ErrorCode::E3001 | ErrorCode::E3002 => Phase::Include,
            ErrorCode::E9001 => Phase::Internal,
            _ => Phase::Type,
        }
    }

    /// Check if this code is a warning code (`Wxxxx`).
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W2001 | ErrorCode::W2002 | ErrorCode::W2003)
    }

    /// One-line description for `--explain`-style listings.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "invalid character in source",
            ErrorCode::E0002 => "unterminated string literal",
            ErrorCode::E0003 => "invalid character literal",
            ErrorCode::E0004 => "invalid number literal",
            ErrorCode::E0005 => "unterminated block comment",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "expected declaration",
            ErrorCode::E1004 => "unsupported construct",
            ErrorCode::E1005 => "expected type",
            ErrorCode::E1006 => "malformed preprocessor line",
            ErrorCode::E1007 => "statement not allowed here",
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "use of undeclared identifier",
            ErrorCode::E2003 => "redefinition",
            ErrorCode::E2004 => "conflicting declaration",
            ErrorCode::E2005 => "invalid operands",
            ErrorCode::E2006 => "expression is not assignable",
            ErrorCode::E2007 => "assignment to const variable",
            ErrorCode::E2008 => "wrong number of arguments",
            ErrorCode::E2009 => "called object is not a function",
            ErrorCode::E2010 => "invalid use of void",
            ErrorCode::E2011 => "control statement outside its context",
            ErrorCode::E2012 => "enumerator value is not an integer constant",
            ErrorCode::E2013 => "unknown type name",
            ErrorCode::W2001 => "function redefinition",
            ErrorCode::W2002 => "expression result unused",
            ErrorCode::W2003 => "control reaches end of non-void function",
            ErrorCode::E3001 => "include file not found",
            ErrorCode::E3002 => "include file could not be read",
            ErrorCode::E9001 => "internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
