//! Parsed AST for one increment.
//!
//! The parser produces a [`ParsedIncrement`]: a flat list of [`Item`]s in
//! source order. Names are unresolved; the checker binds them against the
//! persistent compilation context.

use crate::{Name, Span};

/// How an increment's text is compiled.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum WrapPolicy {
    /// Embed the text in a synthetic function so statements and a trailing
    /// value expression are allowed.
    #[default]
    Wrap,
    /// Compile the text as translation-unit declarations.
    Raw,
}

/// Base type spelled in source.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeSpec {
    Void,
    Bool,
    Char,
    /// Any of `int`, `long`, `short`, `signed`, `unsigned` combinations.
    Int,
    /// `float` or `double`.
    Double,
    /// `char*` / `const char*`.
    Str,
    Auto,
    /// An enum or typedef name.
    Named(Name),
}

/// A type as written, with its qualifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParsedType {
    pub spec: TypeSpec,
    pub is_const: bool,
    pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// C++ binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 7,
            BinaryOp::Eq | BinaryOp::NotEq => 6,
            BinaryOp::BitAnd => 5,
            BinaryOp::BitXor => 4,
            BinaryOp::BitOr => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::Eq
                | BinaryOp::NotEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Operators that require integral operands.
    pub fn is_integral_only(self) -> bool {
        matches!(
            self,
            BinaryOp::Rem
                | BinaryOp::Shl
                | BinaryOp::Shr
                | BinaryOp::BitAnd
                | BinaryOp::BitXor
                | BinaryOp::BitOr
        )
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(Name),
    Ident(Name),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `target = value` or `target op= value`.
    Assign {
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    IncDec {
        increment: bool,
        prefix: bool,
        target: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Cast {
        ty: ParsedType,
        expr: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// One declarator of a variable declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct VarDecl {
    pub ty: ParsedType,
    pub name: Name,
    pub name_span: Span,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub ty: ParsedType,
    pub name: Option<Name>,
    pub span: Span,
}

/// A function prototype (`body == None`) or definition.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDef {
    pub ret: ParsedType,
    pub name: Name,
    pub name_span: Span,
    pub params: Vec<Param>,
    pub body: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumeratorDef {
    pub name: Name,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumDef {
    pub name: Option<Name>,
    pub enumerators: Vec<EnumeratorDef>,
    pub span: Span,
}

/// `typedef T name;` or `using name = T;`.
#[derive(Clone, PartialEq, Debug)]
pub struct TypedefDef {
    pub name: Name,
    pub ty: ParsedType,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum StmtKind {
    Expr(Expr),
    /// Local variable declaration with one or more declarators.
    Vars(Vec<VarDecl>),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Throw(Option<Expr>),
    Empty,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// A top-level item of an increment.
///
/// In raw mode only declarations appear. In wrapped mode statements are
/// allowed too and run in order when the increment executes.
#[derive(Clone, PartialEq, Debug)]
pub enum Item {
    Function(FunctionDef),
    Vars(Vec<VarDecl>),
    Enum(EnumDef),
    Typedef(TypedefDef),
    Stmt(Stmt),
}

impl Item {
    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span,
            Item::Vars(vars) => vars
                .iter()
                .map(|v| v.span)
                .reduce(Span::merge)
                .unwrap_or(Span::DUMMY),
            Item::Enum(e) => e.span,
            Item::Typedef(t) => t.span,
            Item::Stmt(s) => s.span,
        }
    }
}

/// Parser output for one increment.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ParsedIncrement {
    pub items: Vec<Item>,
    /// Name of the synthetic wrapper function, in wrapped mode.
    pub wrapper: Option<Name>,
    /// Index into `items` of a trailing value item (an expression statement
    /// or variable declaration whose `;` was omitted before the closing brace).
    pub value_item: Option<usize>,
}

impl ParsedIncrement {
    pub fn is_wrapped(&self) -> bool {
        self.wrapper.is_some()
    }
}
