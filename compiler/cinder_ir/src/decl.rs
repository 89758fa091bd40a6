//! Checked declarations: the persistent form of compiled code.
//!
//! Everything the compilation context keeps after an increment commits is a
//! [`Decl`]. Function bodies and global initializers are stored as checked
//! trees ([`HStmt`], [`HExpr`]) whose names are already resolved to
//! [`DeclId`]s or frame slots. The only unresolved references are deferred
//! lookups ([`DeferredRef`]), which carry their own resolution cache.

use std::cell::OnceCell;
use std::fmt;

use crate::{BinaryOp, Name, Signature, Span, Type, UnaryOp};

/// Index of a declaration in the compilation context.
///
/// Ids are dense and assigned in commit order, so a range of ids describes
/// exactly what one increment introduced.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DeclId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Id for the `index`-th declaration, saturating on overflow.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        DeclId(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Half-open range `[start, end)` of declaration ids.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclRange {
    pub start: DeclId,
    pub end: DeclId,
}

impl DeclRange {
    pub const fn new(start: DeclId, end: DeclId) -> Self {
        DeclRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.index().saturating_sub(self.start.index())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<DeclId> {
        (!self.is_empty()).then_some(self.start)
    }

    pub fn last(&self) -> Option<DeclId> {
        (!self.is_empty()).then(|| DeclId::from_raw(self.end.raw() - 1))
    }

    pub fn contains(&self, id: DeclId) -> bool {
        id >= self.start && id < self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = DeclId> {
        (self.start.raw()..self.end.raw()).map(DeclId::from_raw)
    }
}

/// Slot of a local variable or parameter in a call frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LocalId(pub u32);

impl LocalId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read access to declarations by id.
///
/// Implemented by the compilation context and by staged increments, so
/// consumers (printer, interpreter) work on either.
pub trait DeclLookup {
    fn decl(&self, id: DeclId) -> Option<&Decl>;
}

/// A committed (or staged) declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct Decl {
    pub id: DeclId,
    pub name: Name,
    pub span: Span,
    pub kind: DeclKind,
}

#[derive(Clone, PartialEq, Debug)]
pub enum DeclKind {
    Variable(VariableInfo),
    Function(FunctionInfo),
    Enum { enumerators: Vec<DeclId> },
    Enumerator { parent: DeclId, value: i64 },
    Typedef(Type),
    /// Synthetic function holding a wrapped increment's statements.
    Wrapper(FnBody),
}

impl DeclKind {
    /// Short noun used in diagnostics ("variable", "function", ...).
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Variable(_) => "variable",
            DeclKind::Function(_) => "function",
            DeclKind::Enum { .. } => "enum",
            DeclKind::Enumerator { .. } => "enumerator",
            DeclKind::Typedef(_) => "typedef",
            DeclKind::Wrapper(_) => "wrapper",
        }
    }

    /// Does running the owning transaction execute this declaration?
    pub fn is_executable(&self) -> bool {
        match self {
            DeclKind::Variable(var) => var.init.is_some(),
            DeclKind::Wrapper(_) => true,
            _ => false,
        }
    }
}

/// A global variable.
///
/// `init` is only set for variables declared in raw mode; in wrapped mode
/// the initializer stays in the wrapper as [`HStmtKind::InitGlobal`].
#[derive(Clone, PartialEq, Debug)]
pub struct VariableInfo {
    pub ty: Type,
    pub is_const: bool,
    pub init: Option<HExpr>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionInfo {
    pub sig: Signature,
    pub params: Vec<Name>,
    /// `None` for a prototype.
    pub body: Option<FnBody>,
}

impl FunctionInfo {
    pub fn is_defined(&self) -> bool {
        self.body.is_some()
    }
}

/// A checked function body and the number of frame slots it needs.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct FnBody {
    pub stmts: Vec<HStmt>,
    pub frame_size: u32,
}

/// A name left for run-time resolution.
///
/// The first successful evaluation caches the resolved declaration; later
/// evaluations reuse it even if the name is rebound afterwards.
#[derive(Clone, PartialEq, Debug)]
pub struct DeferredRef {
    pub name: Name,
    resolved: OnceCell<DeclId>,
}

impl DeferredRef {
    pub fn new(name: Name) -> Self {
        DeferredRef {
            name,
            resolved: OnceCell::new(),
        }
    }

    /// Cached resolution, if evaluation already resolved the name.
    pub fn resolved(&self) -> Option<DeclId> {
        self.resolved.get().copied()
    }

    /// Resolve with `lookup` unless already cached.
    pub fn resolve_with(&self, lookup: impl FnOnce(Name) -> Option<DeclId>) -> Option<DeclId> {
        if let Some(id) = self.resolved.get() {
            return Some(*id);
        }
        let id = lookup(self.name)?;
        Some(*self.resolved.get_or_init(|| id))
    }
}

/// A checked expression with its type.
#[derive(Clone, PartialEq, Debug)]
pub struct HExpr {
    pub kind: HExprKind,
    pub ty: Type,
    pub span: Span,
}

impl HExpr {
    pub fn new(kind: HExprKind, ty: Type, span: Span) -> Self {
        HExpr { kind, ty, span }
    }

    /// Expressions with an observable effect (used for unused-result warnings).
    pub fn has_side_effects(&self) -> bool {
        match &self.kind {
            HExprKind::Assign { .. } | HExprKind::IncDec { .. } | HExprKind::Call { .. } => true,
            HExprKind::Unary { operand, .. } | HExprKind::Convert(operand) => {
                operand.has_side_effects()
            }
            HExprKind::Binary { lhs, rhs, .. } | HExprKind::Logical { lhs, rhs, .. } => {
                lhs.has_side_effects() || rhs.has_side_effects()
            }
            HExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                cond.has_side_effects()
                    || then_expr.has_side_effects()
                    || else_expr.has_side_effects()
            }
            _ => false,
        }
    }
}

/// Assignable location.
#[derive(Clone, PartialEq, Debug)]
pub enum Place {
    Local(LocalId),
    Global(DeclId),
    Deferred(DeferredRef),
}

/// Callable target.
#[derive(Clone, PartialEq, Debug)]
pub enum Callee {
    /// A function declaration bound at compile time.
    Direct(DeclId),
    /// A function value computed at run time.
    Indirect(Box<HExpr>),
    Builtin(Builtin),
    Deferred(DeferredRef),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Builtin {
    Printf,
    Puts,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Printf => "printf",
            Builtin::Puts => "puts",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "printf" => Some(Builtin::Printf),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum HExprKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(Name),
    Local(LocalId),
    Global(DeclId),
    FunctionRef(DeclId),
    Deferred(DeferredRef),
    Unary {
        op: UnaryOp,
        operand: Box<HExpr>,
    },
    /// Arithmetic, comparison, bitwise or shift operator.
    Binary {
        op: BinaryOp,
        lhs: Box<HExpr>,
        rhs: Box<HExpr>,
    },
    /// Short-circuiting `&&` (`is_and`) or `||`.
    Logical {
        is_and: bool,
        lhs: Box<HExpr>,
        rhs: Box<HExpr>,
    },
    Assign {
        place: Place,
        op: Option<BinaryOp>,
        value: Box<HExpr>,
    },
    IncDec {
        place: Place,
        increment: bool,
        prefix: bool,
    },
    Call {
        callee: Callee,
        args: Vec<HExpr>,
    },
    Ternary {
        cond: Box<HExpr>,
        then_expr: Box<HExpr>,
        else_expr: Box<HExpr>,
    },
    /// Convert the operand to this expression's type.
    Convert(Box<HExpr>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct HStmt {
    pub kind: HStmtKind,
    pub span: Span,
}

impl HStmt {
    pub fn new(kind: HStmtKind, span: Span) -> Self {
        HStmt { kind, span }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum HStmtKind {
    Expr(HExpr),
    /// Local variable; without an initializer it starts at zero of `ty`.
    Local {
        slot: LocalId,
        name: Name,
        ty: Type,
        init: Option<HExpr>,
    },
    /// Initializer of a global extracted from a wrapped increment.
    InitGlobal {
        decl: DeclId,
        init: HExpr,
    },
    Block(Vec<HStmt>),
    If {
        cond: HExpr,
        then_branch: Box<HStmt>,
        else_branch: Option<Box<HStmt>>,
    },
    While {
        cond: HExpr,
        body: Box<HStmt>,
    },
    DoWhile {
        body: Box<HStmt>,
        cond: HExpr,
    },
    For {
        init: Option<Box<HStmt>>,
        cond: Option<HExpr>,
        step: Option<HExpr>,
        body: Box<HStmt>,
    },
    Return(Option<HExpr>),
    Break,
    Continue,
    Throw(Option<HExpr>),
    /// Trailing value of a wrapped increment, captured as its result.
    Value(HExpr),
}
