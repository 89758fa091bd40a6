//! Semantic checking of one parsed increment.
//!
//! The checker resolves names against a [`PendingIncrement`], types every
//! expression, and stages the resulting declarations. Errors are collected
//! rather than returned: a failing declaration or statement is reported and
//! checking continues with the next one, so one compile attempt reports as
//! many independent problems as possible.
//!
//! # Wrapped increments
//!
//! ```text
//! void __cinder_wrapper_3() {          int total = 0;        (global, no init)
//!     int total = f(2);          ==>   int twice(int);       (global)
//!     int twice(int x) {...}           __cinder_wrapper_3:   (wrapper, last)
//!     total + twice(total)                 total = f(2);
//! }                                        <value> total + twice(total)
//! ```
//!
//! Declarations move to translation-unit scope; initializers stay in the
//! wrapper at their original position so execution order is unchanged.

mod expr;
mod stmt;
mod types;

use cinder_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use cinder_ir::ast::{EnumDef, FunctionDef, Item, ParsedIncrement, TypedefDef, VarDecl};
use cinder_ir::{
    DeclId, DeclKind, DeclLookup, FnBody, FunctionInfo, HExpr, HExprKind, HStmt, HStmtKind,
    LocalId, Name, Signature, Span, StringInterner, Type, VariableInfo,
};
use rustc_hash::FxHashMap;

use crate::const_eval::fold_int;
use crate::PendingIncrement;

type CheckResult<T> = Result<T, Diagnostic>;

/// Per-increment checking options.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct CheckOptions {
    /// Compile unresolved identifiers into deferred lookups instead of
    /// reporting them.
    pub dynamic_lookup: bool,
}

/// Check `parsed` and stage its declarations in `pending`.
///
/// Returns every diagnostic produced. The caller must not commit `pending`
/// when the queue holds errors.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(items = parsed.items.len(), wrapped = parsed.is_wrapped())
)]
pub fn check_increment(
    parsed: &ParsedIncrement,
    pending: &mut PendingIncrement<'_>,
    interner: &StringInterner,
    options: CheckOptions,
) -> DiagnosticQueue {
    let mut checker = Checker::new(pending, interner, options);
    match parsed.wrapper {
        Some(wrapper) => checker.check_wrapped(parsed, wrapper),
        None => checker.check_raw(&parsed.items),
    }
    checker.diagnostics
}

struct LocalVar {
    slot: LocalId,
    ty: Type,
    is_const: bool,
}

/// State of the function body being checked.
struct FnState {
    scopes: Vec<FxHashMap<Name, LocalVar>>,
    next_slot: u32,
    ret: Type,
    loop_depth: u32,
}

impl FnState {
    fn new(ret: Type) -> Self {
        FnState {
            scopes: vec![FxHashMap::default()],
            next_slot: 0,
            ret,
            loop_depth: 0,
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, name: Name) -> Option<&LocalVar> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }
}

/// Outcome of comparing a function declaration with the current binding.
enum FunctionBinding {
    New,
    /// Same signature, previous one has a body.
    Redefine,
    /// Definition completing a prototype.
    Complete(DeclId),
    /// Repeated prototype; the binding stays.
    Repeat,
}

pub(crate) struct Checker<'a, 'ctx> {
    pending: &'a mut PendingIncrement<'ctx>,
    interner: &'a StringInterner,
    options: CheckOptions,
    diagnostics: DiagnosticQueue,
    func: FnState,
}

impl<'a, 'ctx> Checker<'a, 'ctx> {
    fn new(
        pending: &'a mut PendingIncrement<'ctx>,
        interner: &'a StringInterner,
        options: CheckOptions,
    ) -> Self {
        Checker {
            pending,
            interner,
            options,
            diagnostics: DiagnosticQueue::new(),
            func: FnState::new(Type::Void),
        }
    }

    fn report(&mut self, result: CheckResult<()>) {
        if let Err(diag) = result {
            self.diagnostics.push(diag);
        }
    }

    fn name(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    fn check_raw(&mut self, items: &[Item]) {
        for item in items {
            let result = match item {
                Item::Function(f) => self.declare_function(f),
                Item::Vars(vars) => vars.iter().try_for_each(|var| {
                    self.declare_global(var, true).map(|_| ())
                }),
                Item::Enum(e) => self.declare_enum(e),
                Item::Typedef(t) => self.declare_typedef(t),
                Item::Stmt(stmt) => Err(Diagnostic::error(ErrorCode::E1007)
                    .with_message("statements are not allowed at file scope")
                    .with_label(stmt.span, "statement outside of a function")),
            };
            self.report(result);
        }
    }

    fn check_wrapped(&mut self, parsed: &ParsedIncrement, wrapper: Name) {
        self.func = FnState::new(Type::Void);
        let mut stmts = Vec::new();
        for (index, item) in parsed.items.iter().enumerate() {
            let is_value = parsed.value_item == Some(index);
            let result = match item {
                Item::Function(f) => self.declare_function(f),
                Item::Enum(e) => self.declare_enum(e),
                Item::Typedef(t) => self.declare_typedef(t),
                Item::Vars(vars) => self.hoist_globals(vars, is_value, &mut stmts),
                Item::Stmt(stmt) if is_value => self.check_value_stmt(stmt, &mut stmts),
                Item::Stmt(stmt) => {
                    self.check_stmt_into(stmt, &mut stmts);
                    Ok(())
                }
            };
            self.report(result);
        }

        let span = parsed
            .items
            .iter()
            .map(Item::span)
            .reduce(Span::merge)
            .unwrap_or(Span::DUMMY);
        let body = FnBody {
            stmts,
            frame_size: self.func.next_slot,
        };
        self.pending.push(wrapper, span, DeclKind::Wrapper(body));
    }

    /// Move a wrapped variable declaration to translation-unit scope,
    /// leaving its initializer in the wrapper.
    fn hoist_globals(
        &mut self,
        vars: &[VarDecl],
        is_value: bool,
        stmts: &mut Vec<HStmt>,
    ) -> CheckResult<()> {
        for (index, var) in vars.iter().enumerate() {
            let (decl, init) = self.declare_global(var, false)?;
            if let Some(init) = init {
                stmts.push(HStmt::new(HStmtKind::InitGlobal { decl, init }, var.span));
            }
            if is_value && index + 1 == vars.len() {
                let ty = self.global_type(decl);
                let value = HExpr::new(HExprKind::Global(decl), ty, var.name_span);
                stmts.push(HStmt::new(HStmtKind::Value(value), var.span));
            }
        }
        Ok(())
    }

    fn global_type(&self, id: DeclId) -> Type {
        match self.pending.decl(id).map(|d| &d.kind) {
            Some(DeclKind::Variable(info)) => info.ty.clone(),
            _ => Type::Dynamic,
        }
    }

    /// Stage a global variable. With `inline_init` the initializer is kept on
    /// the declaration (raw mode); otherwise it is returned to the caller.
    fn declare_global(
        &mut self,
        var: &VarDecl,
        inline_init: bool,
    ) -> CheckResult<(DeclId, Option<HExpr>)> {
        let (ty, init) = self.declared_type_and_init(var)?;
        self.check_redeclaration(var.name, var.name_span)?;
        let (kept, returned) = if inline_init {
            (init, None)
        } else {
            (None, init)
        };
        let info = VariableInfo {
            ty,
            is_const: var.ty.is_const,
            init: kept,
        };
        let id = self
            .pending
            .push(var.name, var.span, DeclKind::Variable(info));
        self.pending.bind(var.name, id);
        Ok((id, returned))
    }

    /// Resolve a declarator's type (deducing `auto`) and check its
    /// initializer against it.
    fn declared_type_and_init(&mut self, var: &VarDecl) -> CheckResult<(Type, Option<HExpr>)> {
        let init = var.init.as_ref().map(|e| self.check_expr(e)).transpose()?;
        let ty = match (var.ty.spec, &init) {
            (cinder_ir::ast::TypeSpec::Auto, Some(init)) => {
                if init.ty.is_void() {
                    return Err(self.void_value(init.span));
                }
                init.ty.clone()
            }
            (cinder_ir::ast::TypeSpec::Auto, None) => {
                return Err(Diagnostic::error(ErrorCode::E2013)
                    .with_message(format!(
                        "declaration of variable `{}` with deduced type `auto` requires an initializer",
                        self.name(var.name)
                    ))
                    .with_label(var.name_span, "no initializer"));
            }
            _ => self.resolve_type(var.ty)?,
        };
        if ty.is_void() {
            return Err(Diagnostic::error(ErrorCode::E2010)
                .with_message(format!(
                    "variable `{}` has incomplete type `void`",
                    self.name(var.name)
                ))
                .with_label(var.ty.span, "`void` is not a value type"));
        }
        if var.ty.is_const && init.is_none() {
            return Err(Diagnostic::error(ErrorCode::E2007)
                .with_message(format!(
                    "default initialization of an object of const type `const {}`",
                    ty.display(self.interner)
                ))
                .with_label(var.name_span, "const variable needs an initializer"));
        }
        let init = init.map(|e| self.coerce(e, &ty)).transpose()?;
        Ok((ty, init))
    }

    fn check_redeclaration(&self, name: Name, span: Span) -> CheckResult<()> {
        match self.pending.lookup(name) {
            Some(prev) => Err(self.redefinition(name, span, prev)),
            None => Ok(()),
        }
    }

    #[cold]
    fn redefinition(&self, name: Name, span: Span, prev: DeclId) -> Diagnostic {
        let what = self
            .pending
            .decl(prev)
            .map_or("declaration", |d| d.kind.describe());
        let previous = if self.pending.is_staged(prev) {
            "earlier in this input"
        } else {
            "in an earlier input"
        };
        Diagnostic::error(ErrorCode::E2003)
            .with_message(format!("redefinition of `{}`", self.name(name)))
            .with_label(span, "redefined here")
            .with_note(format!(
                "`{}` was declared as a {what} {previous}",
                self.name(name)
            ))
    }

    fn declare_function(&mut self, f: &FunctionDef) -> CheckResult<()> {
        let sig = self.function_signature(f)?;
        let binding = match self.pending.lookup(f.name) {
            None => FunctionBinding::New,
            Some(prev) => match self.pending.decl(prev).map(|d| &d.kind) {
                Some(DeclKind::Function(info)) if info.sig == sig => {
                    match (info.is_defined(), f.body.is_some()) {
                        (_, false) => FunctionBinding::Repeat,
                        (false, true) => FunctionBinding::Complete(prev),
                        (true, true) => FunctionBinding::Redefine,
                    }
                }
                Some(DeclKind::Function(info)) => {
                    let previous = Type::Function(Box::new(info.sig.clone()));
                    let current = Type::Function(Box::new(sig));
                    return Err(Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!("conflicting types for `{}`", self.name(f.name)))
                        .with_label(
                            f.name_span,
                            format!("declared here as `{}`", current.display(self.interner)),
                        )
                        .with_note(format!(
                            "previously declared as `{}`",
                            previous.display(self.interner)
                        )));
                }
                _ => return Err(self.redefinition(f.name, f.name_span, prev)),
            },
        };

        let params = f
            .params
            .iter()
            .map(|p| p.name.unwrap_or(Name::EMPTY))
            .collect();
        let info = FunctionInfo {
            sig: sig.clone(),
            params,
            body: None,
        };
        let id = self.pending.push(f.name, f.span, DeclKind::Function(info));
        match binding {
            FunctionBinding::Repeat => {}
            FunctionBinding::New => self.pending.bind(f.name, id),
            FunctionBinding::Complete(prototype) => {
                self.pending.bind(f.name, id);
                self.pending.link_definition(prototype, id);
            }
            FunctionBinding::Redefine => {
                self.pending.bind(f.name, id);
                self.diagnostics.push(
                    Diagnostic::warning(ErrorCode::W2001)
                        .with_message(format!(
                            "redefinition of `{}` replaces the previous definition",
                            self.name(f.name)
                        ))
                        .with_label(f.name_span, "redefined here")
                        .with_note("code compiled earlier keeps calling the previous definition"),
                );
            }
        }

        if let Some(body) = &f.body {
            let body = self.check_function_body(f, &sig, body);
            if let Some(DeclKind::Function(info)) = self.pending.staged_mut(id).map(|d| &mut d.kind)
            {
                info.body = Some(body);
            }
        }
        Ok(())
    }

    fn function_signature(&mut self, f: &FunctionDef) -> CheckResult<Signature> {
        let ret = self.resolve_type(f.ret)?;
        let mut params = Vec::with_capacity(f.params.len());
        for param in &f.params {
            let ty = self.resolve_type(param.ty)?;
            if ty.is_void() {
                return Err(Diagnostic::error(ErrorCode::E2010)
                    .with_message("parameter has incomplete type `void`")
                    .with_label(param.span, "`void` parameter"));
            }
            params.push(ty);
        }
        Ok(Signature { ret, params })
    }

    fn check_function_body(
        &mut self,
        f: &FunctionDef,
        sig: &Signature,
        body: &[cinder_ir::ast::Stmt],
    ) -> FnBody {
        let outer = std::mem::replace(&mut self.func, FnState::new(sig.ret.clone()));
        for (param, ty) in f.params.iter().zip(&sig.params) {
            match param.name {
                Some(name) => {
                    self.declare_local(name, ty.clone(), false, param.span);
                }
                None => self.func.next_slot += 1,
            }
        }
        let mut stmts = Vec::new();
        for stmt in body {
            self.check_stmt_into(stmt, &mut stmts);
        }
        let frame_size = self.func.next_slot;
        self.func = outer;

        if !sig.ret.is_void() && !stmt::terminates(&stmts) {
            self.diagnostics.push(
                Diagnostic::warning(ErrorCode::W2003)
                    .with_message(format!(
                        "non-void function `{}` does not return a value in all control paths",
                        self.name(f.name)
                    ))
                    .with_label(f.name_span, "control may reach the end of this function")
                    .with_note("falling off the end returns zero"),
            );
        }
        FnBody { stmts, frame_size }
    }

    /// Allocate a frame slot for a local, reporting a redeclaration in the
    /// same scope.
    fn declare_local(&mut self, name: Name, ty: Type, is_const: bool, span: Span) -> LocalId {
        let slot = LocalId(self.func.next_slot);
        self.func.next_slot += 1;
        let duplicate = self
            .func
            .scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&name));
        if duplicate {
            let diag = Diagnostic::error(ErrorCode::E2003)
                .with_message(format!("redefinition of `{}`", self.name(name)))
                .with_label(span, "redefined in the same scope");
            self.diagnostics.push(diag);
        }
        if let Some(scope) = self.func.scopes.last_mut() {
            scope.insert(name, LocalVar { slot, ty, is_const });
        }
        slot
    }

    fn declare_enum(&mut self, e: &EnumDef) -> CheckResult<()> {
        if let Some(name) = e.name {
            self.check_redeclaration(name, e.span)?;
        }
        let enum_id = self.pending.push(
            e.name.unwrap_or(Name::EMPTY),
            e.span,
            DeclKind::Enum {
                enumerators: Vec::new(),
            },
        );
        if let Some(name) = e.name {
            self.pending.bind(name, enum_id);
        }

        let mut ids = Vec::with_capacity(e.enumerators.len());
        let mut next = 0i64;
        for enumerator in &e.enumerators {
            let value = match &enumerator.value {
                None => next,
                Some(expr) => {
                    let checked = self.check_expr(expr)?;
                    checked
                        .ty
                        .is_integral()
                        .then(|| fold_int(&checked))
                        .flatten()
                        .ok_or_else(|| {
                            Diagnostic::error(ErrorCode::E2012)
                                .with_message(format!(
                                    "value of enumerator `{}` is not an integer constant",
                                    self.name(enumerator.name)
                                ))
                                .with_label(expr.span, "not a constant expression")
                        })?
                }
            };
            self.check_redeclaration(enumerator.name, enumerator.span)?;
            let id = self.pending.push(
                enumerator.name,
                enumerator.span,
                DeclKind::Enumerator {
                    parent: enum_id,
                    value,
                },
            );
            self.pending.bind(enumerator.name, id);
            ids.push(id);
            next = value.wrapping_add(1);
        }

        if let Some(DeclKind::Enum { enumerators }) =
            self.pending.staged_mut(enum_id).map(|d| &mut d.kind)
        {
            *enumerators = ids;
        }
        Ok(())
    }

    fn declare_typedef(&mut self, t: &TypedefDef) -> CheckResult<()> {
        let ty = self.resolve_type(t.ty)?;
        if let Some(prev) = self.pending.lookup(t.name) {
            match self.pending.decl(prev).map(|d| &d.kind) {
                Some(DeclKind::Typedef(existing)) if *existing == ty => {}
                Some(DeclKind::Typedef(existing)) => {
                    return Err(Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!(
                            "typedef redefinition with different types (`{}` vs `{}`)",
                            ty.display(self.interner),
                            existing.display(self.interner)
                        ))
                        .with_label(t.span, "redefined here"));
                }
                _ => return Err(self.redefinition(t.name, t.span, prev)),
            }
        }
        let id = self.pending.push(t.name, t.span, DeclKind::Typedef(ty));
        self.pending.bind(t.name, id);
        Ok(())
    }

    #[cold]
    fn void_value(&self, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorCode::E2010)
            .with_message("`void` value used where a value is required")
            .with_label(span, "this expression has type `void`")
    }

    #[cold]
    fn undeclared(&self, name: Name, span: Span) -> Diagnostic {
        let diag = Diagnostic::error(ErrorCode::E2002)
            .with_message(format!(
                "use of undeclared identifier `{}`",
                self.name(name)
            ))
            .with_label(span, "not found in this scope");
        if self.options.dynamic_lookup {
            diag
        } else {
            diag.with_suggestion("enable `.dynamicExtensions` to resolve it when the code runs")
        }
    }
}
