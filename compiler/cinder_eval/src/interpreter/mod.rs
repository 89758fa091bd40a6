//! Tree-walking interpreter over committed declarations.
//!
//! Each call gets a [`Frame`] of value slots sized by the checker; locals
//! and parameters are addressed by slot, globals by declaration id. Calls
//! bound at compile time go through the context's prototype links, so a
//! call compiled against a prototype reaches the definition committed
//! later, while a call bound to an older definition keeps reaching it.

mod exec;
mod expr;
mod format;
mod operators;

use cinder_ir::{Decl, DeclId, DeclKind, DeclLookup, LocalId, StringInterner, Type};
use cinder_sema::CompilationContext;
use cinder_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::errors::{internal, not_callable, undefined_function};
use crate::{EvalError, EvalErrorKind, EvalResult, Globals, PrintHandlerImpl, Value};

/// Default limit on nested interpreted calls.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Evaluated call arguments.
type Args = SmallVec<[Value; 4]>;

/// Value slots of one activation.
pub(crate) struct Frame {
    slots: Vec<Value>,
}

impl Frame {
    fn new(size: u32) -> Self {
        Frame {
            slots: vec![Value::Void; size as usize],
        }
    }

    fn get(&self, slot: LocalId) -> EvalResult {
        self.slots
            .get(slot.index())
            .copied()
            .ok_or_else(|| internal(format!("frame slot {} out of range", slot.0)))
    }

    fn set(&mut self, slot: LocalId, value: Value) -> Result<(), EvalError> {
        let cell = self
            .slots
            .get_mut(slot.index())
            .ok_or_else(|| internal(format!("frame slot {} out of range", slot.0)))?;
        *cell = value;
        Ok(())
    }
}

/// How a statement finished.
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Executes declarations of one compilation context.
pub struct Interpreter<'a> {
    ctx: &'a CompilationContext,
    interner: &'a StringInterner,
    globals: &'a mut Globals,
    print: &'a PrintHandlerImpl,
    max_depth: usize,
    depth: usize,
    /// Trailing value of the wrapper being executed.
    captured: Option<Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        ctx: &'a CompilationContext,
        interner: &'a StringInterner,
        globals: &'a mut Globals,
        print: &'a PrintHandlerImpl,
    ) -> Self {
        Interpreter {
            ctx,
            interner,
            globals,
            print,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
            captured: None,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Execute one declaration.
    ///
    /// Raw-mode variables run their initializer; wrappers run their body and
    /// return the trailing value, if any. Other declarations do nothing.
    #[tracing::instrument(level = "debug", skip_all, fields(decl = decl.id.raw(), kind = decl.kind.describe()))]
    pub fn execute(&mut self, decl: &Decl) -> Result<Option<Value>, EvalError> {
        match &decl.kind {
            DeclKind::Variable(info) => {
                if let Some(init) = &info.init {
                    let mut frame = Frame::new(0);
                    let value = self.eval(init, &mut frame)?.convert(&info.ty)?;
                    self.globals.set(decl.id, value);
                }
                Ok(None)
            }
            DeclKind::Wrapper(body) => {
                self.captured = None;
                let mut frame = Frame::new(body.frame_size);
                self.exec_block(&body.stmts, &mut frame)?;
                Ok(self.captured.take())
            }
            _ => Ok(None),
        }
    }

    /// Call a function declaration with evaluated arguments.
    fn call_function(&mut self, id: DeclId, args: Args) -> EvalResult {
        let ctx = self.ctx;
        let target = ctx.resolve_definition(id);
        let decl = ctx
            .decl(target)
            .ok_or_else(|| internal(format!("call target {target:?} is missing")))?;
        let DeclKind::Function(info) = &decl.kind else {
            return Err(not_callable(decl.kind.describe()));
        };
        let name = self.interner.lookup(decl.name);
        let Some(body) = &info.body else {
            return Err(undefined_function(name));
        };
        if args.len() != info.sig.params.len() {
            return Err(EvalError::new(EvalErrorKind::ArityMismatch {
                name: name.to_owned(),
                expected: info.sig.params.len(),
                got: args.len(),
            }));
        }
        if self.depth >= self.max_depth {
            return Err(EvalError::new(EvalErrorKind::RecursionLimit(self.max_depth)));
        }

        let mut frame = Frame::new(body.frame_size);
        for (slot, (arg, ty)) in args.into_iter().zip(&info.sig.params).enumerate() {
            let slot = LocalId(u32::try_from(slot).unwrap_or(u32::MAX));
            frame.set(slot, arg.convert(ty)?)?;
        }

        self.depth += 1;
        let flow = ensure_sufficient_stack(|| self.exec_block(&body.stmts, &mut frame));
        self.depth -= 1;

        if info.sig.ret.is_void() {
            flow?;
            return Ok(Value::Void);
        }
        match flow? {
            Flow::Return(value) => value.convert(&info.sig.ret),
            Flow::Normal | Flow::Break | Flow::Continue => Ok(Value::zero_of(&info.sig.ret)),
        }
    }

    /// Declared type of a global variable.
    fn global_type(&self, id: DeclId) -> Result<&'a Type, EvalError> {
        let ctx = self.ctx;
        match ctx.decl(id).map(|d| &d.kind) {
            Some(DeclKind::Variable(info)) => Ok(&info.ty),
            _ => Err(internal(format!("{id:?} is not a variable"))),
        }
    }
}

#[cfg(test)]
mod tests;
