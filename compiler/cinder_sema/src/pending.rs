//! Staged declarations of one compile attempt.

use std::path::{Path, PathBuf};

use cinder_ir::{Decl, DeclId, DeclKind, DeclLookup, Name, Span};
use cinder_parse::TypeNames;
use rustc_hash::FxHashMap;

use crate::context::{CompilationContext, ContextMark};

/// Overlay over a [`CompilationContext`] collecting one increment's
/// declarations. Lookups consult the overlay first.
///
/// Dropping a pending increment discards everything it staged.
pub struct PendingIncrement<'ctx> {
    ctx: &'ctx CompilationContext,
    base: ContextMark,
    decls: Vec<Decl>,
    bindings: FxHashMap<Name, DeclId>,
    definitions: Vec<(DeclId, DeclId)>,
    includes: Vec<(PathBuf, u64)>,
}

/// A finished pending increment, detached from the context borrow so the
/// caller can commit it.
#[derive(Clone, PartialEq, Debug)]
pub struct StagedIncrement {
    pub(crate) base: ContextMark,
    pub(crate) decls: Vec<Decl>,
    pub(crate) bindings: Vec<(Name, DeclId)>,
    pub(crate) definitions: Vec<(DeclId, DeclId)>,
    pub(crate) includes: Vec<(PathBuf, u64)>,
}

impl StagedIncrement {
    pub fn base(&self) -> ContextMark {
        self.base
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    /// Nothing to commit (no declarations and no include records).
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty() && self.includes.is_empty()
    }
}

impl<'ctx> PendingIncrement<'ctx> {
    pub fn new(ctx: &'ctx CompilationContext) -> Self {
        PendingIncrement {
            ctx,
            base: ctx.mark(),
            decls: Vec::new(),
            bindings: FxHashMap::default(),
            definitions: Vec::new(),
            includes: Vec::new(),
        }
    }

    pub fn context(&self) -> &'ctx CompilationContext {
        self.ctx
    }

    pub fn next_id(&self) -> DeclId {
        DeclId::from_index(self.ctx.len() + self.decls.len())
    }

    /// Was `id` staged by this increment (rather than committed earlier)?
    pub fn is_staged(&self, id: DeclId) -> bool {
        id.index() >= self.ctx.len()
    }

    pub fn lookup(&self, name: Name) -> Option<DeclId> {
        self.bindings
            .get(&name)
            .copied()
            .or_else(|| self.ctx.lookup(name))
    }

    pub fn push(&mut self, name: Name, span: Span, kind: DeclKind) -> DeclId {
        let id = self.next_id();
        self.decls.push(Decl {
            id,
            name,
            span,
            kind,
        });
        id
    }

    pub fn bind(&mut self, name: Name, id: DeclId) {
        self.bindings.insert(name, id);
    }

    /// Mutable access to a declaration staged by this increment.
    pub(crate) fn staged_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        let index = id.index().checked_sub(self.ctx.len())?;
        self.decls.get_mut(index)
    }

    pub fn link_definition(&mut self, prototype: DeclId, definition: DeclId) {
        self.definitions.push((prototype, definition));
    }

    pub fn include_fingerprint(&self, path: &Path) -> Option<u64> {
        self.includes
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, f)| *f)
            .or_else(|| self.ctx.include_fingerprint(path))
    }

    pub fn record_include(&mut self, path: PathBuf, fingerprint: u64) {
        self.includes.push((path, fingerprint));
    }

    pub fn staged(&self) -> &[Decl] {
        &self.decls
    }

    pub fn finish(self) -> StagedIncrement {
        StagedIncrement {
            base: self.base,
            decls: self.decls,
            bindings: self.bindings.into_iter().collect(),
            definitions: self.definitions,
            includes: self.includes,
        }
    }
}

impl DeclLookup for PendingIncrement<'_> {
    fn decl(&self, id: DeclId) -> Option<&Decl> {
        match id.index().checked_sub(self.ctx.len()) {
            Some(index) => self.decls.get(index),
            None => self.ctx.decl(id),
        }
    }
}

impl TypeNames for PendingIncrement<'_> {
    fn is_type_name(&self, name: Name) -> bool {
        self.lookup(name)
            .and_then(|id| self.decl(id))
            .is_some_and(|d| matches!(d.kind, DeclKind::Enum { .. } | DeclKind::Typedef(_)))
    }
}

#[cfg(test)]
mod tests;
