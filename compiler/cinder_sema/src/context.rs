//! The persistent compilation context.

use std::path::{Path, PathBuf};

use cinder_ir::{Decl, DeclId, DeclKind, DeclLookup, DeclRange, Name};
use cinder_parse::TypeNames;
use rustc_hash::FxHashMap;

use crate::pending::StagedIncrement;

/// Snapshot of the context's shape, taken before a compile attempt.
///
/// Two marks are equal exactly when no commit happened in between.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ContextMark {
    pub decls: usize,
    pub generation: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum CommitError {
    #[error("staged increment was built against {staged:?} but the context is at {current:?}")]
    StaleIncrement {
        staged: ContextMark,
        current: ContextMark,
    },
    #[error("staged declaration {found:?} is out of sequence (expected {expected:?})")]
    OutOfSequence { expected: DeclId, found: DeclId },
}

/// Every declaration committed in this session, with the name bindings,
/// prototype links and include state that later increments compile against.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct CompilationContext {
    decls: Vec<Decl>,
    bindings: FxHashMap<Name, DeclId>,
    /// Prototype → the definition that completed it.
    definitions: FxHashMap<DeclId, DeclId>,
    /// Included file → fingerprint of the content last compiled.
    includes: FxHashMap<PathBuf, u64>,
    generation: u64,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn mark(&self) -> ContextMark {
        ContextMark {
            decls: self.decls.len(),
            generation: self.generation,
        }
    }

    /// Id the next committed declaration will receive.
    pub fn next_id(&self) -> DeclId {
        DeclId::from_index(self.decls.len())
    }

    /// The declaration a name is currently bound to.
    pub fn lookup(&self, name: Name) -> Option<DeclId> {
        self.bindings.get(&name).copied()
    }

    /// Follow prototype → definition links to the body that a call reaches.
    pub fn resolve_definition(&self, mut id: DeclId) -> DeclId {
        while let Some(&next) = self.definitions.get(&id) {
            id = next;
        }
        id
    }

    pub fn definition_of(&self, prototype: DeclId) -> Option<DeclId> {
        self.definitions.get(&prototype).copied()
    }

    /// Declarations in `range`; ids past the end are ignored.
    pub fn decls_in(&self, range: DeclRange) -> &[Decl] {
        let end = range.end.index().min(self.decls.len());
        let start = range.start.index().min(end);
        &self.decls[start..end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decl> {
        self.decls.iter()
    }

    pub fn include_fingerprint(&self, path: &Path) -> Option<u64> {
        self.includes.get(path).copied()
    }

    pub fn includes(&self) -> impl Iterator<Item = (&Path, u64)> {
        self.includes.iter().map(|(p, f)| (p.as_path(), *f))
    }

    /// Append a staged increment, returning the range of ids it occupies.
    ///
    /// Fails without touching the context when the increment was staged
    /// against another state or its ids do not continue the arena.
    #[tracing::instrument(level = "debug", skip_all, fields(decls = staged.decls.len()))]
    pub fn commit(&mut self, staged: StagedIncrement) -> Result<DeclRange, CommitError> {
        let current = self.mark();
        if staged.base != current {
            return Err(CommitError::StaleIncrement {
                staged: staged.base,
                current,
            });
        }
        for (offset, decl) in staged.decls.iter().enumerate() {
            let expected = DeclId::from_index(self.decls.len() + offset);
            if decl.id != expected {
                return Err(CommitError::OutOfSequence {
                    expected,
                    found: decl.id,
                });
            }
        }

        let start = self.next_id();
        self.decls.extend(staged.decls);
        self.bindings.extend(staged.bindings);
        self.definitions.extend(staged.definitions);
        self.includes.extend(staged.includes);
        self.generation += 1;
        Ok(DeclRange::new(start, self.next_id()))
    }
}

impl DeclLookup for CompilationContext {
    fn decl(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }
}

impl TypeNames for CompilationContext {
    fn is_type_name(&self, name: Name) -> bool {
        self.lookup(name)
            .and_then(|id| self.decl(id))
            .is_some_and(|d| matches!(d.kind, DeclKind::Enum { .. } | DeclKind::Typedef(_)))
    }
}

#[cfg(test)]
mod tests;
