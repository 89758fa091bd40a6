//! Storage for translation-unit variables.

use cinder_ir::{DeclId, Type};
use rustc_hash::FxHashMap;

use crate::Value;

/// Current values of global variables, keyed by declaration.
///
/// A global that was never assigned (declared by a declarations-only
/// increment, or by a wrapped increment whose run failed before reaching
/// its initializer) reads as the zero of its type.
#[derive(Clone, Debug, Default)]
pub struct Globals {
    values: FxHashMap<DeclId, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DeclId, ty: &Type) -> Value {
        self.values
            .get(&id)
            .copied()
            .unwrap_or_else(|| Value::zero_of(ty))
    }

    pub fn is_set(&self, id: DeclId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn set(&mut self, id: DeclId, value: Value) {
        self.values.insert(id, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
