//! Per-increment compilation options.

use cinder_ir::WrapPolicy;
use cinder_sema::CheckOptions;

/// How one increment is compiled.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompileOptions {
    /// Pretty-print the committed declarations.
    pub print_ast: bool,
    pub wrap: WrapPolicy,
    /// Defer unresolved names to run time instead of rejecting them.
    pub dynamic_lookup: bool,
    /// Run the increment after committing it. Declarations-only when false.
    pub codegen: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            print_ast: false,
            wrap: WrapPolicy::Wrap,
            dynamic_lookup: false,
            codegen: true,
        }
    }
}

impl CompileOptions {
    /// Top-level declarations, executed on commit.
    pub fn raw() -> Self {
        CompileOptions {
            wrap: WrapPolicy::Raw,
            ..Self::default()
        }
    }

    /// Declarations only: compiled raw and never executed.
    pub fn declarations_only() -> Self {
        CompileOptions {
            codegen: false,
            ..Self::raw()
        }
    }

    #[must_use]
    pub fn with_wrap(mut self, wrap: WrapPolicy) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn with_dynamic_lookup(mut self, enabled: bool) -> Self {
        self.dynamic_lookup = enabled;
        self
    }

    #[must_use]
    pub fn with_print_ast(mut self, enabled: bool) -> Self {
        self.print_ast = enabled;
        self
    }

    /// The policy actually used; declarations-only implies raw.
    pub fn effective_wrap(&self) -> WrapPolicy {
        if self.codegen {
            self.wrap
        } else {
            WrapPolicy::Raw
        }
    }

    pub(crate) fn check_options(&self) -> CheckOptions {
        CheckOptions {
            dynamic_lookup: self.dynamic_lookup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations_only_forces_raw() {
        let options = CompileOptions::declarations_only().with_wrap(WrapPolicy::Wrap);
        assert_eq!(options.wrap, WrapPolicy::Wrap);
        assert_eq!(options.effective_wrap(), WrapPolicy::Raw);
        assert_eq!(CompileOptions::default().effective_wrap(), WrapPolicy::Wrap);
    }
}
