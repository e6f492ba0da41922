//! Compiler configuration.

use bitflags::bitflags;

bitflags! {
    /// Tree-to-tree passes run before code generation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Passes: u8 {
        /// Evaluate operators on literal operands and prune dead branches.
        const FOLD_CONSTANTS = 1 << 0;
        /// Move loop-invariant computations in front of their loop.
        const HOIST_INVARIANTS = 1 << 1;
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    /// Which optimisation passes to run. None by default.
    pub passes: Passes,
}

impl CompileOptions {
    /// Options with every optimisation pass enabled.
    pub fn optimized() -> Self {
        Self {
            passes: Passes::all(),
        }
    }

    /// Replace the pass set.
    pub fn with_passes(mut self, passes: Passes) -> Self {
        self.passes = passes;
        self
    }
}
