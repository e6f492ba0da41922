//! Optional tree-to-tree optimisations.
//!
//! Each pass is a pure function from a program to a new program allocated in
//! the same arena; the input is never modified. Passes run before code
//! generation and are selected with [`Passes`].

mod fold;
mod fresh;
mod hoist;

pub use fold::ConstantFolder;
pub use fresh::{FRESH_PREFIX, FreshNames};
pub use hoist::InvariantHoister;

use bumpalo::Bump;
use tracing::debug;
use triangle_ast::{Folder, Program};

use crate::options::Passes;

/// Run the selected passes over `program`: folding first, then hoisting.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn optimize<'ast>(arena: &'ast Bump, program: &Program<'ast>, passes: Passes) -> Program<'ast> {
    let mut program = *program;

    if passes.contains(Passes::FOLD_CONSTANTS) {
        let mut folder = ConstantFolder::new(arena);
        program = folder.fold_program(&program);
        debug!(folded = folder.folded(), "constant folding done");
    }

    if passes.contains(Passes::HOIST_INVARIANTS) {
        let mut hoister = InvariantHoister::new(arena);
        program = hoister.hoist_program(&program);
        debug!(hoisted = hoister.hoisted(), "invariant hoisting done");
    }

    program
}
