//! Triangle back end.
//!
//! Takes a type-annotated Triangle program tree and produces TAM
//! instructions. The heavy lifting lives in the workspace crates; this crate
//! ties them together behind [`compile`].
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use triangle::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // let var x: Integer in x := 5
//! let body = b.assign(b.name("x", types::INTEGER), b.int(5));
//! let program = b.program(b.let_stmt(&[b.var_decl("x", types::INTEGER)], body));
//!
//! let unit = compile(&arena, &program, CompileOptions::default()).unwrap();
//! assert_eq!(unit.instructions.last(), Some(&Instruction::Halt));
//! println!("{unit}");
//! ```

use bumpalo::Bump;
use tracing::debug;

pub use triangle_ast as ast;
pub use triangle_compiler as compiler;
pub use triangle_core as core;

use triangle_ast::Program;
use triangle_compiler::{CompileOptions, CompiledUnit, optimize};
use triangle_core::CompilationError;

pub mod prelude {
    pub use crate::compile;
    pub use triangle_ast::{AstBuilder, BinaryOp, Program, UnaryOp, types};
    pub use triangle_compiler::{
        CompileOptions, CompiledUnit, Instruction, Passes, Primitive, Register,
    };
    pub use triangle_core::{CompilationError, RuntimeType, Span};
}

/// Optimise `program` as `options` asks, then generate its code.
///
/// Nodes created by the passes are allocated in `arena`, which must be the
/// arena the program lives in (or outlive it).
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile<'ast>(
    arena: &'ast Bump,
    program: &Program<'ast>,
    options: CompileOptions,
) -> Result<CompiledUnit, CompilationError> {
    debug!(passes = ?options.passes, "compiling");
    let program = optimize(arena, program, options.passes);
    triangle_compiler::generate(&program)
}
