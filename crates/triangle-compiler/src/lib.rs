//! Triangle back end: name resolution and TAM code generation.
//!
//! ## Architecture
//!
//! A type-annotated [`Program`](triangle_ast::Program) goes through optional
//! tree-to-tree [`passes`], then a single [`CodeGenerator`] walk that
//! resolves every name against the [`Scope`] and appends
//! [`Instruction`]s to a flat sequence ending in `HALT`.
//!
//! ## Modules
//!
//! - [`bytecode`]: TAM instructions, addresses, labels and primitives
//! - [`emit`]: instruction buffer and label allocation
//! - [`scope`]: the two-namespace scope table
//! - [`std_env`]: the predeclared environment and operator primitives
//! - [`codegen`]: tree-to-instruction lowering
//! - [`passes`]: constant folding and loop-invariant hoisting
//! - [`options`]: compiler configuration

pub mod bytecode;
pub mod codegen;
pub mod emit;
pub mod options;
pub mod passes;
pub mod scope;
pub mod std_env;

pub use bytecode::{Address, Instruction, Label, LabelAllocator, Primitive, Register};
pub use codegen::{CodeGenerator, CompiledUnit, generate};
pub use emit::InstructionEmitter;
pub use options::{CompileOptions, Passes};
pub use passes::optimize;
pub use scope::{FrameKind, Resolved, RoutineBinding, Scope, ScopeTable, VarBinding};

// Re-export CompilationError from core for convenience
pub use triangle_core::CompilationError;
