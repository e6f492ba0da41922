//! Lowering of a typed program tree to TAM instructions.
//!
//! The [`CodeGenerator`] walks the tree once, depth first, appending
//! instructions as it goes. It owns everything the walk mutates: the
//! [`Scope`] with both namespaces, the instruction emitter with its label
//! counter, and the diagnostics collected along the way. Nothing is shared
//! between two generators.
//!
//! The lowering is split by syntactic category:
//! - `stmt` - commands and control flow
//! - `expr` - expressions, literals and operators
//! - `identifier` - addresses, loads and stores
//! - `decl` - declarations, routine bodies and parameter layout
//! - `call` - argument passing and the three call forms
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use triangle_ast::{AstBuilder, BinaryOp, types};
//! use triangle_compiler::bytecode::{Instruction, Primitive};
//! use triangle_compiler::codegen::generate;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let sum = b.binary(BinaryOp::Add, b.int(1), b.int(2), types::INTEGER);
//! let program = b.program(b.expr_stmt(sum));
//!
//! let unit = generate(&program).unwrap();
//! assert_eq!(
//!     unit.instructions,
//!     vec![
//!         Instruction::LoadL(1),
//!         Instruction::LoadL(2),
//!         Instruction::CallPrimitive(Primitive::Add),
//!         Instruction::Halt,
//!     ]
//! );
//! ```

mod call;
mod decl;
mod expr;
mod identifier;
mod stmt;

use std::fmt;

use tracing::{debug, warn};
use triangle_ast::{Ident, Program, Stmt};
use triangle_core::{CompilationError, Span};

use crate::bytecode::{Address, Instruction, Register};
use crate::emit::InstructionEmitter;
use crate::scope::{FrameKind, Scope};
use crate::std_env;

pub use decl::LINK_DATA_SIZE;

type Result<T> = std::result::Result<T, CompilationError>;

// ============================================================================
// Output
// ============================================================================

/// The result of generating code for one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledUnit {
    /// The instruction sequence, ending in `HALT`.
    pub instructions: Vec<Instruction>,
    /// Non-fatal problems found while generating.
    pub diagnostics: Vec<CompilationError>,
}

impl CompiledUnit {
    /// Whether generation completed without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            match instruction {
                Instruction::Label(_) => writeln!(f, "{instruction}")?,
                _ => writeln!(f, "    {instruction}")?,
            }
        }
        Ok(())
    }
}

/// Generate code for `program` with a fresh generator.
pub fn generate(program: &Program<'_>) -> Result<CompiledUnit> {
    CodeGenerator::new().generate(program)
}

// ============================================================================
// CodeGenerator
// ============================================================================

/// Translates one program into an instruction sequence.
#[derive(Debug)]
pub struct CodeGenerator {
    /// Names visible at the current point of the walk
    scope: Scope,

    /// Output buffer and label source
    emitter: InstructionEmitter,

    /// Non-fatal problems, in the order found
    diagnostics: Vec<CompilationError>,
}

impl CodeGenerator {
    /// Create a generator whose outermost frame holds the standard
    /// environment.
    pub fn new() -> Self {
        let mut scope = Scope::new();
        std_env::install(&mut scope);
        Self {
            scope,
            emitter: InstructionEmitter::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Generate the whole program, terminated by `HALT`.
    ///
    /// A program that is a single expression statement leaves its value on
    /// the stack for the machine to report; everywhere else expression
    /// results are discarded.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program<'_>) -> Result<CompiledUnit> {
        debug!(span = %program.span, "generating program");

        match &program.command {
            Stmt::Expr(stmt) => self.compile_expr(&stmt.expr)?,
            command => self.compile_stmt(command)?,
        }
        self.emitter.emit(Instruction::Halt);

        let labels = self.emitter.labels_allocated();
        let instructions = self.emitter.finish();
        debug!(
            instructions = instructions.len(),
            labels,
            diagnostics = self.diagnostics.len(),
            "generated program"
        );
        Ok(CompiledUnit {
            instructions,
            diagnostics: self.diagnostics,
        })
    }

    // ========================================================================
    // Scoped helpers
    // ========================================================================

    /// Run `f` inside a new frame. The frame is closed whether or not `f`
    /// succeeds.
    fn with_scope<T>(
        &mut self,
        kind: FrameKind,
        next_offset: i32,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.scope.enter(kind, next_offset);
        let result = f(self);
        self.scope.exit();
        result
    }

    /// Run `f` with `words` of temporaries sitting on top of the current
    /// frame, so anything `f` allocates lands above them.
    fn with_temporary<T>(
        &mut self,
        words: u32,
        span: Span,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.scope.allocate(words, span)?;
        let result = f(self);
        self.scope.set_next_offset(saved);
        result
    }

    // ========================================================================
    // Addressing
    // ========================================================================

    /// The display register for a binding `depth` levels out.
    ///
    /// References beyond the deepest register are reported and addressed
    /// through it anyway.
    fn display(&mut self, name: &Ident<'_>, depth: usize) -> Register {
        match Register::for_depth(depth) {
            Some(register) => register,
            None => {
                warn!(
                    name = name.name,
                    depth,
                    limit = Register::MAX_DEPTH,
                    "nesting restriction exceeded"
                );
                self.diagnostics
                    .push(CompilationError::NestingRestrictionExceeded {
                        name: name.name.to_string(),
                        depth,
                        limit: Register::MAX_DEPTH,
                        span: name.span,
                    });
                Register::deepest()
            }
        }
    }

    /// The address of displacement `offset` in the frame `depth` levels out.
    fn frame_address(&mut self, name: &Ident<'_>, depth: usize, offset: i32) -> Address {
        Address::new(self.display(name, depth), offset)
    }
}

/// `words` as a signed displacement or immediate.
fn displacement(words: u32, span: Span) -> Result<i32> {
    i32::try_from(words).map_err(|_| CompilationError::frame_overflow(words, span))
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
