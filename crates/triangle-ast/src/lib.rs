//! Program tree for Triangle.
//!
//! The tree is what the parser and semantic analyzer hand to the back end:
//! every node lives in a [`bumpalo::Bump`] arena, is `Copy`, and every
//! expression and identifier already carries its resolved
//! [`RuntimeType`](triangle_core::RuntimeType).
//!
//! Recursive nodes are stored behind `&'ast` references, so each syntactic
//! category is a small closed enum that consumers match exhaustively.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use triangle_ast::{AstBuilder, BinaryOp, types};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // 1 + 2
//! let sum = b.binary(BinaryOp::Add, b.int(1), b.int(2), types::INTEGER);
//! let program = b.program(b.expr_stmt(sum));
//! assert!(matches!(program.command, triangle_ast::Stmt::Expr(_)));
//! ```

pub mod builder;
pub mod decl;
pub mod expr;
pub mod fold;
pub mod node;
pub mod ops;
pub mod stmt;
pub mod visitor;

pub use builder::{AstBuilder, types};
pub use decl::*;
pub use expr::*;
pub use fold::Folder;
pub use node::*;
pub use ops::*;
pub use stmt::*;
pub use visitor::Visitor;

use triangle_core::Span;

/// A whole compilation unit: one command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    /// The program body.
    pub command: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

impl<'ast> Program<'ast> {
    /// Wrap a command as a program.
    pub fn new(command: Stmt<'ast>, span: Span) -> Self {
        Self { command, span }
    }
}
