//! Statement (command) nodes.

use triangle_core::Span;

use crate::{Decl, Expr, Identifier};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// An expression evaluated for effect, usually a procedure call
    Expr(ExprStmt<'ast>),
    /// `V := E`
    Assign(&'ast AssignStmt<'ast>),
    /// `if E then C else C`, either branch optional
    If(&'ast IfStmt<'ast>),
    /// `let D in C`
    Let(&'ast LetStmt<'ast>),
    /// `while E do C`
    While(&'ast WhileStmt<'ast>),
    /// `loop C1 while E do C2`
    LoopWhile(&'ast LoopWhileStmt<'ast>),
    /// `repeat C until E`
    RepeatUntil(&'ast RepeatStmt<'ast>),
    /// `repeat C while E`
    RepeatWhile(&'ast RepeatStmt<'ast>),
    /// `begin C1; C2; ... end`
    Block(Block<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::Assign(s) => s.span,
            Self::If(s) => s.span,
            Self::Let(s) => s.span,
            Self::While(s) => s.span,
            Self::LoopWhile(s) => s.span,
            Self::RepeatUntil(s) => s.span,
            Self::RepeatWhile(s) => s.span,
            Self::Block(s) => s.span,
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression
    pub expr: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    /// Storage being written
    pub target: Identifier<'ast>,
    /// New value
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition
    pub condition: Expr<'ast>,
    /// Then branch
    pub then_stmt: Option<&'ast Stmt<'ast>>,
    /// Else branch
    pub else_stmt: Option<&'ast Stmt<'ast>>,
    /// Source location
    pub span: Span,
}

/// A let statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetStmt<'ast> {
    /// Declarations, in order
    pub decls: &'ast [Decl<'ast>],
    /// Body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A pre-tested loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    /// Condition
    pub condition: Expr<'ast>,
    /// Body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A mid-tested loop: `before` always runs, `after` only when the
/// condition holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopWhileStmt<'ast> {
    /// Runs before each test
    pub before: Stmt<'ast>,
    /// Condition
    pub condition: Expr<'ast>,
    /// Runs after a successful test
    pub after: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A post-tested loop; shared by `repeat ... until` and `repeat ... while`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatStmt<'ast> {
    /// Body
    pub body: Stmt<'ast>,
    /// Condition
    pub condition: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A block of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in the block
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}
