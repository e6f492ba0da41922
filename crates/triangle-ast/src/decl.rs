//! Declaration and formal parameter nodes.

use triangle_core::{RuntimeType, Span};

use crate::{Expr, Ident, Stmt};

/// A declaration inside a `let`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    /// `const c ~ E`
    Const(ConstDecl<'ast>),
    /// `var v : T`
    Var(VarDecl<'ast>),
    /// `func f(...) : T ~ E`
    Func(&'ast FuncDecl<'ast>),
    /// `proc p(...) ~ C`
    Proc(&'ast ProcDecl<'ast>),
    /// `type t ~ T`
    Type(TypeDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    /// The declared name.
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Self::Const(d) => d.name,
            Self::Var(d) => d.name,
            Self::Func(d) => d.name,
            Self::Proc(d) => d.name,
            Self::Type(d) => d.name,
        }
    }

    /// Get the span of this declaration.
    pub fn span(&self) -> Span {
        match self {
            Self::Const(d) => d.span,
            Self::Var(d) => d.span,
            Self::Func(d) => d.span,
            Self::Proc(d) => d.span,
            Self::Type(d) => d.span,
        }
    }
}

/// A constant declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstDecl<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// Value
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// Resolved type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// A function declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncDecl<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// Formal parameters
    pub params: &'ast [Param<'ast>],
    /// Result type
    pub ret: RuntimeType<'ast>,
    /// Body
    pub body: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A procedure declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcDecl<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// Formal parameters
    pub params: &'ast [Param<'ast>],
    /// Body
    pub body: Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A type declaration. Uses of the name were expanded by semantic analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDecl<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// Resolved type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param<'ast> {
    /// `x : T`
    Value(ValueParam<'ast>),
    /// `var x : T`
    Var(ValueParam<'ast>),
    /// `func f(...) : T` or `proc p(...)`
    Func(&'ast FuncParam<'ast>),
}

impl<'ast> Param<'ast> {
    /// The parameter name.
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Self::Value(p) | Self::Var(p) => p.name,
            Self::Func(p) => p.name,
        }
    }

    /// Words the corresponding argument occupies on the stack.
    pub fn size(&self) -> u32 {
        match self {
            Self::Value(p) => p.ty.size(),
            Self::Var(_) => 1,
            Self::Func(_) => RuntimeType::CLOSURE_SIZE,
        }
    }
}

/// A value or var parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueParam<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// Resolved type
    pub ty: RuntimeType<'ast>,
}

/// A routine parameter. Procedure parameters return `Void`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuncParam<'ast> {
    /// Name
    pub name: Ident<'ast>,
    /// The routine's own formal parameters
    pub params: &'ast [Param<'ast>],
    /// Result type
    pub ret: RuntimeType<'ast>,
}

/// Total words of a parameter list, saturating at `u32::MAX`.
pub fn params_size(params: &[Param<'_>]) -> u32 {
    params.iter().fold(0u32, |total, p| total.saturating_add(p.size()))
}
