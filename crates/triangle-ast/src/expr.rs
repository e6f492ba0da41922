//! Expression nodes.
//!
//! Every expression and every identifier carries the type semantic analysis
//! resolved for it; the code generator reads sizes from these annotations
//! and never infers anything itself.

use triangle_core::{RuntimeType, Span};

use crate::{BinaryOp, Decl, Ident, Stmt, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer, character, boolean, array or record literal
    Literal(LiteralExpr<'ast>),
    /// Value of a variable, constant, element or field
    Ident(Identifier<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Function or procedure call
    Call(&'ast CallExpr<'ast>),
    /// `if E then E else E`
    If(&'ast IfExpr<'ast>),
    /// `let D in E`
    Let(&'ast LetExpr<'ast>),
    /// Commands followed by a result expression
    Sequence(&'ast SequenceExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// The resolved type of this expression.
    pub fn ty(&self) -> RuntimeType<'ast> {
        match self {
            Self::Literal(e) => e.ty,
            Self::Ident(e) => e.ty(),
            Self::Binary(e) => e.ty,
            Self::Unary(e) => e.ty,
            Self::Call(e) => e.ty,
            Self::If(e) => e.ty,
            Self::Let(e) => e.ty,
            Self::Sequence(e) => e.result.ty(),
        }
    }

    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span(),
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::If(e) => e.span,
            Self::Let(e) => e.span,
            Self::Sequence(e) => e.span,
        }
    }

    /// The integer value, if this is an integer literal.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Literal(LiteralExpr {
                kind: LiteralKind::Int(value),
                ..
            }) => Some(*value),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Literal(LiteralExpr {
                kind: LiteralKind::Bool(value),
                ..
            }) => Some(*value),
            _ => None,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Resolved type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i32),
    /// Character literal
    Char(char),
    /// `true` or `false`
    Bool(bool),
    /// `[e1, e2, ...]`
    Array(&'ast [Expr<'ast>]),
    /// `{f1 ~ e1, f2 ~ e2, ...}` in field declaration order
    Record(&'ast [FieldInit<'ast>]),
}

/// One field of a record literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInit<'ast> {
    /// Field name
    pub name: Ident<'ast>,
    /// Field value
    pub value: Expr<'ast>,
}

/// A reference to storage: a name, an array element, or a record field.
///
/// Appears as a value (in [`Expr::Ident`]), as an assignment target, and as
/// a var argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Identifier<'ast> {
    /// `x`
    Basic(BasicIdent<'ast>),
    /// `a[i]`
    Subscript(&'ast ArraySubscript<'ast>),
    /// `r.f`
    Field(&'ast RecordAccess<'ast>),
}

impl<'ast> Identifier<'ast> {
    /// The resolved type of the referenced storage.
    pub fn ty(&self) -> RuntimeType<'ast> {
        match self {
            Self::Basic(id) => id.ty,
            Self::Subscript(id) => id.ty,
            Self::Field(id) => id.ty,
        }
    }

    /// Get the span of this identifier.
    pub fn span(&self) -> Span {
        match self {
            Self::Basic(id) => id.ident.span,
            Self::Subscript(id) => id.span,
            Self::Field(id) => id.span,
        }
    }

    /// The declared name at the root of an access chain.
    pub fn root(&self) -> Ident<'ast> {
        match self {
            Self::Basic(id) => id.ident,
            Self::Subscript(id) => id.array.root(),
            Self::Field(id) => id.record.root(),
        }
    }
}

/// A plain name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicIdent<'ast> {
    /// The name
    pub ident: Ident<'ast>,
    /// Resolved type
    pub ty: RuntimeType<'ast>,
}

/// An array element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArraySubscript<'ast> {
    /// The array being indexed
    pub array: Identifier<'ast>,
    /// Index expression
    pub index: Expr<'ast>,
    /// Element type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// A record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordAccess<'ast> {
    /// The record being accessed
    pub record: Identifier<'ast>,
    /// Field name
    pub field: Ident<'ast>,
    /// Field type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Operator
    pub op: BinaryOp,
    /// Left operand
    pub left: Expr<'ast>,
    /// Right operand
    pub right: Expr<'ast>,
    /// Result type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: Expr<'ast>,
    /// Result type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// A routine call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// The routine name
    pub callee: Ident<'ast>,
    /// Actual arguments, one per formal parameter
    pub args: &'ast [Arg<'ast>],
    /// Result type (`Void` for procedures)
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// An actual argument. The variant matches the kind of the formal parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'ast> {
    /// Passed by value
    Value(Expr<'ast>),
    /// `var V`, passed by reference
    Var(Identifier<'ast>),
    /// `func f` / `proc p`, passed as a closure
    Func(Ident<'ast>),
}

impl<'ast> Arg<'ast> {
    /// Words the argument occupies on the stack.
    pub fn size(&self) -> u32 {
        match self {
            Arg::Value(expr) => expr.ty().size(),
            Arg::Var(_) => 1,
            Arg::Func(_) => RuntimeType::CLOSURE_SIZE,
        }
    }
}

/// `if C then E1 else E2`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfExpr<'ast> {
    /// Condition
    pub condition: Expr<'ast>,
    /// Value when true
    pub then_expr: Expr<'ast>,
    /// Value when false
    pub else_expr: Expr<'ast>,
    /// Result type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// `let D in E`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetExpr<'ast> {
    /// Declarations, in order
    pub decls: &'ast [Decl<'ast>],
    /// Body
    pub body: Expr<'ast>,
    /// Result type
    pub ty: RuntimeType<'ast>,
    /// Source location
    pub span: Span,
}

/// Commands run for effect, then a result expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceExpr<'ast> {
    /// Commands, in order
    pub stmts: &'ast [Stmt<'ast>],
    /// Result
    pub result: Expr<'ast>,
    /// Source location
    pub span: Span,
}
