//! Convenience constructors for typed trees.
//!
//! [`AstBuilder`] allocates nodes in an arena and fills in the derived type
//! annotations (element and field types, branch result types) so that a
//! parser front end, a tree transform or a test can build well-typed trees
//! without repeating the bookkeeping. Spans default to `Span::default()`;
//! callers that track positions can patch the returned nodes.

use bumpalo::Bump;
use triangle_core::{RecordField, RuntimeType, Span};

use crate::{
    Arg, ArraySubscript, AssignStmt, BasicIdent, BinaryExpr, BinaryOp, Block, CallExpr,
    ConstDecl, Decl, Expr, ExprStmt, FieldInit, FuncDecl, FuncParam, Ident, Identifier, IfExpr,
    IfStmt, LetExpr, LetStmt, LiteralExpr, LiteralKind, LoopWhileStmt, Param, ProcDecl, Program,
    RecordAccess, RepeatStmt, SequenceExpr, Stmt, TypeDecl, UnaryExpr, UnaryOp, ValueParam,
    VarDecl, WhileStmt,
};

/// The primitive types, usable with any arena lifetime.
pub mod types {
    use triangle_core::RuntimeType;

    /// `Integer`
    pub const INTEGER: RuntimeType<'static> = RuntimeType::Integer;
    /// `Boolean`
    pub const BOOLEAN: RuntimeType<'static> = RuntimeType::Boolean;
    /// `Char`
    pub const CHAR: RuntimeType<'static> = RuntimeType::Character;
    /// The result of a procedure
    pub const VOID: RuntimeType<'static> = RuntimeType::Void;
}

/// Allocates program tree nodes in an arena.
#[derive(Clone, Copy)]
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder over `arena`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self { arena }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// `array len of elem`
    pub fn array_type(&self, len: u32, elem: RuntimeType<'ast>) -> RuntimeType<'ast> {
        RuntimeType::Array {
            len,
            elem: self.arena.alloc(elem),
        }
    }

    /// `record f1: T1, ... end`
    pub fn record_type(&self, fields: &[(&str, RuntimeType<'ast>)]) -> RuntimeType<'ast> {
        let fields: Vec<RecordField<'ast>> = fields
            .iter()
            .map(|(name, ty)| RecordField::new(self.arena.alloc_str(name), *ty))
            .collect();
        RuntimeType::Record(self.arena.alloc_slice_copy(&fields))
    }

    /// The type of a routine taking `params` and returning `ret`.
    pub fn func_type(&self, params: &[RuntimeType<'ast>], ret: RuntimeType<'ast>) -> RuntimeType<'ast> {
        RuntimeType::Func {
            params: self.arena.alloc_slice_copy(params),
            ret: self.arena.alloc(ret),
        }
    }

    // ==========================================================================
    // Names and storage references
    // ==========================================================================

    /// A name.
    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), Span::default())
    }

    /// A plain variable or constant reference.
    pub fn name(&self, name: &str, ty: RuntimeType<'ast>) -> Identifier<'ast> {
        Identifier::Basic(BasicIdent {
            ident: self.ident(name),
            ty,
        })
    }

    /// `array[index]`; the element type comes from the array's type.
    pub fn subscript(&self, array: Identifier<'ast>, index: Expr<'ast>) -> Identifier<'ast> {
        let ty = array.ty().element().unwrap_or(RuntimeType::Void);
        Identifier::Subscript(self.arena.alloc(ArraySubscript {
            array,
            index,
            ty,
            span: Span::default(),
        }))
    }

    /// `record.field`; the field type comes from the record's type.
    pub fn field(&self, record: Identifier<'ast>, field: &str) -> Identifier<'ast> {
        let ty = record
            .ty()
            .field(field)
            .map(|(_, ty)| ty)
            .unwrap_or(RuntimeType::Void);
        Identifier::Field(self.arena.alloc(RecordAccess {
            record,
            field: self.ident(field),
            ty,
            span: Span::default(),
        }))
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn literal(&self, kind: LiteralKind<'ast>, ty: RuntimeType<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            ty,
            span: Span::default(),
        })
    }

    /// Integer literal.
    pub fn int(&self, value: i32) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value), RuntimeType::Integer)
    }

    /// Character literal.
    pub fn char(&self, value: char) -> Expr<'ast> {
        self.literal(LiteralKind::Char(value), RuntimeType::Character)
    }

    /// Boolean literal.
    pub fn bool(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value), RuntimeType::Boolean)
    }

    /// Array literal of the given element type.
    pub fn array_lit(&self, elem: RuntimeType<'ast>, elements: &[Expr<'ast>]) -> Expr<'ast> {
        let ty = self.array_type(elements.len() as u32, elem);
        self.literal(LiteralKind::Array(self.arena.alloc_slice_copy(elements)), ty)
    }

    /// Record literal; the record type is built from the field values.
    pub fn record_lit(&self, fields: &[(&str, Expr<'ast>)]) -> Expr<'ast> {
        let field_types: Vec<(&str, RuntimeType<'ast>)> =
            fields.iter().map(|(name, value)| (*name, value.ty())).collect();
        let ty = self.record_type(&field_types);
        let inits: Vec<FieldInit<'ast>> = fields
            .iter()
            .map(|(name, value)| FieldInit {
                name: self.ident(name),
                value: *value,
            })
            .collect();
        self.literal(LiteralKind::Record(self.arena.alloc_slice_copy(&inits)), ty)
    }

    /// The value of a plain name.
    pub fn var(&self, name: &str, ty: RuntimeType<'ast>) -> Expr<'ast> {
        Expr::Ident(self.name(name, ty))
    }

    /// The value stored at `id`.
    pub fn value(&self, id: Identifier<'ast>) -> Expr<'ast> {
        Expr::Ident(id)
    }

    /// Binary operation.
    pub fn binary(
        &self,
        op: BinaryOp,
        left: Expr<'ast>,
        right: Expr<'ast>,
        ty: RuntimeType<'ast>,
    ) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            op,
            left,
            right,
            ty,
            span: Span::default(),
        }))
    }

    /// Unary operation.
    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>, ty: RuntimeType<'ast>) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand,
            ty,
            span: Span::default(),
        }))
    }

    /// Call of the routine `callee`.
    pub fn call(&self, callee: &str, args: &[Arg<'ast>], ty: RuntimeType<'ast>) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            callee: self.ident(callee),
            args: self.arena.alloc_slice_copy(args),
            ty,
            span: Span::default(),
        }))
    }

    /// A routine passed as an argument.
    pub fn func_arg(&self, name: &str) -> Arg<'ast> {
        Arg::Func(self.ident(name))
    }

    /// `if c then t else e`
    pub fn if_expr(&self, condition: Expr<'ast>, then_expr: Expr<'ast>, else_expr: Expr<'ast>) -> Expr<'ast> {
        Expr::If(self.arena.alloc(IfExpr {
            condition,
            then_expr,
            else_expr,
            ty: then_expr.ty(),
            span: Span::default(),
        }))
    }

    /// `let decls in body`
    pub fn let_expr(&self, decls: &[Decl<'ast>], body: Expr<'ast>) -> Expr<'ast> {
        Expr::Let(self.arena.alloc(LetExpr {
            decls: self.arena.alloc_slice_copy(decls),
            body,
            ty: body.ty(),
            span: Span::default(),
        }))
    }

    /// Commands followed by a result.
    pub fn sequence(&self, stmts: &[Stmt<'ast>], result: Expr<'ast>) -> Expr<'ast> {
        Expr::Sequence(self.arena.alloc(SequenceExpr {
            stmts: self.arena.alloc_slice_copy(stmts),
            result,
            span: Span::default(),
        }))
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    /// Expression evaluated for effect.
    pub fn expr_stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr,
            span: Span::default(),
        })
    }

    /// `target := value`
    pub fn assign(&self, target: Identifier<'ast>, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Assign(self.arena.alloc(AssignStmt {
            target,
            value,
            span: Span::default(),
        }))
    }

    /// `if c then t else e` with either branch optional.
    pub fn if_stmt(
        &self,
        condition: Expr<'ast>,
        then_stmt: Option<Stmt<'ast>>,
        else_stmt: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        let then_stmt = then_stmt.map(|s| &*self.arena.alloc(s));
        let else_stmt = else_stmt.map(|s| &*self.arena.alloc(s));
        Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: Span::default(),
        }))
    }

    /// `let decls in body`
    pub fn let_stmt(&self, decls: &[Decl<'ast>], body: Stmt<'ast>) -> Stmt<'ast> {
        Stmt::Let(self.arena.alloc(LetStmt {
            decls: self.arena.alloc_slice_copy(decls),
            body,
            span: Span::default(),
        }))
    }

    /// `while c do body`
    pub fn while_stmt(&self, condition: Expr<'ast>, body: Stmt<'ast>) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: Span::default(),
        }))
    }

    /// `loop before while c do after`
    pub fn loop_while(&self, before: Stmt<'ast>, condition: Expr<'ast>, after: Stmt<'ast>) -> Stmt<'ast> {
        Stmt::LoopWhile(self.arena.alloc(LoopWhileStmt {
            before,
            condition,
            after,
            span: Span::default(),
        }))
    }

    fn repeat(&self, body: Stmt<'ast>, condition: Expr<'ast>) -> &'ast RepeatStmt<'ast> {
        self.arena.alloc(RepeatStmt {
            body,
            condition,
            span: Span::default(),
        })
    }

    /// `repeat body until c`
    pub fn repeat_until(&self, body: Stmt<'ast>, condition: Expr<'ast>) -> Stmt<'ast> {
        Stmt::RepeatUntil(self.repeat(body, condition))
    }

    /// `repeat body while c`
    pub fn repeat_while(&self, body: Stmt<'ast>, condition: Expr<'ast>) -> Stmt<'ast> {
        Stmt::RepeatWhile(self.repeat(body, condition))
    }

    /// `begin s1; s2; ... end`
    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(Block {
            stmts: self.arena.alloc_slice_copy(stmts),
            span: Span::default(),
        })
    }

    // ==========================================================================
    // Declarations and parameters
    // ==========================================================================

    /// `const name ~ value`
    pub fn const_decl(&self, name: &str, value: Expr<'ast>) -> Decl<'ast> {
        Decl::Const(ConstDecl {
            name: self.ident(name),
            value,
            span: Span::default(),
        })
    }

    /// `var name : ty`
    pub fn var_decl(&self, name: &str, ty: RuntimeType<'ast>) -> Decl<'ast> {
        Decl::Var(VarDecl {
            name: self.ident(name),
            ty,
            span: Span::default(),
        })
    }

    /// `type name ~ ty`
    pub fn type_decl(&self, name: &str, ty: RuntimeType<'ast>) -> Decl<'ast> {
        Decl::Type(TypeDecl {
            name: self.ident(name),
            ty,
            span: Span::default(),
        })
    }

    /// `func name(params) : ret ~ body`
    pub fn func_decl(
        &self,
        name: &str,
        params: &[Param<'ast>],
        ret: RuntimeType<'ast>,
        body: Expr<'ast>,
    ) -> Decl<'ast> {
        Decl::Func(self.arena.alloc(FuncDecl {
            name: self.ident(name),
            params: self.arena.alloc_slice_copy(params),
            ret,
            body,
            span: Span::default(),
        }))
    }

    /// `proc name(params) ~ body`
    pub fn proc_decl(&self, name: &str, params: &[Param<'ast>], body: Stmt<'ast>) -> Decl<'ast> {
        Decl::Proc(self.arena.alloc(ProcDecl {
            name: self.ident(name),
            params: self.arena.alloc_slice_copy(params),
            body,
            span: Span::default(),
        }))
    }

    /// `name : ty`
    pub fn value_param(&self, name: &str, ty: RuntimeType<'ast>) -> Param<'ast> {
        Param::Value(ValueParam {
            name: self.ident(name),
            ty,
        })
    }

    /// `var name : ty`
    pub fn var_param(&self, name: &str, ty: RuntimeType<'ast>) -> Param<'ast> {
        Param::Var(ValueParam {
            name: self.ident(name),
            ty,
        })
    }

    /// `func name(params) : ret`, or `proc name(params)` when `ret` is `Void`
    pub fn func_param(&self, name: &str, params: &[Param<'ast>], ret: RuntimeType<'ast>) -> Param<'ast> {
        Param::Func(self.arena.alloc(FuncParam {
            name: self.ident(name),
            params: self.arena.alloc_slice_copy(params),
            ret,
        }))
    }

    /// Wrap a command as a program.
    pub fn program(&self, command: Stmt<'ast>) -> Program<'ast> {
        Program::new(command, Span::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscript_and_field_types_are_derived() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let point = b.record_type(&[("x", types::INTEGER), ("ok", types::BOOLEAN)]);
        let points = b.array_type(4, point);
        let elem = b.subscript(b.name("ps", points), b.int(2));
        let ok = b.field(elem, "ok");

        assert_eq!(elem.ty(), point);
        assert_eq!(ok.ty(), RuntimeType::Boolean);
        assert_eq!(ok.root().name, "ps");
    }

    #[test]
    fn record_literal_type_follows_fields() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let lit = b.record_lit(&[("a", b.int(1)), ("b", b.char('z'))]);
        assert_eq!(lit.ty().size(), 2);
        assert_eq!(lit.ty().field("b").map(|(o, _)| o), Some(1));
    }

    #[test]
    fn let_expr_takes_body_type() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let e = b.let_expr(&[b.var_decl("x", types::INTEGER)], b.bool(true));
        assert_eq!(e.ty(), RuntimeType::Boolean);
    }

    #[test]
    fn params_size_counts_words() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let pair = b.array_type(2, types::INTEGER);
        let params = [
            b.value_param("a", pair),
            b.var_param("r", pair),
            b.func_param("f", &[], types::INTEGER),
        ];
        assert_eq!(crate::params_size(&params), 5);
    }
}
