//! Rebuilding traversal of the program tree.
//!
//! A [`Folder`] maps a tree to a new tree allocated in the same arena. The
//! default `fold_*` methods rebuild each node from its folded children via
//! the matching `rebuild_*` function, so an implementation only overrides
//! the nodes it rewrites. The input tree is never modified.

use bumpalo::Bump;

use crate::{
    Arg, ArraySubscript, AssignStmt, BinaryExpr, Block, CallExpr, ConstDecl, Decl, Expr, ExprStmt,
    FieldInit, FuncDecl, Identifier, IfExpr, IfStmt, LetExpr, LetStmt, LiteralExpr, LiteralKind,
    LoopWhileStmt, ProcDecl, Program, RecordAccess, RepeatStmt, SequenceExpr, Stmt, UnaryExpr,
    WhileStmt,
};

/// Tree-to-tree transformation.
pub trait Folder<'ast>: Sized {
    /// Arena receiving the rebuilt nodes.
    fn arena(&self) -> &'ast Bump;

    fn fold_program(&mut self, program: &Program<'ast>) -> Program<'ast> {
        Program::new(self.fold_stmt(&program.command), program.span)
    }

    fn fold_stmt(&mut self, stmt: &Stmt<'ast>) -> Stmt<'ast> {
        rebuild_stmt(self, stmt)
    }

    fn fold_expr(&mut self, expr: &Expr<'ast>) -> Expr<'ast> {
        rebuild_expr(self, expr)
    }

    fn fold_decl(&mut self, decl: &Decl<'ast>) -> Decl<'ast> {
        rebuild_decl(self, decl)
    }

    fn fold_identifier(&mut self, id: &Identifier<'ast>) -> Identifier<'ast> {
        rebuild_identifier(self, id)
    }

    fn fold_arg(&mut self, arg: &Arg<'ast>) -> Arg<'ast> {
        match arg {
            Arg::Value(expr) => Arg::Value(self.fold_expr(expr)),
            Arg::Var(id) => Arg::Var(self.fold_identifier(id)),
            Arg::Func(name) => Arg::Func(*name),
        }
    }
}

// === Rebuild Functions ===

fn fold_stmts<'ast, F: Folder<'ast>>(folder: &mut F, stmts: &[Stmt<'ast>]) -> &'ast [Stmt<'ast>] {
    let folded: Vec<Stmt<'ast>> = stmts.iter().map(|s| folder.fold_stmt(s)).collect();
    folder.arena().alloc_slice_copy(&folded)
}

fn fold_decls<'ast, F: Folder<'ast>>(folder: &mut F, decls: &[Decl<'ast>]) -> &'ast [Decl<'ast>] {
    let folded: Vec<Decl<'ast>> = decls.iter().map(|d| folder.fold_decl(d)).collect();
    folder.arena().alloc_slice_copy(&folded)
}

/// Rebuild a command from its folded children.
pub fn rebuild_stmt<'ast, F: Folder<'ast>>(folder: &mut F, stmt: &Stmt<'ast>) -> Stmt<'ast> {
    match stmt {
        Stmt::Expr(s) => Stmt::Expr(ExprStmt {
            expr: folder.fold_expr(&s.expr),
            span: s.span,
        }),
        Stmt::Assign(s) => {
            let value = folder.fold_expr(&s.value);
            let target = folder.fold_identifier(&s.target);
            Stmt::Assign(folder.arena().alloc(AssignStmt {
                target,
                value,
                span: s.span,
            }))
        }
        Stmt::If(s) => {
            let condition = folder.fold_expr(&s.condition);
            let then_stmt = s.then_stmt.map(|t| folder.fold_stmt(t));
            let else_stmt = s.else_stmt.map(|e| folder.fold_stmt(e));
            let arena = folder.arena();
            Stmt::If(arena.alloc(IfStmt {
                condition,
                then_stmt: then_stmt.map(|t| &*arena.alloc(t)),
                else_stmt: else_stmt.map(|e| &*arena.alloc(e)),
                span: s.span,
            }))
        }
        Stmt::Let(s) => {
            let decls = fold_decls(folder, s.decls);
            let body = folder.fold_stmt(&s.body);
            Stmt::Let(folder.arena().alloc(LetStmt {
                decls,
                body,
                span: s.span,
            }))
        }
        Stmt::While(s) => {
            let condition = folder.fold_expr(&s.condition);
            let body = folder.fold_stmt(&s.body);
            Stmt::While(folder.arena().alloc(WhileStmt {
                condition,
                body,
                span: s.span,
            }))
        }
        Stmt::LoopWhile(s) => {
            let before = folder.fold_stmt(&s.before);
            let condition = folder.fold_expr(&s.condition);
            let after = folder.fold_stmt(&s.after);
            Stmt::LoopWhile(folder.arena().alloc(LoopWhileStmt {
                before,
                condition,
                after,
                span: s.span,
            }))
        }
        Stmt::RepeatUntil(s) => Stmt::RepeatUntil(rebuild_repeat(folder, s)),
        Stmt::RepeatWhile(s) => Stmt::RepeatWhile(rebuild_repeat(folder, s)),
        Stmt::Block(block) => Stmt::Block(Block {
            stmts: fold_stmts(folder, block.stmts),
            span: block.span,
        }),
    }
}

fn rebuild_repeat<'ast, F: Folder<'ast>>(
    folder: &mut F,
    repeat: &RepeatStmt<'ast>,
) -> &'ast RepeatStmt<'ast> {
    let body = folder.fold_stmt(&repeat.body);
    let condition = folder.fold_expr(&repeat.condition);
    folder.arena().alloc(RepeatStmt {
        body,
        condition,
        span: repeat.span,
    })
}

/// Rebuild an expression from its folded children.
pub fn rebuild_expr<'ast, F: Folder<'ast>>(folder: &mut F, expr: &Expr<'ast>) -> Expr<'ast> {
    match expr {
        Expr::Literal(literal) => Expr::Literal(rebuild_literal(folder, literal)),
        Expr::Ident(id) => Expr::Ident(folder.fold_identifier(id)),
        Expr::Binary(e) => {
            let left = folder.fold_expr(&e.left);
            let right = folder.fold_expr(&e.right);
            Expr::Binary(folder.arena().alloc(BinaryExpr { left, right, ..**e }))
        }
        Expr::Unary(e) => {
            let operand = folder.fold_expr(&e.operand);
            Expr::Unary(folder.arena().alloc(UnaryExpr { operand, ..**e }))
        }
        Expr::Call(call) => {
            let args: Vec<Arg<'ast>> = call.args.iter().map(|a| folder.fold_arg(a)).collect();
            let arena = folder.arena();
            Expr::Call(arena.alloc(CallExpr {
                args: arena.alloc_slice_copy(&args),
                ..**call
            }))
        }
        Expr::If(e) => {
            let condition = folder.fold_expr(&e.condition);
            let then_expr = folder.fold_expr(&e.then_expr);
            let else_expr = folder.fold_expr(&e.else_expr);
            Expr::If(folder.arena().alloc(IfExpr {
                condition,
                then_expr,
                else_expr,
                ..**e
            }))
        }
        Expr::Let(e) => {
            let decls = fold_decls(folder, e.decls);
            let body = folder.fold_expr(&e.body);
            Expr::Let(folder.arena().alloc(LetExpr { decls, body, ..**e }))
        }
        Expr::Sequence(e) => {
            let stmts = fold_stmts(folder, e.stmts);
            let result = folder.fold_expr(&e.result);
            Expr::Sequence(folder.arena().alloc(SequenceExpr {
                stmts,
                result,
                span: e.span,
            }))
        }
    }
}

fn rebuild_literal<'ast, F: Folder<'ast>>(
    folder: &mut F,
    literal: &LiteralExpr<'ast>,
) -> LiteralExpr<'ast> {
    let kind = match literal.kind {
        LiteralKind::Array(elements) => {
            let folded: Vec<Expr<'ast>> = elements.iter().map(|e| folder.fold_expr(e)).collect();
            LiteralKind::Array(folder.arena().alloc_slice_copy(&folded))
        }
        LiteralKind::Record(fields) => {
            let folded: Vec<FieldInit<'ast>> = fields
                .iter()
                .map(|f| FieldInit {
                    name: f.name,
                    value: folder.fold_expr(&f.value),
                })
                .collect();
            LiteralKind::Record(folder.arena().alloc_slice_copy(&folded))
        }
        scalar => scalar,
    };
    LiteralExpr { kind, ..*literal }
}

/// Rebuild a declaration from its folded children.
pub fn rebuild_decl<'ast, F: Folder<'ast>>(folder: &mut F, decl: &Decl<'ast>) -> Decl<'ast> {
    match decl {
        Decl::Const(d) => Decl::Const(ConstDecl {
            value: folder.fold_expr(&d.value),
            ..*d
        }),
        Decl::Var(_) | Decl::Type(_) => *decl,
        Decl::Func(func) => {
            let body = folder.fold_expr(&func.body);
            Decl::Func(folder.arena().alloc(FuncDecl { body, ..**func }))
        }
        Decl::Proc(proc) => {
            let body = folder.fold_stmt(&proc.body);
            Decl::Proc(folder.arena().alloc(ProcDecl { body, ..**proc }))
        }
    }
}

/// Rebuild an identifier, folding subscript indices.
pub fn rebuild_identifier<'ast, F: Folder<'ast>>(
    folder: &mut F,
    id: &Identifier<'ast>,
) -> Identifier<'ast> {
    match id {
        Identifier::Basic(_) => *id,
        Identifier::Subscript(subscript) => {
            let array = folder.fold_identifier(&subscript.array);
            let index = folder.fold_expr(&subscript.index);
            Identifier::Subscript(folder.arena().alloc(ArraySubscript {
                array,
                index,
                ..**subscript
            }))
        }
        Identifier::Field(access) => {
            let record = folder.fold_identifier(&access.record);
            Identifier::Field(folder.arena().alloc(RecordAccess { record, ..**access }))
        }
    }
}
