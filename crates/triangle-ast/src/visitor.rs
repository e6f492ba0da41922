//! Read-only traversal of the program tree.
//!
//! Implement [`Visitor`] and override the `visit_*` methods for the nodes of
//! interest; the default methods call the matching `walk_*` function, which
//! visits the node's children in source order.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use triangle_ast::{AstBuilder, BasicIdent, Visitor, types, visitor::walk_program};
//!
//! struct Names(Vec<String>);
//!
//! impl<'ast> Visitor<'ast> for Names {
//!     fn visit_basic_ident(&mut self, id: &BasicIdent<'ast>) {
//!         self.0.push(id.ident.name.to_string());
//!     }
//! }
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let program = b.program(b.assign(b.name("x", types::INTEGER), b.var("y", types::INTEGER)));
//!
//! let mut names = Names(Vec::new());
//! walk_program(&mut names, &program);
//! assert_eq!(names.0, ["y", "x"]);
//! ```

use crate::{
    Arg, BasicIdent, CallExpr, Decl, Expr, FuncDecl, Identifier, LiteralKind, ProcDecl, Program,
    Stmt,
};

/// Visitor over program tree nodes.
pub trait Visitor<'ast>: Sized {
    fn visit_stmt(&mut self, stmt: &Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr<'ast>) {
        walk_expr(self, expr);
    }

    fn visit_decl(&mut self, decl: &Decl<'ast>) {
        walk_decl(self, decl);
    }

    /// Visit a function declaration. Parameters are not visited; they
    /// contain no expressions.
    fn visit_func_decl(&mut self, func: &FuncDecl<'ast>) {
        self.visit_expr(&func.body);
    }

    /// Visit a procedure declaration.
    fn visit_proc_decl(&mut self, proc: &ProcDecl<'ast>) {
        self.visit_stmt(&proc.body);
    }

    fn visit_identifier(&mut self, id: &Identifier<'ast>) {
        walk_identifier(self, id);
    }

    /// Visit the root of an identifier.
    fn visit_basic_ident(&mut self, _id: &BasicIdent<'ast>) {}

    fn visit_call(&mut self, call: &CallExpr<'ast>) {
        for arg in call.args {
            self.visit_arg(arg);
        }
    }

    fn visit_arg(&mut self, arg: &Arg<'ast>) {
        walk_arg(self, arg);
    }
}

// === Walk Functions ===

/// Walk the program's command.
pub fn walk_program<'ast, V: Visitor<'ast>>(visitor: &mut V, program: &Program<'ast>) {
    visitor.visit_stmt(&program.command);
}

/// Walk a command.
pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &Stmt<'ast>) {
    match stmt {
        Stmt::Expr(s) => visitor.visit_expr(&s.expr),
        Stmt::Assign(s) => {
            visitor.visit_expr(&s.value);
            visitor.visit_identifier(&s.target);
        }
        Stmt::If(s) => {
            visitor.visit_expr(&s.condition);
            if let Some(then_stmt) = s.then_stmt {
                visitor.visit_stmt(then_stmt);
            }
            if let Some(else_stmt) = s.else_stmt {
                visitor.visit_stmt(else_stmt);
            }
        }
        Stmt::Let(s) => {
            for decl in s.decls {
                visitor.visit_decl(decl);
            }
            visitor.visit_stmt(&s.body);
        }
        Stmt::While(s) => {
            visitor.visit_expr(&s.condition);
            visitor.visit_stmt(&s.body);
        }
        Stmt::LoopWhile(s) => {
            visitor.visit_stmt(&s.before);
            visitor.visit_expr(&s.condition);
            visitor.visit_stmt(&s.after);
        }
        Stmt::RepeatUntil(s) | Stmt::RepeatWhile(s) => {
            visitor.visit_stmt(&s.body);
            visitor.visit_expr(&s.condition);
        }
        Stmt::Block(block) => {
            for stmt in block.stmts {
                visitor.visit_stmt(stmt);
            }
        }
    }
}

/// Walk an expression.
pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &Expr<'ast>) {
    match expr {
        Expr::Literal(literal) => match literal.kind {
            LiteralKind::Int(_) | LiteralKind::Char(_) | LiteralKind::Bool(_) => {}
            LiteralKind::Array(elements) => {
                for element in elements {
                    visitor.visit_expr(element);
                }
            }
            LiteralKind::Record(fields) => {
                for field in fields {
                    visitor.visit_expr(&field.value);
                }
            }
        },
        Expr::Ident(id) => visitor.visit_identifier(id),
        Expr::Binary(e) => {
            visitor.visit_expr(&e.left);
            visitor.visit_expr(&e.right);
        }
        Expr::Unary(e) => visitor.visit_expr(&e.operand),
        Expr::Call(call) => visitor.visit_call(call),
        Expr::If(e) => {
            visitor.visit_expr(&e.condition);
            visitor.visit_expr(&e.then_expr);
            visitor.visit_expr(&e.else_expr);
        }
        Expr::Let(e) => {
            for decl in e.decls {
                visitor.visit_decl(decl);
            }
            visitor.visit_expr(&e.body);
        }
        Expr::Sequence(e) => {
            for stmt in e.stmts {
                visitor.visit_stmt(stmt);
            }
            visitor.visit_expr(&e.result);
        }
    }
}

/// Walk a declaration.
pub fn walk_decl<'ast, V: Visitor<'ast>>(visitor: &mut V, decl: &Decl<'ast>) {
    match decl {
        Decl::Const(d) => visitor.visit_expr(&d.value),
        Decl::Var(_) | Decl::Type(_) => {}
        Decl::Func(func) => visitor.visit_func_decl(func),
        Decl::Proc(proc) => visitor.visit_proc_decl(proc),
    }
}

/// Walk an identifier: subscript indices first, then the root.
pub fn walk_identifier<'ast, V: Visitor<'ast>>(visitor: &mut V, id: &Identifier<'ast>) {
    match id {
        Identifier::Basic(basic) => visitor.visit_basic_ident(basic),
        Identifier::Subscript(subscript) => {
            visitor.visit_identifier(&subscript.array);
            visitor.visit_expr(&subscript.index);
        }
        Identifier::Field(access) => visitor.visit_identifier(&access.record),
    }
}

/// Walk a call argument.
pub fn walk_arg<'ast, V: Visitor<'ast>>(visitor: &mut V, arg: &Arg<'ast>) {
    match arg {
        Arg::Value(expr) => visitor.visit_expr(expr),
        Arg::Var(id) => visitor.visit_identifier(id),
        Arg::Func(_) => {}
    }
}
