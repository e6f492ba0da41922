//! Loop-invariant hoisting.
//!
//! An operator expression inside a loop whose operands are literals and
//! variables the loop never changes computes the same value on every
//! iteration. This pass binds each such expression to a fresh constant in
//! a `let` wrapped around the loop:
//!
//! ```text
//! while i < n * k do i := i + 1
//!   =>
//! let const $inv1 ~ n * k in while i < $inv1 do i := i + 1
//! ```
//!
//! A loop is only considered when every routine it calls is a standard
//! environment primitive, so no call can change a variable behind its back.
//! Var parameters may alias any variable, so a loop that writes through one
//! hoists nothing, and an expression reading one is not hoisted from a loop
//! that writes anything. Expressions that can trap (arithmetic) are only
//! hoisted from a `while` condition, which runs before anything else in the
//! loop; hoisting them from elsewhere could raise an error the loop would
//! never have reached. Even there they are only hoisted when everything
//! left behind in the condition can neither trap nor call, so the first
//! error raised is the same one.
//!
//! Inner loops are processed before the loops around them. Routine bodies
//! inside a loop are left alone; their own loops are processed separately.

use bumpalo::Bump;
use rustc_hash::FxHashSet;
use triangle_ast::fold::{rebuild_decl, rebuild_expr, rebuild_stmt};
use triangle_ast::visitor::{walk_decl, walk_stmt};
use triangle_ast::{
    Arg, BasicIdent, BinaryOp, CallExpr, ConstDecl, Decl, Expr, Folder, Ident, Identifier,
    LetStmt, LiteralKind, Param, Program, Stmt, UnaryOp, Visitor, WhileStmt,
};

use super::fresh::FreshNames;
use crate::std_env;

// ============================================================================
// Program census
// ============================================================================

/// Routine and var-parameter names declared anywhere in a program.
#[derive(Debug, Default)]
struct Census<'ast> {
    routines: FxHashSet<&'ast str>,
    references: FxHashSet<&'ast str>,
}

impl<'ast> Census<'ast> {
    fn record_params(&mut self, params: &[Param<'ast>]) {
        for param in params {
            match param {
                Param::Value(_) => {}
                Param::Var(var) => {
                    self.references.insert(var.name.name);
                }
                Param::Func(func) => {
                    self.routines.insert(func.name.name);
                }
            }
        }
    }
}

impl<'ast> Visitor<'ast> for Census<'ast> {
    fn visit_decl(&mut self, decl: &Decl<'ast>) {
        match decl {
            Decl::Func(func) => {
                self.routines.insert(func.name.name);
                self.record_params(func.params);
            }
            Decl::Proc(proc) => {
                self.routines.insert(proc.name.name);
                self.record_params(proc.params);
            }
            Decl::Const(_) | Decl::Var(_) | Decl::Type(_) => {}
        }
        walk_decl(self, decl);
    }
}

// ============================================================================
// Loop effects
// ============================================================================

/// What a loop may change, declare, or call.
#[derive(Debug, Default)]
struct LoopEffects<'ast> {
    written: FxHashSet<&'ast str>,
    declared: FxHashSet<&'ast str>,
    callees: FxHashSet<&'ast str>,
}

impl<'ast> LoopEffects<'ast> {
    fn of(stmt: &Stmt<'ast>) -> Self {
        let mut effects = Self::default();
        effects.visit_stmt(stmt);
        effects
    }

    fn is_variant(&self, name: &str) -> bool {
        self.written.contains(name) || self.declared.contains(name)
    }
}

impl<'ast> Visitor<'ast> for LoopEffects<'ast> {
    fn visit_stmt(&mut self, stmt: &Stmt<'ast>) {
        if let Stmt::Assign(assign) = stmt {
            self.written.insert(assign.target.root().name);
        }
        walk_stmt(self, stmt);
    }

    fn visit_decl(&mut self, decl: &Decl<'ast>) {
        self.declared.insert(decl.name().name);
        match decl {
            Decl::Func(func) => self.declared.extend(func.params.iter().map(|p| p.name().name)),
            Decl::Proc(proc) => self.declared.extend(proc.params.iter().map(|p| p.name().name)),
            Decl::Const(_) | Decl::Var(_) | Decl::Type(_) => {}
        }
        walk_decl(self, decl);
    }

    fn visit_call(&mut self, call: &CallExpr<'ast>) {
        self.callees.insert(call.callee.name);
        for arg in call.args {
            match arg {
                Arg::Var(id) => {
                    self.written.insert(id.root().name);
                }
                Arg::Func(name) => {
                    self.callees.insert(name.name);
                }
                Arg::Value(_) => {}
            }
            self.visit_arg(arg);
        }
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// Facts about a pure operator expression.
#[derive(Debug, Clone, Copy, Default)]
struct Shape {
    reads_variable: bool,
    reads_reference: bool,
    may_trap: bool,
}

impl Shape {
    fn merge(self, other: Shape) -> Shape {
        Shape {
            reads_variable: self.reads_variable || other.reads_variable,
            reads_reference: self.reads_reference || other.reads_reference,
            may_trap: self.may_trap || other.may_trap,
        }
    }
}

fn binary_may_trap(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
    )
}

// ============================================================================
// Hoister
// ============================================================================

/// Hoists loop invariants out of every loop in a program.
pub struct InvariantHoister<'ast> {
    arena: &'ast Bump,
    names: FreshNames,
    census: Census<'ast>,
}

impl<'ast> InvariantHoister<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            names: FreshNames::new("inv"),
            census: Census::default(),
        }
    }

    /// Number of expressions hoisted so far. Each one gets its own name.
    pub fn hoisted(&self) -> u32 {
        self.names.issued()
    }

    /// Rewrite `program`.
    pub fn hoist_program(&mut self, program: &Program<'ast>) -> Program<'ast> {
        self.census.visit_stmt(&program.command);
        self.fold_program(program)
    }

    /// Whether every routine the loop calls is a primitive.
    fn calls_only_primitives(&self, effects: &LoopEffects<'ast>) -> bool {
        effects
            .callees
            .iter()
            .all(|name| !self.census.routines.contains(name) && std_env::is_standard_routine(name))
    }

    /// Hoist out of `stmt`, a loop whose inner loops are already done.
    fn hoist_loop(&mut self, stmt: Stmt<'ast>) -> Stmt<'ast> {
        let effects = LoopEffects::of(&stmt);
        if !self.calls_only_primitives(&effects) {
            return stmt;
        }
        let writes_reference = effects
            .written
            .iter()
            .any(|name| self.census.references.contains(name));
        if writes_reference {
            return stmt;
        }

        let mut rewriter = LoopRewriter {
            arena: self.arena,
            names: &mut self.names,
            references: &self.census.references,
            effects: &effects,
            writes_anything: !effects.written.is_empty(),
            leading: false,
            bindings: Vec::new(),
        };
        let body = match stmt {
            Stmt::While(while_stmt) => {
                rewriter.leading = true;
                // Judged with trapping candidates counted as hoisted.
                rewriter.leading = rewriter.is_quiet(&while_stmt.condition);
                let condition = rewriter.fold_expr(&while_stmt.condition);
                rewriter.leading = false;
                let body = rewriter.fold_stmt(&while_stmt.body);
                Stmt::While(self.arena.alloc(WhileStmt {
                    condition,
                    body,
                    span: while_stmt.span,
                }))
            }
            _ => rewriter.fold_stmt(&stmt),
        };
        let bindings = rewriter.bindings;
        if bindings.is_empty() {
            return stmt;
        }

        let span = stmt.span();
        let decls: Vec<Decl<'ast>> = bindings
            .into_iter()
            .map(|(name, value)| {
                Decl::Const(ConstDecl {
                    name: Ident::new(name, value.span()),
                    value,
                    span,
                })
            })
            .collect();
        Stmt::Let(self.arena.alloc(LetStmt {
            decls: self.arena.alloc_slice_copy(&decls),
            body,
            span,
        }))
    }
}

impl<'ast> Folder<'ast> for InvariantHoister<'ast> {
    fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn fold_stmt(&mut self, stmt: &Stmt<'ast>) -> Stmt<'ast> {
        let stmt = rebuild_stmt(self, stmt);
        match stmt {
            Stmt::While(_) | Stmt::LoopWhile(_) | Stmt::RepeatUntil(_) | Stmt::RepeatWhile(_) => {
                self.hoist_loop(stmt)
            }
            _ => stmt,
        }
    }
}

// ============================================================================
// Loop rewriter
// ============================================================================

/// Replaces invariant expressions in one loop with fresh names.
struct LoopRewriter<'a, 'ast> {
    arena: &'ast Bump,
    names: &'a mut FreshNames,
    references: &'a FxHashSet<&'ast str>,
    effects: &'a LoopEffects<'ast>,
    writes_anything: bool,
    /// Inside the part of the loop evaluated first on entry
    leading: bool,
    /// Hoisted expressions and the names now standing for them
    bindings: Vec<(&'ast str, Expr<'ast>)>,
}

impl<'a, 'ast> LoopRewriter<'a, 'ast> {
    /// Facts about `expr` if it is built only of literals, invariant plain
    /// names and operators.
    fn shape(&self, expr: &Expr<'ast>) -> Option<Shape> {
        match expr {
            Expr::Literal(literal) => match literal.kind {
                LiteralKind::Int(_) | LiteralKind::Char(_) | LiteralKind::Bool(_) => {
                    Some(Shape::default())
                }
                LiteralKind::Array(_) | LiteralKind::Record(_) => None,
            },
            Expr::Ident(Identifier::Basic(basic)) => {
                let name = basic.ident.name;
                if self.effects.is_variant(name) {
                    return None;
                }
                Some(Shape {
                    reads_variable: true,
                    reads_reference: self.references.contains(name),
                    may_trap: false,
                })
            }
            Expr::Binary(binary) => {
                let shape = self.shape(&binary.left)?.merge(self.shape(&binary.right)?);
                Some(Shape {
                    may_trap: shape.may_trap || binary_may_trap(binary.op),
                    ..shape
                })
            }
            Expr::Unary(unary) => {
                let shape = self.shape(&unary.operand)?;
                Some(Shape {
                    may_trap: shape.may_trap || unary.op == UnaryOp::Neg,
                    ..shape
                })
            }
            _ => None,
        }
    }

    fn is_hoistable(&self, expr: &Expr<'ast>) -> bool {
        if !matches!(expr, Expr::Binary(_) | Expr::Unary(_)) {
            return false;
        }
        match self.shape(expr) {
            Some(shape) => {
                shape.reads_variable
                    && (self.leading || !shape.may_trap)
                    && !(shape.reads_reference && self.writes_anything)
            }
            None => false,
        }
    }

    /// The name bound to `expr`, reusing one for an identical expression.
    fn bind(&mut self, expr: Expr<'ast>) -> &'ast str {
        if let Some(&(name, _)) = self.bindings.iter().find(|(_, bound)| *bound == expr) {
            return name;
        }
        let name = self.names.fresh(self.arena);
        self.bindings.push((name, expr));
        name
    }

    /// Whether evaluating `expr` can neither trap nor call anything once
    /// its hoistable parts are gone.
    fn is_quiet(&self, expr: &Expr<'ast>) -> bool {
        if self.is_hoistable(expr) {
            return true;
        }
        match expr {
            Expr::Literal(literal) => match literal.kind {
                LiteralKind::Int(_) | LiteralKind::Char(_) | LiteralKind::Bool(_) => true,
                LiteralKind::Array(elements) => elements.iter().all(|e| self.is_quiet(e)),
                LiteralKind::Record(fields) => fields.iter().all(|f| self.is_quiet(&f.value)),
            },
            Expr::Ident(id) => self.is_quiet_identifier(id),
            Expr::Binary(binary) => {
                !binary_may_trap(binary.op)
                    && self.is_quiet(&binary.left)
                    && self.is_quiet(&binary.right)
            }
            Expr::Unary(unary) => unary.op != UnaryOp::Neg && self.is_quiet(&unary.operand),
            Expr::Call(_) | Expr::If(_) | Expr::Let(_) | Expr::Sequence(_) => false,
        }
    }

    fn is_quiet_identifier(&self, id: &Identifier<'ast>) -> bool {
        match id {
            Identifier::Basic(_) => true,
            Identifier::Subscript(subscript) => {
                self.is_quiet_identifier(&subscript.array) && self.is_quiet(&subscript.index)
            }
            Identifier::Field(access) => self.is_quiet_identifier(&access.record),
        }
    }

    fn with_leading<T>(&mut self, leading: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.leading, leading);
        let result = f(self);
        self.leading = saved;
        result
    }
}

impl<'a, 'ast> Folder<'ast> for LoopRewriter<'a, 'ast> {
    fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn fold_expr(&mut self, expr: &Expr<'ast>) -> Expr<'ast> {
        if self.is_hoistable(expr) {
            let name = self.bind(*expr);
            return Expr::Ident(Identifier::Basic(BasicIdent {
                ident: Ident::new(name, expr.span()),
                ty: expr.ty(),
            }));
        }
        match expr {
            Expr::If(_) | Expr::Let(_) | Expr::Sequence(_) => {
                self.with_leading(false, |r| rebuild_expr(r, expr))
            }
            _ => rebuild_expr(self, expr),
        }
    }

    fn fold_decl(&mut self, decl: &Decl<'ast>) -> Decl<'ast> {
        match decl {
            Decl::Func(_) | Decl::Proc(_) => *decl,
            Decl::Const(_) | Decl::Var(_) | Decl::Type(_) => rebuild_decl(self, decl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triangle_ast::{AstBuilder, types};

    fn hoist<'ast>(arena: &'ast Bump, program: &Program<'ast>) -> Program<'ast> {
        InvariantHoister::new(arena).hoist_program(program)
    }

    #[test]
    fn condition_invariant_is_hoisted() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let limit = b.binary(BinaryOp::Mul, b.var("n", int), b.var("k", int), int);
        let cond = b.binary(BinaryOp::Less, b.var("i", int), limit, types::BOOLEAN);
        let step = b.binary(BinaryOp::Add, b.var("i", int), b.int(1), int);
        let program = b.program(b.while_stmt(cond, b.assign(b.name("i", int), step)));

        let hoisted_cond = b.binary(BinaryOp::Less, b.var("i", int), b.var("$inv1", int), types::BOOLEAN);
        let expected = b.program(b.let_stmt(
            &[b.const_decl("$inv1", limit)],
            b.while_stmt(hoisted_cond, b.assign(b.name("i", int), step)),
        ));
        assert_eq!(hoist(&arena, &program), expected);
    }

    #[test]
    fn trapping_expressions_stay_in_the_body() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let quotient = b.binary(BinaryOp::Div, b.var("a", int), b.var("d", int), int);
        let body = b.assign(b.name("x", int), quotient);
        let program = b.program(b.while_stmt(b.var("go", types::BOOLEAN), body));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn non_trapping_body_expressions_are_hoisted() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let bool_ = types::BOOLEAN;
        let test = b.binary(BinaryOp::Less, b.var("a", int), b.var("c", int), bool_);
        let body = b.assign(b.name("flag", bool_), test);
        let program = b.program(b.repeat_until(body, b.var("flag", bool_)));

        let mut hoister = InvariantHoister::new(&arena);
        let result = hoister.hoist_program(&program);
        assert_eq!(hoister.hoisted(), 1);
        assert!(matches!(result.command, Stmt::Let(_)));
    }

    #[test]
    fn written_variables_are_variant() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let cond = b.binary(
            BinaryOp::Less,
            b.var("i", int),
            b.binary(BinaryOp::Add, b.var("i", int), b.int(10), int),
            types::BOOLEAN,
        );
        let read = b.call("getint", &[Arg::Var(b.name("i", int))], types::VOID);
        let program = b.program(b.while_stmt(cond, b.expr_stmt(read)));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn loops_calling_declared_routines_are_skipped() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let limit = b.binary(BinaryOp::Mul, b.var("n", int), b.int(2), int);
        let cond = b.binary(BinaryOp::Less, b.var("i", int), limit, types::BOOLEAN);
        let tick = b.proc_decl("tick", &[], b.block(&[]));
        let body = b.expr_stmt(b.call("tick", &[], types::VOID));
        let program = b.program(b.let_stmt(&[tick], b.while_stmt(cond, body)));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn shadowed_standard_routines_count_as_declared() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let limit = b.binary(BinaryOp::Mul, b.var("n", int), b.int(2), int);
        let cond = b.binary(BinaryOp::Less, b.var("i", int), limit, types::BOOLEAN);
        let puteol = b.proc_decl("puteol", &[], b.block(&[]));
        let body = b.expr_stmt(b.call("puteol", &[], types::VOID));
        let program = b.program(b.let_stmt(&[puteol], b.while_stmt(cond, body)));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn reference_parameters_block_hoisting_when_written() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let limit = b.binary(BinaryOp::Mul, b.var("g", int), b.int(2), int);
        let cond = b.binary(BinaryOp::Less, b.var("r", int), limit, types::BOOLEAN);
        let bump = b.binary(BinaryOp::Add, b.var("r", int), b.int(1), int);
        let lp = b.while_stmt(cond, b.assign(b.name("r", int), bump));
        let p = b.proc_decl("p", &[b.var_param("r", int)], lp);
        let program = b.program(b.let_stmt(&[b.var_decl("g", int), p], b.block(&[])));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn names_declared_in_the_loop_are_variant() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let bool_ = types::BOOLEAN;
        let test = b.binary(BinaryOp::Less, b.var("t", int), b.var("c", int), bool_);
        let body = b.let_stmt(&[b.const_decl("t", b.int(1))], b.assign(b.name("flag", bool_), test));
        let program = b.program(b.repeat_until(body, b.var("flag", bool_)));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn identical_expressions_share_a_name() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let bool_ = types::BOOLEAN;
        let same = || b.binary(BinaryOp::Equal, b.var("a", int), b.var("c", int), bool_);
        let body = b.block(&[b.assign(b.name("x", bool_), same()), b.assign(b.name("y", bool_), same())]);
        let program = b.program(b.repeat_while(body, b.var("x", bool_)));

        let mut hoister = InvariantHoister::new(&arena);
        hoister.hoist_program(&program);
        assert_eq!(hoister.hoisted(), 1);
    }

    #[test]
    fn inner_loops_are_processed_first() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let limit = b.binary(BinaryOp::Mul, b.var("n", int), b.var("n", int), int);
        let inner_cond = b.binary(BinaryOp::Less, b.var("j", int), limit, types::BOOLEAN);
        let step = b.binary(BinaryOp::Add, b.var("j", int), b.int(1), int);
        let inner = b.while_stmt(inner_cond, b.assign(b.name("j", int), step));
        let outer = b.repeat_until(inner, b.var("done", types::BOOLEAN));
        let program = b.program(outer);

        let result = hoist(&arena, &program);
        let Stmt::RepeatUntil(repeat) = result.command else {
            panic!("outer loop should stay in place, got {:?}", result.command);
        };
        let Stmt::Let(hoisted) = repeat.body else {
            panic!("inner loop should be wrapped, got {:?}", repeat.body);
        };
        assert_eq!(hoisted.decls.len(), 1);
        assert_eq!(hoisted.decls[0].name().name, "$inv1");
    }

    #[test]
    fn loop_while_hoists_only_what_cannot_trap() {
        // loop ok := a < c while i < n * 2 do i := i + 1
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let bool_ = types::BOOLEAN;
        let compare = b.binary(BinaryOp::Less, b.var("a", int), b.var("c", int), bool_);
        let limit = b.binary(BinaryOp::Mul, b.var("n", int), b.int(2), int);
        let cond = b.binary(BinaryOp::Less, b.var("i", int), limit, bool_);
        let step = b.assign(
            b.name("i", int),
            b.binary(BinaryOp::Add, b.var("i", int), b.int(1), int),
        );
        let program = b.program(b.loop_while(b.assign(b.name("ok", bool_), compare), cond, step));

        let expected = b.program(b.let_stmt(
            &[b.const_decl("$inv1", compare)],
            b.loop_while(b.assign(b.name("ok", bool_), b.var("$inv1", bool_)), cond, step),
        ));
        assert_eq!(hoist(&arena, &program), expected);
    }

    #[test]
    fn condition_traps_keep_their_order() {
        // while (a + 1 > 0) /\ (k / d > 0) do a := a + 1
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let bool_ = types::BOOLEAN;
        let next = b.binary(BinaryOp::Add, b.var("a", int), b.int(1), int);
        let ratio = b.binary(BinaryOp::Div, b.var("k", int), b.var("d", int), int);
        let cond = b.binary(
            BinaryOp::And,
            b.binary(BinaryOp::Greater, next, b.int(0), bool_),
            b.binary(BinaryOp::Greater, ratio, b.int(0), bool_),
            bool_,
        );
        let program = b.program(b.while_stmt(cond, b.assign(b.name("a", int), next)));

        assert_eq!(hoist(&arena, &program), program);
    }

    #[test]
    fn quiet_conditions_still_hoist_traps() {
        // while (i < k / d) /\ flag do i := i + 1
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int = types::INTEGER;
        let bool_ = types::BOOLEAN;
        let ratio = b.binary(BinaryOp::Div, b.var("k", int), b.var("d", int), int);
        let below = b.binary(BinaryOp::Less, b.var("i", int), ratio, bool_);
        let cond = b.binary(BinaryOp::And, below, b.var("flag", bool_), bool_);
        let step = b.binary(BinaryOp::Add, b.var("i", int), b.int(1), int);
        let program = b.program(b.while_stmt(cond, b.assign(b.name("i", int), step)));

        let mut hoister = InvariantHoister::new(&arena);
        let result = hoister.hoist_program(&program);
        assert_eq!(hoister.hoisted(), 1);
        let Stmt::Let(hoisted) = result.command else {
            panic!("expected a let around the loop");
        };
        assert_eq!(hoisted.decls[0], b.const_decl("$inv1", ratio));
    }
}
