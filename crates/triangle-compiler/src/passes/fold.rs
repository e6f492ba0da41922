//! Constant folding.
//!
//! Operators whose operands are all literals are replaced by their value,
//! and control flow on a literal condition is replaced by the branch it
//! always takes. Anything whose evaluation would trap at run time
//! (overflow, division by zero) is left for the machine to report.

use bumpalo::Bump;
use triangle_ast::fold::{rebuild_expr, rebuild_stmt};
use triangle_ast::{
    BinaryExpr, BinaryOp, Block, Expr, Folder, LiteralExpr, LiteralKind, Stmt, UnaryExpr, UnaryOp,
};

use crate::std_env::MAXINT;

/// A one-word literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    Int(i32),
    Char(char),
    Bool(bool),
}

impl Scalar {
    fn of(expr: &Expr<'_>) -> Option<Scalar> {
        match expr {
            Expr::Literal(LiteralExpr { kind, .. }) => match *kind {
                LiteralKind::Int(v) => Some(Scalar::Int(v)),
                LiteralKind::Char(v) => Some(Scalar::Char(v)),
                LiteralKind::Bool(v) => Some(Scalar::Bool(v)),
                LiteralKind::Array(_) | LiteralKind::Record(_) => None,
            },
            _ => None,
        }
    }

    fn into_kind<'ast>(self) -> LiteralKind<'ast> {
        match self {
            Scalar::Int(v) => LiteralKind::Int(v),
            Scalar::Char(v) => LiteralKind::Char(v),
            Scalar::Bool(v) => LiteralKind::Bool(v),
        }
    }
}

/// Integers the machine can hold.
fn representable(value: i32) -> Option<Scalar> {
    (-MAXINT..=MAXINT).contains(&value).then_some(Scalar::Int(value))
}

fn eval_binary(op: BinaryOp, left: Scalar, right: Scalar) -> Option<Scalar> {
    use Scalar::{Bool, Int};

    match (op, left, right) {
        (BinaryOp::Add, Int(a), Int(b)) => representable(a.checked_add(b)?),
        (BinaryOp::Sub, Int(a), Int(b)) => representable(a.checked_sub(b)?),
        (BinaryOp::Mul, Int(a), Int(b)) => representable(a.checked_mul(b)?),
        (BinaryOp::Div, Int(a), Int(b)) => representable(a.checked_div(b)?),
        (BinaryOp::Mod, Int(a), Int(b)) => representable(a.checked_rem(b)?),
        (BinaryOp::Less, Int(a), Int(b)) => Some(Bool(a < b)),
        (BinaryOp::LessEqual, Int(a), Int(b)) => Some(Bool(a <= b)),
        (BinaryOp::Greater, Int(a), Int(b)) => Some(Bool(a > b)),
        (BinaryOp::GreaterEqual, Int(a), Int(b)) => Some(Bool(a >= b)),
        (BinaryOp::Equal, a, b) => Some(Bool(a == b)),
        (BinaryOp::NotEqual, a, b) => Some(Bool(a != b)),
        (BinaryOp::And, Bool(a), Bool(b)) => Some(Bool(a && b)),
        (BinaryOp::Or, Bool(a), Bool(b)) => Some(Bool(a || b)),
        _ => None,
    }
}

fn eval_unary(op: UnaryOp, operand: Scalar) -> Option<Scalar> {
    match (op, operand) {
        (UnaryOp::Neg, Scalar::Int(v)) => representable(v.checked_neg()?),
        (UnaryOp::Not, Scalar::Bool(v)) => Some(Scalar::Bool(!v)),
        _ => None,
    }
}

/// Folds constant subexpressions bottom-up.
pub struct ConstantFolder<'ast> {
    arena: &'ast Bump,
    folded: usize,
}

impl<'ast> ConstantFolder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self { arena, folded: 0 }
    }

    /// Number of nodes replaced so far.
    pub fn folded(&self) -> usize {
        self.folded
    }

    fn literal(&mut self, value: Scalar, template: &Expr<'ast>) -> Expr<'ast> {
        self.folded += 1;
        Expr::Literal(LiteralExpr {
            kind: value.into_kind(),
            ty: template.ty(),
            span: template.span(),
        })
    }

    fn fold_binary(&mut self, binary: &BinaryExpr<'ast>, expr: &Expr<'ast>) -> Option<Expr<'ast>> {
        let value = eval_binary(binary.op, Scalar::of(&binary.left)?, Scalar::of(&binary.right)?)?;
        Some(self.literal(value, expr))
    }

    fn fold_unary(&mut self, unary: &UnaryExpr<'ast>, expr: &Expr<'ast>) -> Option<Expr<'ast>> {
        let value = eval_unary(unary.op, Scalar::of(&unary.operand)?)?;
        Some(self.literal(value, expr))
    }

    fn empty_block(&mut self, stmt: &Stmt<'ast>) -> Stmt<'ast> {
        self.folded += 1;
        Stmt::Block(Block {
            stmts: &[],
            span: stmt.span(),
        })
    }
}

impl<'ast> Folder<'ast> for ConstantFolder<'ast> {
    fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn fold_expr(&mut self, expr: &Expr<'ast>) -> Expr<'ast> {
        let expr = rebuild_expr(self, expr);
        let folded = match &expr {
            Expr::Binary(binary) => self.fold_binary(binary, &expr),
            Expr::Unary(unary) => self.fold_unary(unary, &expr),
            Expr::If(if_expr) => if_expr.condition.as_bool().map(|taken| {
                self.folded += 1;
                if taken { if_expr.then_expr } else { if_expr.else_expr }
            }),
            _ => None,
        };
        folded.unwrap_or(expr)
    }

    fn fold_stmt(&mut self, stmt: &Stmt<'ast>) -> Stmt<'ast> {
        let stmt = rebuild_stmt(self, stmt);
        match stmt {
            Stmt::If(if_stmt) => match if_stmt.condition.as_bool() {
                Some(taken) => {
                    let branch = if taken { if_stmt.then_stmt } else { if_stmt.else_stmt };
                    match branch {
                        Some(branch) => {
                            self.folded += 1;
                            *branch
                        }
                        None => self.empty_block(&stmt),
                    }
                }
                None => stmt,
            },
            Stmt::While(while_stmt) if while_stmt.condition.as_bool() == Some(false) => {
                self.empty_block(&stmt)
            }
            Stmt::LoopWhile(loop_while) if loop_while.condition.as_bool() == Some(false) => {
                self.folded += 1;
                loop_while.before
            }
            _ => stmt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triangle_ast::{AstBuilder, Program, types};

    fn fold<'ast>(arena: &'ast Bump, program: &Program<'ast>) -> Program<'ast> {
        ConstantFolder::new(arena).fold_program(program)
    }

    #[test]
    fn arithmetic_folds_to_a_literal() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let product = b.binary(BinaryOp::Mul, b.int(6), b.int(7), types::INTEGER);
        let sum = b.binary(BinaryOp::Add, b.int(1), product, types::INTEGER);
        let program = b.program(b.expr_stmt(sum));

        assert_eq!(fold(&arena, &program), b.program(b.expr_stmt(b.int(43))));
    }

    #[test]
    fn traps_are_left_in_place() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let by_zero = b.binary(BinaryOp::Div, b.int(1), b.int(0), types::INTEGER);
        let overflow = b.binary(BinaryOp::Add, b.int(32767), b.int(1), types::INTEGER);
        let program = b.program(b.block(&[b.expr_stmt(by_zero), b.expr_stmt(overflow)]));

        let mut folder = ConstantFolder::new(&arena);
        assert_eq!(folder.fold_program(&program), program);
        assert_eq!(folder.folded(), 0);
    }

    #[test]
    fn division_truncates() {
        assert_eq!(eval_binary(BinaryOp::Div, Scalar::Int(-7), Scalar::Int(2)), Some(Scalar::Int(-3)));
        assert_eq!(eval_binary(BinaryOp::Mod, Scalar::Int(-7), Scalar::Int(2)), Some(Scalar::Int(-1)));
    }

    #[test]
    fn logic_and_comparison_fold() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let less = b.binary(BinaryOp::Less, b.int(1), b.int(2), types::BOOLEAN);
        let same = b.binary(BinaryOp::Equal, b.char('a'), b.char('b'), types::BOOLEAN);
        let not_same = b.unary(UnaryOp::Not, same, types::BOOLEAN);
        let both = b.binary(BinaryOp::And, less, not_same, types::BOOLEAN);
        let program = b.program(b.expr_stmt(both));

        assert_eq!(fold(&arena, &program), b.program(b.expr_stmt(b.bool(true))));
    }

    #[test]
    fn literal_conditions_select_a_branch() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let chosen = b.expr_stmt(b.int(2));
        let cond = b.binary(BinaryOp::Greater, b.int(1), b.int(2), types::BOOLEAN);
        let program = b.program(b.if_stmt(cond, Some(b.expr_stmt(b.int(1))), Some(chosen)));

        assert_eq!(fold(&arena, &program), b.program(chosen));
    }

    #[test]
    fn if_expression_with_literal_condition() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let choice = b.if_expr(b.bool(true), b.int(1), b.int(2));
        let program = b.program(b.expr_stmt(choice));

        assert_eq!(fold(&arena, &program), b.program(b.expr_stmt(b.int(1))));
    }

    #[test]
    fn dead_loops_disappear() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let never = b.unary(UnaryOp::Not, b.bool(true), types::BOOLEAN);
        let program = b.program(b.while_stmt(never, b.expr_stmt(b.int(1))));

        assert_eq!(fold(&arena, &program), b.program(b.block(&[])));
    }

    #[test]
    fn loop_while_false_keeps_only_its_first_part() {
        // loop putint(2 * 3) while 1 > 2 do puteol()
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let product = b.binary(BinaryOp::Mul, b.int(2), b.int(3), types::INTEGER);
        let print = |value| b.expr_stmt(b.call("putint", &[triangle_ast::Arg::Value(value)], types::VOID));
        let never = b.binary(BinaryOp::Greater, b.int(1), b.int(2), types::BOOLEAN);
        let newline = b.expr_stmt(b.call("puteol", &[], types::VOID));
        let program = b.program(b.loop_while(print(product), never, newline));

        let mut folder = ConstantFolder::new(&arena);
        assert_eq!(folder.fold_program(&program), b.program(print(b.int(6))));
        assert_eq!(folder.folded(), 3);
    }

    #[test]
    fn folds_inside_routine_bodies_and_indices() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let row = b.array_type(3, types::INTEGER);
        let index = b.binary(BinaryOp::Sub, b.int(2), b.int(1), types::INTEGER);
        let body = b.assign(b.subscript(b.name("r", row), index), b.int(0));
        let p = b.proc_decl("p", &[b.var_param("r", row)], body);
        let program = b.program(b.let_stmt(&[p], b.block(&[])));

        let expected_body = b.assign(b.subscript(b.name("r", row), b.int(1)), b.int(0));
        let expected_p = b.proc_decl("p", &[b.var_param("r", row)], expected_body);
        assert_eq!(
            fold(&arena, &program),
            b.program(b.let_stmt(&[expected_p], b.block(&[])))
        );
    }
}
