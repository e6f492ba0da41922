//! Expression lowering.
//!
//! Every expression leaves exactly `ty().size()` words on the stack.

use triangle_ast::{BinaryExpr, Expr, IfExpr, LiteralExpr, LiteralKind, UnaryExpr};
use triangle_core::CompilationError;

use crate::bytecode::Instruction;
use crate::std_env::{binary_primitive, unary_primitive};

use super::{CodeGenerator, Result, displacement};

impl CodeGenerator {
    /// Emit code leaving the value of `expr` on the stack.
    pub(super) fn compile_expr(&mut self, expr: &Expr<'_>) -> Result<()> {
        match expr {
            Expr::Literal(literal) => self.compile_literal(literal),
            Expr::Ident(id) => self.compile_fetch(id),
            Expr::Binary(binary) => self.compile_binary(binary),
            Expr::Unary(unary) => self.compile_unary(unary),
            Expr::Call(call) => self.compile_call(call),
            Expr::If(if_expr) => self.compile_if_expr(if_expr),
            Expr::Let(let_expr) => {
                let result_size = let_expr.ty.size();
                self.compile_let(let_expr.decls, result_size, |g| g.compile_expr(&let_expr.body))
            }
            Expr::Sequence(sequence) => {
                for stmt in sequence.stmts {
                    self.compile_stmt(stmt)?;
                }
                self.compile_expr(&sequence.result)
            }
        }
    }

    /// Evaluate `operands` left to right. Each result stays on the stack
    /// beneath the ones after it.
    pub(super) fn compile_operands<'ast>(
        &mut self,
        operands: impl IntoIterator<Item = Expr<'ast>>,
    ) -> Result<()> {
        let mut pending = 0;
        for operand in operands {
            self.with_temporary(pending, operand.span(), |g| g.compile_expr(&operand))?;
            pending = pending.saturating_add(operand.ty().size());
        }
        Ok(())
    }

    fn compile_literal(&mut self, literal: &LiteralExpr<'_>) -> Result<()> {
        match literal.kind {
            LiteralKind::Int(value) => self.emitter.emit(Instruction::LoadL(value)),
            LiteralKind::Char(value) => self.emitter.emit(Instruction::LoadL(value as i32)),
            LiteralKind::Bool(value) => self.emitter.emit(Instruction::LoadL(i32::from(value))),
            LiteralKind::Array(elements) => self.compile_operands(elements.iter().copied())?,
            LiteralKind::Record(fields) => {
                self.compile_operands(fields.iter().map(|field| field.value))?
            }
        }
        Ok(())
    }

    fn compile_binary(&mut self, binary: &BinaryExpr<'_>) -> Result<()> {
        let operand_size = binary.left.ty().size();
        if !binary.op.is_equality() && !(binary.left.ty().is_word() && binary.right.ty().is_word()) {
            return Err(CompilationError::unsupported(
                format!("operator '{}' on {}-word operands", binary.op.as_str(), operand_size),
                binary.span,
            ));
        }

        self.compile_operands([binary.left, binary.right])?;
        if binary.op.is_equality() {
            self.emitter.emit(Instruction::LoadL(displacement(operand_size, binary.span)?));
        }
        self.emitter.emit_primitive(binary_primitive(binary.op));
        Ok(())
    }

    fn compile_unary(&mut self, unary: &UnaryExpr<'_>) -> Result<()> {
        if !unary.operand.ty().is_word() {
            return Err(CompilationError::unsupported(
                format!("operator '{}' on a {} operand", unary.op.as_str(), unary.operand.ty()),
                unary.span,
            ));
        }

        self.compile_expr(&unary.operand)?;
        self.emitter.emit_primitive(unary_primitive(unary.op));
        Ok(())
    }

    /// Lower `if c then t else e`.
    ///
    /// ```text
    /// [condition]
    /// JUMPIF (0) else
    /// [then]
    /// JUMP end
    /// else:
    /// [else]
    /// end:
    /// ```
    fn compile_if_expr(&mut self, if_expr: &IfExpr<'_>) -> Result<()> {
        let else_label = self.emitter.fresh_label();
        let end_label = self.emitter.fresh_label();

        self.compile_expr(&if_expr.condition)?;
        self.emitter.emit_jump_if(false, else_label);
        self.compile_expr(&if_expr.then_expr)?;
        self.emitter.emit_jump(end_label);
        self.emitter.place(else_label);
        self.compile_expr(&if_expr.else_expr)?;
        self.emitter.place(end_label);
        Ok(())
    }
}
