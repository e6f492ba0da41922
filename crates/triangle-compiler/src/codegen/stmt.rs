//! Command lowering.
//!
//! Commands leave the stack as they found it.

use triangle_ast::{Decl, IfStmt, LoopWhileStmt, RepeatStmt, Stmt, WhileStmt};

use crate::scope::FrameKind;

use super::{CodeGenerator, Result};

impl CodeGenerator {
    /// Emit code for one command.
    pub(super) fn compile_stmt(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        match stmt {
            Stmt::Expr(expr_stmt) => {
                self.compile_expr(&expr_stmt.expr)?;
                self.emitter.emit_pop(0, expr_stmt.expr.ty().size());
                Ok(())
            }
            Stmt::Assign(assign) => {
                self.compile_expr(&assign.value)?;
                self.compile_store(&assign.target, assign.value.ty().size())
            }
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::Let(let_stmt) => self.compile_let(let_stmt.decls, 0, |g| g.compile_stmt(&let_stmt.body)),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::LoopWhile(loop_while) => self.compile_loop_while(loop_while),
            Stmt::RepeatUntil(repeat) => self.compile_repeat(repeat, false),
            Stmt::RepeatWhile(repeat) => self.compile_repeat(repeat, true),
            Stmt::Block(block) => {
                for stmt in block.stmts {
                    self.compile_stmt(stmt)?;
                }
                Ok(())
            }
        }
    }

    /// Lay out `decls` in a new block frame, run `body`, then drop the
    /// declared words from beneath the body's `result_size`-word result.
    pub(super) fn compile_let(
        &mut self,
        decls: &[Decl<'_>],
        result_size: u32,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let start = self.scope.next_offset();
        let allocated = self.with_scope(FrameKind::Block, start, |g| {
            let allocated = g.compile_decls(decls)?;
            body(g)?;
            Ok(allocated)
        })?;
        self.emitter.emit_pop(result_size, allocated);
        Ok(())
    }

    /// Lower `if`, with either branch optional.
    ///
    /// ```text
    /// [condition]
    /// JUMPIF (0) else
    /// [then]
    /// JUMP end        (only with an else branch)
    /// else:
    /// [else]
    /// end:
    /// ```
    fn compile_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        let else_label = self.emitter.fresh_label();
        let end_label = if_stmt.else_stmt.map(|_| self.emitter.fresh_label());

        self.compile_expr(&if_stmt.condition)?;
        self.emitter.emit_jump_if(false, else_label);
        if let Some(then_stmt) = if_stmt.then_stmt {
            self.compile_stmt(then_stmt)?;
        }

        match (if_stmt.else_stmt, end_label) {
            (Some(else_stmt), Some(end_label)) => {
                self.emitter.emit_jump(end_label);
                self.emitter.place(else_label);
                self.compile_stmt(else_stmt)?;
                self.emitter.place(end_label);
            }
            _ => self.emitter.place(else_label),
        }
        Ok(())
    }

    /// Lower `while C do B`.
    ///
    /// ```text
    /// top:
    /// [C]
    /// JUMPIF (0) exit
    /// [B]
    /// JUMP top
    /// exit:
    /// ```
    fn compile_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<()> {
        let top = self.emitter.fresh_label();
        let exit = self.emitter.fresh_label();

        self.emitter.place(top);
        self.compile_expr(&while_stmt.condition)?;
        self.emitter.emit_jump_if(false, exit);
        self.compile_stmt(&while_stmt.body)?;
        self.emitter.emit_jump(top);
        self.emitter.place(exit);
        Ok(())
    }

    /// Lower `loop B1 while C do B2`: like `while`, with `B1` run before
    /// every test of `C`.
    fn compile_loop_while(&mut self, loop_while: &LoopWhileStmt<'_>) -> Result<()> {
        let top = self.emitter.fresh_label();
        let exit = self.emitter.fresh_label();

        self.emitter.place(top);
        self.compile_stmt(&loop_while.before)?;
        self.compile_expr(&loop_while.condition)?;
        self.emitter.emit_jump_if(false, exit);
        self.compile_stmt(&loop_while.after)?;
        self.emitter.emit_jump(top);
        self.emitter.place(exit);
        Ok(())
    }

    /// Lower `repeat B until C` (`again_when` false) or `repeat B while C`
    /// (`again_when` true).
    ///
    /// ```text
    /// top:
    /// [B]
    /// [C]
    /// JUMPIF (again_when) top
    /// ```
    fn compile_repeat(&mut self, repeat: &RepeatStmt<'_>, again_when: bool) -> Result<()> {
        let top = self.emitter.fresh_label();

        self.emitter.place(top);
        self.compile_stmt(&repeat.body)?;
        self.compile_expr(&repeat.condition)?;
        self.emitter.emit_jump_if(again_when, top);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_with;
    use crate::bytecode::{Address, Instruction, Label, Register};
    use triangle_ast::types;

    fn x_at(offset: i32) -> Address {
        Address::new(Register::LB, offset)
    }

    #[test]
    fn let_var_assign() {
        // let var x: Integer in x := 5
        let unit = compile_with(|b| {
            let body = b.assign(b.name("x", types::INTEGER), b.int(5));
            b.program(b.let_stmt(&[b.var_decl("x", types::INTEGER)], body))
        });
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Push(1),
                Instruction::LoadL(5),
                Instruction::Store {
                    size: 1,
                    address: x_at(0)
                },
                Instruction::Pop {
                    result: 0,
                    count: 1
                },
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn two_branch_if() {
        let unit = compile_with(|b| {
            let then_stmt = b.expr_stmt(b.int(1));
            let else_stmt = b.expr_stmt(b.int(2));
            b.program(b.if_stmt(b.bool(true), Some(then_stmt), Some(else_stmt)))
        });
        let pop = Instruction::Pop {
            result: 0,
            count: 1,
        };
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::LoadL(1),
                Instruction::JumpIf {
                    when: false,
                    label: Label(1)
                },
                Instruction::LoadL(1),
                pop,
                Instruction::Jump(Label(2)),
                Instruction::Label(Label(1)),
                Instruction::LoadL(2),
                pop,
                Instruction::Label(Label(2)),
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn one_branch_if_falls_through() {
        let unit = compile_with(|b| b.program(b.if_stmt(b.bool(false), Some(b.block(&[])), None)));
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::LoadL(0),
                Instruction::JumpIf {
                    when: false,
                    label: Label(1)
                },
                Instruction::Label(Label(1)),
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn shadowed_names_resolve_innermost_then_outer() {
        // let var x in (x := 1; let var x in x := 2; x := 3)
        let unit = compile_with(|b| {
            let x = || b.name("x", types::INTEGER);
            let inner = b.let_stmt(&[b.var_decl("x", types::INTEGER)], b.assign(x(), b.int(2)));
            let body = b.block(&[b.assign(x(), b.int(1)), inner, b.assign(x(), b.int(3))]);
            b.program(b.let_stmt(&[b.var_decl("x", types::INTEGER)], body))
        });
        let stores: Vec<_> = unit
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Store { address, .. } => Some(address.offset),
                _ => None,
            })
            .collect();
        assert_eq!(stores, vec![0, 1, 0]);
    }

    #[test]
    fn while_loop_layout() {
        let unit = compile_with(|b| b.program(b.while_stmt(b.bool(true), b.block(&[]))));
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Label(Label(1)),
                Instruction::LoadL(1),
                Instruction::JumpIf {
                    when: false,
                    label: Label(2)
                },
                Instruction::Jump(Label(1)),
                Instruction::Label(Label(2)),
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn loop_while_tests_between_bodies() {
        let unit = compile_with(|b| {
            let before = b.expr_stmt(b.int(1));
            let after = b.expr_stmt(b.int(2));
            b.program(b.loop_while(before, b.bool(true), after))
        });
        let pop = Instruction::Pop {
            result: 0,
            count: 1,
        };
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Label(Label(1)),
                Instruction::LoadL(1),
                pop,
                Instruction::LoadL(1),
                Instruction::JumpIf {
                    when: false,
                    label: Label(2)
                },
                Instruction::LoadL(2),
                pop,
                Instruction::Jump(Label(1)),
                Instruction::Label(Label(2)),
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn repeat_forms_jump_back_on_opposite_flags() {
        let until = compile_with(|b| b.program(b.repeat_until(b.block(&[]), b.bool(true))));
        let while_ = compile_with(|b| b.program(b.repeat_while(b.block(&[]), b.bool(true))));

        let tail = |when| Instruction::JumpIf {
            when,
            label: Label(1),
        };
        assert_eq!(
            until.instructions,
            vec![
                Instruction::Label(Label(1)),
                Instruction::LoadL(1),
                tail(false),
                Instruction::Halt
            ]
        );
        assert_eq!(while_.instructions[2], tail(true));
    }

    #[test]
    fn empty_let_pops_nothing() {
        let unit = compile_with(|b| {
            let body = b.expr_stmt(b.int(1));
            b.program(b.let_stmt(&[b.type_decl("T", types::INTEGER)], body))
        });
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::LoadL(1),
                Instruction::Pop {
                    result: 0,
                    count: 1
                },
                Instruction::Halt,
            ]
        );
    }
}
