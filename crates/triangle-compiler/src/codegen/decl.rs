//! Declaration lowering and routine layout.
//!
//! A routine's activation record looks like this, relative to `LB`:
//!
//! ```text
//!  -P .. -1   arguments, pushed by the caller in declaration order
//!   0         static link
//!   1         dynamic link
//!   2         return address
//!   3 ..      locals and temporaries
//! ```

use tracing::debug;
use triangle_ast::{Decl, Ident, Param, params_size};

use crate::bytecode::Instruction;
use crate::scope::{FrameKind, RoutineBinding, VarBinding};

use super::{CodeGenerator, Result, displacement};

/// Words of link data at the base of every routine activation.
pub const LINK_DATA_SIZE: i32 = 3;

impl CodeGenerator {
    /// Lay out `decls` in the current frame, in order.
    ///
    /// Returns the number of stack words they occupy.
    pub(super) fn compile_decls(&mut self, decls: &[Decl<'_>]) -> Result<u32> {
        let mut allocated = 0;
        for decl in decls {
            allocated += self.compile_decl(decl)?;
        }
        Ok(allocated)
    }

    fn compile_decl(&mut self, decl: &Decl<'_>) -> Result<u32> {
        match decl {
            Decl::Const(const_decl) => {
                let size = const_decl.value.ty().size();
                self.compile_expr(&const_decl.value)?;
                let offset = self.scope.allocate(size, const_decl.span)?;
                self.scope.bind_value(const_decl.name.name, VarBinding::Stored(offset));
                Ok(size)
            }
            Decl::Var(var_decl) => {
                let size = var_decl.ty.size();
                let offset = self.scope.allocate(size, var_decl.span)?;
                self.emitter.emit_push(size);
                self.scope.bind_value(var_decl.name.name, VarBinding::Stored(offset));
                Ok(size)
            }
            Decl::Type(_) => Ok(0),
            Decl::Func(func) => {
                let result_size = func.ret.size();
                displacement(result_size, func.span)?;
                self.compile_routine(&func.name, func.params, result_size, |g| {
                    g.compile_expr(&func.body)
                })?;
                Ok(0)
            }
            Decl::Proc(proc) => {
                self.compile_routine(&proc.name, proc.params, 0, |g| g.compile_stmt(&proc.body))?;
                Ok(0)
            }
        }
    }

    /// Emit a routine body out of line.
    ///
    /// ```text
    /// JUMP skip
    /// entry:
    /// [body]
    /// RETURN (result) args
    /// skip:
    /// ```
    ///
    /// The name is bound before the body is compiled so the body can call
    /// itself.
    fn compile_routine(
        &mut self,
        name: &Ident<'_>,
        params: &[Param<'_>],
        result_size: u32,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let skip = self.emitter.fresh_label();
        let entry = self.emitter.fresh_label();
        let args = params_size(params);
        debug!(routine = name.name, %entry, args, result_size, "compiling routine");

        self.emitter.emit_jump(skip);
        self.emitter.place(entry);
        self.scope.bind_routine(name.name, RoutineBinding::Label(entry));

        self.with_scope(FrameKind::Level, LINK_DATA_SIZE, |g| {
            g.bind_params(name, params)?;
            body(g)?;
            g.emitter.emit(Instruction::Return {
                result: result_size,
                args,
            });
            Ok(())
        })?;

        self.emitter.place(skip);
        Ok(())
    }

    /// Bind each parameter to its slot beneath the frame base.
    fn bind_params(&mut self, routine: &Ident<'_>, params: &[Param<'_>]) -> Result<()> {
        let mut offset = -displacement(params_size(params), routine.span)?;
        for param in params {
            match param {
                Param::Value(value) => self.scope.bind_value(value.name.name, VarBinding::Stored(offset)),
                Param::Var(var) => self.scope.bind_value(var.name.name, VarBinding::Reference(offset)),
                Param::Func(func) => self.scope.bind_routine(func.name.name, RoutineBinding::Closure(offset)),
            }
            offset += displacement(param.size(), routine.span)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::generate;
    use super::super::test_support::compile_with;
    use crate::bytecode::{Address, Instruction, Label, Primitive, Register};
    use bumpalo::Bump;
    use triangle_ast::{Arg, AstBuilder, BinaryOp, Decl, types};
    use triangle_core::CompilationError;

    /// Generate `let decls in y := 1`, with `y` declared last.
    fn assign_after(build: impl for<'a> FnOnce(&AstBuilder<'a>) -> Vec<Decl<'a>>) -> Result<(), CompilationError> {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut decls = build(&b);
        decls.push(b.var_decl("y", types::INTEGER));
        let body = b.assign(b.name("y", types::INTEGER), b.int(1));
        generate(&b.program(b.let_stmt(&decls, body))).map(|_| ())
    }

    fn assert_frame_overflow(result: Result<(), CompilationError>) {
        match result {
            Err(err @ CompilationError::UnsupportedConstruct { .. }) => {
                assert!(err.to_string().contains("exceeds addressable frame size"), "{err}");
            }
            other => panic!("expected a frame overflow, got {other:?}"),
        }
    }

    #[test]
    fn routine_body_is_skipped_and_returns() {
        // let func id(n: Integer): Integer ~ n in putint(id(4))
        let unit = compile_with(|b| {
            let id = b.func_decl(
                "id",
                &[b.value_param("n", types::INTEGER)],
                types::INTEGER,
                b.var("n", types::INTEGER),
            );
            let call = b.call("id", &[Arg::Value(b.int(4))], types::INTEGER);
            let print = b.call("putint", &[Arg::Value(call)], types::VOID);
            b.program(b.let_stmt(&[id], b.expr_stmt(print)))
        });
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Jump(Label(1)),
                Instruction::Label(Label(2)),
                Instruction::Load {
                    size: 1,
                    address: Address::new(Register::LB, -1)
                },
                Instruction::Return { result: 1, args: 1 },
                Instruction::Label(Label(1)),
                Instruction::LoadL(4),
                Instruction::Call {
                    static_link: Register::LB,
                    label: Label(2)
                },
                Instruction::CallPrimitive(Primitive::Putint),
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn parameters_sit_below_the_frame() {
        // proc p(a: Integer, var r: Integer, b: Integer) ~ r := a + b
        let unit = compile_with(|b| {
            let int = types::INTEGER;
            let sum = b.binary(BinaryOp::Add, b.var("a", int), b.var("b", int), int);
            let body = b.assign(b.name("r", int), sum);
            let params = [
                b.value_param("a", int),
                b.var_param("r", int),
                b.value_param("b", int),
            ];
            let p = b.proc_decl("p", &params, body);
            b.program(b.let_stmt(&[p], b.block(&[])))
        });
        assert_eq!(
            unit.instructions[2..7],
            [
                Instruction::Load {
                    size: 1,
                    address: Address::new(Register::LB, -3)
                },
                Instruction::Load {
                    size: 1,
                    address: Address::new(Register::LB, -1)
                },
                Instruction::CallPrimitive(Primitive::Add),
                Instruction::Load {
                    size: 1,
                    address: Address::new(Register::LB, -2)
                },
                Instruction::StoreI(1),
            ]
        );
        assert_eq!(unit.instructions[7], Instruction::Return { result: 0, args: 3 });
    }

    #[test]
    fn locals_start_after_link_data() {
        let unit = compile_with(|b| {
            let body = b.let_stmt(
                &[b.var_decl("t", types::INTEGER)],
                b.assign(b.name("t", types::INTEGER), b.int(0)),
            );
            let p = b.proc_decl("p", &[], body);
            b.program(b.let_stmt(&[p], b.block(&[])))
        });
        assert!(unit.instructions.contains(&Instruction::Store {
            size: 1,
            address: Address::new(Register::LB, 3)
        }));
    }

    #[test]
    fn recursive_call_uses_enclosing_frame() {
        // let func f(n: Integer): Integer ~ f(n) in 0
        let unit = compile_with(|b| {
            let call = b.call("f", &[Arg::Value(b.var("n", types::INTEGER))], types::INTEGER);
            let f = b.func_decl("f", &[b.value_param("n", types::INTEGER)], types::INTEGER, call);
            b.program(b.let_stmt(&[f], b.block(&[])))
        });
        assert!(unit.instructions.contains(&Instruction::Call {
            static_link: Register::L1,
            label: Label(2)
        }));
    }

    #[test]
    fn outer_variables_are_reached_through_the_display() {
        // let var g: Integer; proc p() ~ g := 1 in p()
        let unit = compile_with(|b| {
            let p = b.proc_decl("p", &[], b.assign(b.name("g", types::INTEGER), b.int(1)));
            let call = b.expr_stmt(b.call("p", &[], types::VOID));
            b.program(b.let_stmt(&[b.var_decl("g", types::INTEGER), p], call))
        });
        assert!(unit.instructions.contains(&Instruction::Store {
            size: 1,
            address: Address::new(Register::L1, 0)
        }));
    }

    #[test]
    fn locals_larger_than_a_frame_are_rejected() {
        // let var x: array 3000000000 of Integer; var y: Integer in y := 1
        assert_frame_overflow(assign_after(|b| {
            vec![b.var_decl("x", b.array_type(3_000_000_000, types::INTEGER))]
        }));
    }

    #[test]
    fn locals_that_together_outgrow_the_frame_are_rejected() {
        assert_frame_overflow(assign_after(|b| {
            let half = b.array_type(2_000_000_000, types::INTEGER);
            vec![b.var_decl("a", half), b.var_decl("b", half)]
        }));
    }

    #[test]
    fn overflowing_type_sizes_are_rejected() {
        assert_frame_overflow(assign_after(|b| {
            let row = b.array_type(70_000, types::INTEGER);
            vec![b.var_decl("grid", b.array_type(70_000, row))]
        }));
    }

    #[test]
    fn oversized_parameters_are_rejected() {
        // proc p(a: array 3000000000 of Integer) ~ ()
        assert_frame_overflow(assign_after(|b| {
            let huge = b.array_type(3_000_000_000, types::INTEGER);
            vec![b.proc_decl("p", &[b.value_param("a", huge)], b.block(&[]))]
        }));
    }
}
