//! Routine calls.
//!
//! Arguments are pushed in order, each according to its parameter kind:
//! a value, an address (var parameter), or a two-word closure of static
//! link and code address (routine parameter). The call itself takes one
//! of three forms depending on how the callee is bound.

use triangle_ast::{Arg, CallExpr, Ident};
use triangle_core::{CompilationError, RuntimeType};

use crate::bytecode::Instruction;
use crate::scope::RoutineBinding;

use super::{CodeGenerator, Result};

impl CodeGenerator {
    pub(super) fn compile_call(&mut self, call: &CallExpr<'_>) -> Result<()> {
        let mut pending = 0;
        for arg in call.args {
            self.with_temporary(pending, call.span, |g| g.compile_arg(arg))?;
            pending = pending.saturating_add(arg.size());
        }

        let callee = self.scope.resolve_routine(&call.callee)?;
        match callee.binding {
            RoutineBinding::Label(label) => {
                let static_link = self.display(&call.callee, callee.depth);
                self.emitter.emit(Instruction::Call { static_link, label });
            }
            RoutineBinding::Closure(offset) => {
                let address = self.frame_address(&call.callee, callee.depth, offset);
                self.emitter.emit(Instruction::Load {
                    size: RuntimeType::CLOSURE_SIZE,
                    address,
                });
                self.emitter.emit(Instruction::CallI);
            }
            RoutineBinding::Primitive(primitive) => self.emitter.emit_primitive(primitive),
        }
        Ok(())
    }

    fn compile_arg(&mut self, arg: &Arg<'_>) -> Result<()> {
        match arg {
            Arg::Value(expr) => self.compile_expr(expr),
            Arg::Var(id) => self.compile_address(id),
            Arg::Func(name) => self.compile_closure(name),
        }
    }

    /// Push the closure for the routine called `name`.
    fn compile_closure(&mut self, name: &Ident<'_>) -> Result<()> {
        let routine = self.scope.resolve_routine(name)?;
        match routine.binding {
            RoutineBinding::Label(label) => {
                let frame = self.frame_address(name, routine.depth, 0);
                self.emitter.emit(Instruction::LoadA(frame));
                self.emitter.emit(Instruction::LoadALabel(label));
            }
            RoutineBinding::Closure(offset) => {
                let address = self.frame_address(name, routine.depth, offset);
                self.emitter.emit(Instruction::Load {
                    size: RuntimeType::CLOSURE_SIZE,
                    address,
                });
            }
            RoutineBinding::Primitive(_) => {
                return Err(CompilationError::unsupported(
                    format!("passing built-in routine '{}' as an argument", name.name),
                    name.span,
                ));
            }
        }
        Ok(())
    }
}
