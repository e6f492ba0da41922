//! Identifier lowering: addresses, loads and stores.
//!
//! An identifier denotes a location. When the location is fixed at compile
//! time it is a display-relative [`Address`]; otherwise (through a var
//! parameter, or after subscripting) its address is computed onto the
//! stack and accessed indirectly.

use triangle_ast::{Identifier, RecordAccess};
use triangle_core::{CompilationError, RuntimeType};

use crate::bytecode::{Address, Instruction, Primitive};
use crate::scope::VarBinding;

use super::{CodeGenerator, Result, displacement};

/// Where a storage location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Location {
    /// At a statically known address.
    Static(Address),
    /// At the address on top of the stack.
    Dynamic,
}

impl CodeGenerator {
    /// Emit code leaving the value of `id` on the stack.
    pub(super) fn compile_fetch(&mut self, id: &Identifier<'_>) -> Result<()> {
        if let Identifier::Basic(basic) = id {
            let resolved = self.scope.resolve_value(&basic.ident)?;
            if let VarBinding::Known(value) = resolved.binding {
                self.emitter.emit(Instruction::LoadL(value));
                return Ok(());
            }
        }

        let size = id.ty().size();
        match self.compile_location(id)? {
            Location::Static(address) => self.emitter.emit(Instruction::Load { size, address }),
            Location::Dynamic => self.emitter.emit(Instruction::LoadI(size)),
        }
        Ok(())
    }

    /// Emit code leaving the address of `id` on the stack.
    pub(super) fn compile_address(&mut self, id: &Identifier<'_>) -> Result<()> {
        if let Location::Static(address) = self.compile_location(id)? {
            self.emitter.emit(Instruction::LoadA(address));
        }
        Ok(())
    }

    /// Store the `size` words on top of the stack into `target`.
    ///
    /// Those words stay on the stack while the target address is computed.
    pub(super) fn compile_store(&mut self, target: &Identifier<'_>, size: u32) -> Result<()> {
        let location = self.with_temporary(size, target.span(), |g| g.compile_location(target))?;
        match location {
            Location::Static(address) => self.emitter.emit(Instruction::Store { size, address }),
            Location::Dynamic => self.emitter.emit(Instruction::StoreI(size)),
        }
        Ok(())
    }

    /// Resolve `id` to a location, emitting whatever address arithmetic a
    /// dynamic location needs.
    pub(super) fn compile_location(&mut self, id: &Identifier<'_>) -> Result<Location> {
        match id {
            Identifier::Basic(basic) => {
                let resolved = self.scope.resolve_value(&basic.ident)?;
                match resolved.binding {
                    VarBinding::Stored(offset) => Ok(Location::Static(self.frame_address(
                        &basic.ident,
                        resolved.depth,
                        offset,
                    ))),
                    VarBinding::Reference(offset) => {
                        let address = self.frame_address(&basic.ident, resolved.depth, offset);
                        self.emitter.emit(Instruction::Load { size: 1, address });
                        Ok(Location::Dynamic)
                    }
                    VarBinding::Known(_) => Err(CompilationError::unsupported(
                        format!("storage for constant '{}'", basic.ident.name),
                        basic.ident.span,
                    )),
                }
            }
            Identifier::Field(access) => self.compile_field_location(access),
            Identifier::Subscript(subscript) => {
                if let Location::Static(base) = self.compile_location(&subscript.array)? {
                    self.emitter.emit(Instruction::LoadA(base));
                }
                self.with_temporary(1, subscript.span, |g| g.compile_expr(&subscript.index))?;

                let elem_size = subscript.ty.size();
                if elem_size != 1 {
                    let elem_size = displacement(elem_size, subscript.span)?;
                    self.emitter.emit(Instruction::LoadL(elem_size));
                    self.emitter.emit_primitive(Primitive::Mult);
                }
                self.emitter.emit_primitive(Primitive::Add);
                Ok(Location::Dynamic)
            }
        }
    }

    fn compile_field_location(&mut self, access: &RecordAccess<'_>) -> Result<Location> {
        let record_ty = access.record.ty();
        let Some((offset, _)) = record_ty.field(access.field.name) else {
            return Err(no_such_field(record_ty, access));
        };

        let offset = displacement(offset, access.span)?;
        match self.compile_location(&access.record)? {
            Location::Static(base) => Ok(Location::Static(base.offset_by(offset))),
            Location::Dynamic => {
                if offset > 0 {
                    self.emitter.emit(Instruction::LoadL(offset));
                    self.emitter.emit_primitive(Primitive::Add);
                }
                Ok(Location::Dynamic)
            }
        }
    }
}

fn no_such_field(record_ty: RuntimeType<'_>, access: &RecordAccess<'_>) -> CompilationError {
    CompilationError::Internal {
        message: format!("type {record_ty} has no field '{}'", access.field.name),
        span: access.span,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_with;
    use crate::bytecode::{Address, Instruction, Primitive, Register};
    use triangle_ast::types;

    #[test]
    fn maxint_is_an_immediate() {
        let unit = compile_with(|b| b.program(b.expr_stmt(b.var("maxint", types::INTEGER))));
        assert_eq!(
            unit.instructions,
            vec![Instruction::LoadL(32767), Instruction::Halt]
        );
    }

    #[test]
    fn record_fields_are_static_displacements() {
        let unit = compile_with(|b| {
            let point = b.record_type(&[("x", types::INTEGER), ("y", types::INTEGER)]);
            let y = b.field(b.name("p", point), "y");
            let body = b.assign(y, b.int(4));
            b.program(b.let_stmt(&[b.var_decl("p", point)], body))
        });
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Push(2),
                Instruction::LoadL(4),
                Instruction::Store {
                    size: 1,
                    address: Address::new(Register::LB, 1)
                },
                Instruction::Pop {
                    result: 0,
                    count: 2
                },
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn subscripts_scale_by_element_size() {
        let unit = compile_with(|b| {
            let pair = b.record_type(&[("a", types::INTEGER), ("b", types::BOOLEAN)]);
            let pairs = b.array_type(3, pair);
            let flag = b.field(b.subscript(b.name("v", pairs), b.int(2)), "b");
            let body = b.expr_stmt(b.value(flag));
            b.program(b.let_stmt(&[b.var_decl("v", pairs)], body))
        });
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Push(6),
                Instruction::LoadA(Address::new(Register::LB, 0)),
                Instruction::LoadL(2),
                Instruction::LoadL(2),
                Instruction::CallPrimitive(Primitive::Mult),
                Instruction::CallPrimitive(Primitive::Add),
                Instruction::LoadL(1),
                Instruction::CallPrimitive(Primitive::Add),
                Instruction::LoadI(1),
                Instruction::Pop {
                    result: 0,
                    count: 1
                },
                Instruction::Pop {
                    result: 0,
                    count: 6
                },
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn word_elements_skip_scaling() {
        let unit = compile_with(|b| {
            let row = b.array_type(4, types::INTEGER);
            let cell = b.subscript(b.name("r", row), b.int(1));
            b.program(b.let_stmt(&[b.var_decl("r", row)], b.assign(cell, b.int(9))))
        });
        assert_eq!(
            unit.instructions,
            vec![
                Instruction::Push(4),
                Instruction::LoadL(9),
                Instruction::LoadA(Address::new(Register::LB, 0)),
                Instruction::LoadL(1),
                Instruction::CallPrimitive(Primitive::Add),
                Instruction::StoreI(1),
                Instruction::Pop {
                    result: 0,
                    count: 4
                },
                Instruction::Halt,
            ]
        );
    }
}
