//! Instruction emitter for the Triangle code generator.
//!
//! The [`InstructionEmitter`] owns the instruction sequence being built and
//! the label allocator, and provides the small helpers the generator uses
//! for stack and control-flow instructions.
//!
//! # Example
//!
//! ```
//! use triangle_compiler::bytecode::{Instruction, Primitive};
//! use triangle_compiler::emit::InstructionEmitter;
//!
//! let mut emitter = InstructionEmitter::new();
//! emitter.emit(Instruction::LoadL(1));
//! emitter.emit(Instruction::LoadL(2));
//! emitter.emit_primitive(Primitive::Add);
//! emitter.emit(Instruction::Halt);
//!
//! assert_eq!(emitter.finish().len(), 4);
//! ```

use crate::bytecode::{Instruction, Label, LabelAllocator, Primitive};

/// Appends instructions in order. Nothing already emitted is ever changed.
#[derive(Debug, Default)]
pub struct InstructionEmitter {
    /// The instructions emitted so far
    code: Vec<Instruction>,

    /// Label source for this compilation unit
    labels: LabelAllocator,
}

impl InstructionEmitter {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instruction.
    pub fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    /// A label that has not been used in this unit.
    pub fn fresh_label(&mut self) -> Label {
        self.labels.fresh()
    }

    /// Mark the current position with `label`.
    pub fn place(&mut self, label: Label) {
        self.emit(Instruction::Label(label));
    }

    // ==========================================================================
    // Stack
    // ==========================================================================

    /// Reserve `words` of stack. Nothing is emitted for zero words.
    pub fn emit_push(&mut self, words: u32) {
        if words > 0 {
            self.emit(Instruction::Push(words));
        }
    }

    /// Discard `count` words beneath the top `result` words. Nothing is
    /// emitted when there is nothing to discard.
    pub fn emit_pop(&mut self, result: u32, count: u32) {
        if count > 0 {
            self.emit(Instruction::Pop { result, count });
        }
    }

    /// Call a machine primitive.
    pub fn emit_primitive(&mut self, primitive: Primitive) {
        self.emit(Instruction::CallPrimitive(primitive));
    }

    // ==========================================================================
    // Control flow
    // ==========================================================================

    /// Jump to `label`.
    pub fn emit_jump(&mut self, label: Label) {
        self.emit(Instruction::Jump(label));
    }

    /// Pop the condition and jump to `label` if it equals `when`.
    pub fn emit_jump_if(&mut self, when: bool, label: Label) {
        self.emit(Instruction::JumpIf { when, label });
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    /// Instructions emitted so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Number of instructions emitted so far.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Number of labels handed out so far.
    pub fn labels_allocated(&self) -> u32 {
        self.labels.allocated()
    }

    /// Hand over the finished sequence.
    pub fn finish(self) -> Vec<Instruction> {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_stack_operations_are_elided() {
        let mut emitter = InstructionEmitter::new();
        emitter.emit_push(0);
        emitter.emit_pop(1, 0);
        assert!(emitter.is_empty());

        emitter.emit_push(3);
        emitter.emit_pop(1, 3);
        assert_eq!(
            emitter.instructions(),
            &[
                Instruction::Push(3),
                Instruction::Pop {
                    result: 1,
                    count: 3
                }
            ]
        );
    }

    #[test]
    fn placed_labels_are_fresh() {
        let mut emitter = InstructionEmitter::new();
        let top = emitter.fresh_label();
        let exit = emitter.fresh_label();
        emitter.place(top);
        emitter.emit_jump_if(false, exit);
        emitter.emit_jump(top);
        emitter.place(exit);

        assert_ne!(top, exit);
        assert_eq!(emitter.labels_allocated(), 2);
        assert_eq!(emitter.len(), 4);
        assert_eq!(emitter.instructions()[0], Instruction::Label(top));
    }
}
