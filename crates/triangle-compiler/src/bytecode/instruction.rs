//! TAM instructions.
//!
//! The generator appends these to a flat sequence. Labels stay symbolic;
//! turning them into code offsets, encoding, and execution happen
//! downstream.

use std::fmt;

use super::{Address, Label, Primitive, Register};

/// One instruction of the abstract machine.
///
/// Sizes are in words. Displays in TAM assembly notation, e.g.
/// `LOAD (1) 3[LB]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Reserve `n` uninitialised words on the stack.
    Push(u32),
    /// Discard `count` words beneath the top `result` words.
    Pop {
        /// Words kept on top.
        result: u32,
        /// Words discarded beneath them.
        count: u32,
    },
    /// Push `size` words read from `address`.
    Load {
        /// Words copied.
        size: u32,
        /// Source.
        address: Address,
    },
    /// Push an address as a value.
    LoadA(Address),
    /// Pop an address, push `n` words read from it.
    LoadI(u32),
    /// Push an immediate.
    LoadL(i32),
    /// Push the code address of a label.
    LoadALabel(Label),
    /// Pop `size` words into `address`.
    Store {
        /// Words copied.
        size: u32,
        /// Destination.
        address: Address,
    },
    /// Pop an address, then pop `n` words into it.
    StoreI(u32),
    /// Call the routine at `label`, passing `static_link` as its static link.
    Call {
        /// Frame of the routine's enclosing level.
        static_link: Register,
        /// Routine entry.
        label: Label,
    },
    /// Pop a closure (static link, code address) and call it.
    CallI,
    /// Call a machine primitive.
    CallPrimitive(Primitive),
    /// Leave the current routine.
    Return {
        /// Words of result kept.
        result: u32,
        /// Words of arguments discarded.
        args: u32,
    },
    /// Unconditional jump.
    Jump(Label),
    /// Pop a word; jump if it equals `when`.
    JumpIf {
        /// Value that triggers the jump.
        when: bool,
        /// Target.
        label: Label,
    },
    /// Marks the position of a label.
    Label(Label),
    /// Stop the machine.
    Halt,
}

impl Instruction {
    /// The target, if this instruction transfers control to a label.
    pub fn jump_target(&self) -> Option<Label> {
        match self {
            Instruction::Jump(label) | Instruction::JumpIf { label, .. } => Some(*label),
            Instruction::Call { label, .. } => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(n) => write!(f, "PUSH {n}"),
            Instruction::Pop { result, count } => write!(f, "POP ({result}) {count}"),
            Instruction::Load { size, address } => write!(f, "LOAD ({size}) {address}"),
            Instruction::LoadA(address) => write!(f, "LOADA {address}"),
            Instruction::LoadI(n) => write!(f, "LOADI ({n})"),
            Instruction::LoadL(value) => write!(f, "LOADL {value}"),
            Instruction::LoadALabel(label) => write!(f, "LOADA {label}[CB]"),
            Instruction::Store { size, address } => write!(f, "STORE ({size}) {address}"),
            Instruction::StoreI(n) => write!(f, "STOREI ({n})"),
            Instruction::Call { static_link, label } => write!(f, "CALL ({static_link}) {label}[CB]"),
            Instruction::CallI => f.write_str("CALLI"),
            Instruction::CallPrimitive(primitive) => write!(f, "CALL {primitive}"),
            Instruction::Return { result, args } => write!(f, "RETURN ({result}) {args}"),
            Instruction::Jump(label) => write!(f, "JUMP {label}[CB]"),
            Instruction::JumpIf { when, label } => {
                write!(f, "JUMPIF ({}) {label}[CB]", i32::from(*when))
            }
            Instruction::Label(label) => write!(f, "{label}:"),
            Instruction::Halt => f.write_str("HALT"),
        }
    }
}
