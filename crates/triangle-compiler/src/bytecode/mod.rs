//! The target machine's instruction set.
//!
//! - [`Instruction`] - one TAM instruction, immutable once emitted
//! - [`Address`] and [`Register`] - display-relative data addressing
//! - [`Label`] - symbolic code positions, resolved by a later linking step
//! - [`Primitive`] - routines built into the machine

mod address;
mod instruction;
mod label;
mod primitive;

pub use address::{Address, Register};
pub use instruction::Instruction;
pub use label::{Label, LabelAllocator};
pub use primitive::Primitive;
