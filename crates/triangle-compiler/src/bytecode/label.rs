//! Symbolic code labels.

use std::fmt;

/// A position in the instruction stream, placed with
/// [`Instruction::Label`](super::Instruction::Label).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Hands out labels from a strictly increasing counter.
///
/// Each code generator owns one, so separate compilations never share
/// label numbers.
#[derive(Debug)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    /// Create an allocator starting at `L1`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// A label never returned before by this allocator.
    pub fn fresh(&mut self) -> Label {
        let label = Label(self.next);
        self.next += 1;
        label
    }

    /// How many labels have been handed out.
    pub fn allocated(&self) -> u32 {
        self.next - 1
    }
}

impl Default for LabelAllocator {
    fn default() -> Self {
        Self::new()
    }
}
