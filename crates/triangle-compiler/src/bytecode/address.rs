//! Display registers and data addresses.

use std::fmt;

/// A frame-pointer register of the display.
///
/// `LB` points at the current activation frame; `L1`..`L6` point at the
/// frames of the enclosing lexical levels, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Local base: the current frame.
    LB,
    /// One level out.
    L1,
    /// Two levels out.
    L2,
    /// Three levels out.
    L3,
    /// Four levels out.
    L4,
    /// Five levels out.
    L5,
    /// Six levels out.
    L6,
}

impl Register {
    /// Deepest enclosing level the display can address.
    pub const MAX_DEPTH: usize = 6;

    /// The register for a binding `depth` levels out.
    pub fn for_depth(depth: usize) -> Option<Register> {
        match depth {
            0 => Some(Register::LB),
            1 => Some(Register::L1),
            2 => Some(Register::L2),
            3 => Some(Register::L3),
            4 => Some(Register::L4),
            5 => Some(Register::L5),
            6 => Some(Register::L6),
            _ => None,
        }
    }

    /// The outermost display register.
    pub fn deepest() -> Register {
        Register::L6
    }

    /// Assembly name.
    pub fn as_str(self) -> &'static str {
        match self {
            Register::LB => "LB",
            Register::L1 => "L1",
            Register::L2 => "L2",
            Register::L3 => "L3",
            Register::L4 => "L4",
            Register::L5 => "L5",
            Register::L6 => "L6",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data address: a displacement from a display register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Base register.
    pub register: Register,
    /// Word displacement; negative for routine arguments.
    pub offset: i32,
}

impl Address {
    /// Create an address.
    pub fn new(register: Register, offset: i32) -> Self {
        Self { register, offset }
    }

    /// The address `words` further on.
    pub fn offset_by(self, words: i32) -> Self {
        Self {
            offset: self.offset + words,
            ..self
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.offset, self.register)
    }
}
