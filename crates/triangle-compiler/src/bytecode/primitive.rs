//! Machine primitives.
//!
//! TAM implements arithmetic, comparison and I/O as routines at fixed
//! displacements from the primitive base register `PB`. A call to one of
//! these needs no static link.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A primitive routine, numbered by its displacement from `PB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Primitive {
    /// Identity.
    Id = 1,
    /// Boolean negation.
    Not,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Successor.
    Succ,
    /// Predecessor.
    Pred,
    /// Integer negation.
    Neg,
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mult,
    /// Integer division.
    Div,
    /// Integer remainder.
    Mod,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than or equal.
    Ge,
    /// Greater than.
    Gt,
    /// Equality of two n-word values; n is pushed last.
    Eq,
    /// Inequality of two n-word values; n is pushed last.
    Ne,
    /// End of line on input.
    Eol,
    /// End of input.
    Eof,
    /// Read a character into an address.
    Get,
    /// Write a character.
    Put,
    /// Skip to the next input line.
    Geteol,
    /// Write a newline.
    Puteol,
    /// Read an integer into an address.
    Getint,
    /// Write an integer.
    Putint,
}

impl Primitive {
    /// Displacement from `PB`.
    pub fn displacement(self) -> u8 {
        self.into()
    }

    /// Assembly name.
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Id => "id",
            Primitive::Not => "not",
            Primitive::And => "and",
            Primitive::Or => "or",
            Primitive::Succ => "succ",
            Primitive::Pred => "pred",
            Primitive::Neg => "neg",
            Primitive::Add => "add",
            Primitive::Sub => "sub",
            Primitive::Mult => "mult",
            Primitive::Div => "div",
            Primitive::Mod => "mod",
            Primitive::Lt => "lt",
            Primitive::Le => "le",
            Primitive::Ge => "ge",
            Primitive::Gt => "gt",
            Primitive::Eq => "eq",
            Primitive::Ne => "ne",
            Primitive::Eol => "eol",
            Primitive::Eof => "eof",
            Primitive::Get => "get",
            Primitive::Put => "put",
            Primitive::Geteol => "geteol",
            Primitive::Puteol => "puteol",
            Primitive::Getint => "getint",
            Primitive::Putint => "putint",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacements_match_the_machine() {
        assert_eq!(Primitive::Id.displacement(), 1);
        assert_eq!(Primitive::Add.displacement(), 8);
        assert_eq!(Primitive::Eq.displacement(), 17);
        assert_eq!(Primitive::Putint.displacement(), 26);
    }

    #[test]
    fn decode_from_displacement() {
        assert_eq!(Primitive::try_from(10u8).ok(), Some(Primitive::Mult));
        assert!(Primitive::try_from(0u8).is_err());
        assert!(Primitive::try_from(27u8).is_err());
    }
}
