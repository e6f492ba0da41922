//! Triangle's standard environment.
//!
//! Every program is compiled inside an outermost frame holding the
//! predeclared constant `maxint` and the I/O and conversion routines, all of
//! which map straight onto machine primitives. Operators map the same way.

use triangle_ast::{BinaryOp, UnaryOp};

use crate::bytecode::Primitive;
use crate::scope::{RoutineBinding, Scope, VarBinding};

/// The largest integer the machine represents.
pub const MAXINT: i32 = 32767;

/// Predeclared routines and the primitive implementing each.
pub const ROUTINES: &[(&str, Primitive)] = &[
    ("chr", Primitive::Id),
    ("ord", Primitive::Id),
    ("eof", Primitive::Eof),
    ("eol", Primitive::Eol),
    ("get", Primitive::Get),
    ("put", Primitive::Put),
    ("getint", Primitive::Getint),
    ("putint", Primitive::Putint),
    ("geteol", Primitive::Geteol),
    ("puteol", Primitive::Puteol),
];

/// Bind the standard environment in the innermost frame of `scope`.
pub fn install(scope: &mut Scope) {
    scope.bind_value("maxint", VarBinding::Known(MAXINT));
    for &(name, primitive) in ROUTINES {
        scope.bind_routine(name, RoutineBinding::Primitive(primitive));
    }
}

/// Whether `name` is a predeclared routine.
pub fn is_standard_routine(name: &str) -> bool {
    ROUTINES.iter().any(|(routine, _)| *routine == name)
}

/// The primitive implementing a binary operator.
pub fn binary_primitive(op: BinaryOp) -> Primitive {
    match op {
        BinaryOp::Add => Primitive::Add,
        BinaryOp::Sub => Primitive::Sub,
        BinaryOp::Mul => Primitive::Mult,
        BinaryOp::Div => Primitive::Div,
        BinaryOp::Mod => Primitive::Mod,
        BinaryOp::Less => Primitive::Lt,
        BinaryOp::LessEqual => Primitive::Le,
        BinaryOp::Greater => Primitive::Gt,
        BinaryOp::GreaterEqual => Primitive::Ge,
        BinaryOp::Equal => Primitive::Eq,
        BinaryOp::NotEqual => Primitive::Ne,
        BinaryOp::And => Primitive::And,
        BinaryOp::Or => Primitive::Or,
    }
}

/// The primitive implementing a unary operator.
pub fn unary_primitive(op: UnaryOp) -> Primitive {
    match op {
        UnaryOp::Neg => Primitive::Neg,
        UnaryOp::Not => Primitive::Not,
    }
}
