//! RuntimeType - the resolved, size-bearing type of a value.
//!
//! Every expression and identifier in the program tree carries one of these.
//! Named types have already been expanded by semantic analysis, so the
//! structure here is acyclic and purely structural. The aggregate variants
//! borrow their components from the tree's arena, which keeps the type
//! `Copy`.
//!
//! # Example
//!
//! ```
//! use triangle_core::{RecordField, RuntimeType};
//!
//! let fields = [
//!     RecordField::new("a", RuntimeType::Integer),
//!     RecordField::new("b", RuntimeType::Character),
//! ];
//! let point = RuntimeType::Record(&fields);
//! assert_eq!(point.size(), 2);
//! assert_eq!(point.field("b").map(|(offset, _)| offset), Some(1));
//! ```

use std::fmt::{self, Display, Formatter};

/// A resolved type. Sizes are measured in machine words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeType<'a> {
    /// One word.
    Integer,
    /// One word, 0 or 1.
    Boolean,
    /// One word holding a character code.
    Character,
    /// The result of a procedure. Zero words.
    Void,
    /// A routine value: a closure of code address and static link.
    Func {
        /// Parameter types in declaration order.
        params: &'a [RuntimeType<'a>],
        /// Result type (`Void` for procedures).
        ret: &'a RuntimeType<'a>,
    },
    /// `len` consecutive elements.
    Array {
        /// Element count.
        len: u32,
        /// Element type.
        elem: &'a RuntimeType<'a>,
    },
    /// Named fields laid out in declaration order without padding.
    Record(&'a [RecordField<'a>]),
}

/// One field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordField<'a> {
    /// Field name.
    pub name: &'a str,
    /// Field type.
    pub ty: RuntimeType<'a>,
}

impl<'a> RecordField<'a> {
    /// Create a field.
    pub const fn new(name: &'a str, ty: RuntimeType<'a>) -> Self {
        Self { name, ty }
    }
}

impl<'a> RuntimeType<'a> {
    /// Words in a closure.
    pub const CLOSURE_SIZE: u32 = 2;

    /// Storage size in words, or `None` if it does not fit in a `u32`.
    pub fn checked_size(&self) -> Option<u32> {
        match self {
            RuntimeType::Integer | RuntimeType::Boolean | RuntimeType::Character => Some(1),
            RuntimeType::Void => Some(0),
            RuntimeType::Func { .. } => Some(Self::CLOSURE_SIZE),
            RuntimeType::Array { len, elem } => len.checked_mul(elem.checked_size()?),
            RuntimeType::Record(fields) => fields
                .iter()
                .try_fold(0u32, |total, f| total.checked_add(f.ty.checked_size()?)),
        }
    }

    /// Storage size in words, saturating at `u32::MAX`.
    ///
    /// A saturated size never fits a frame, so code generation rejects it.
    pub fn size(&self) -> u32 {
        self.checked_size().unwrap_or(u32::MAX)
    }

    /// Word offset and type of a record field.
    ///
    /// Returns `None` for non-record types and unknown field names.
    pub fn field(&self, name: &str) -> Option<(u32, RuntimeType<'a>)> {
        let RuntimeType::Record(fields) = self else {
            return None;
        };

        let mut offset = 0;
        for field in fields.iter() {
            if field.name == name {
                return Some((offset, field.ty));
            }
            offset = offset.saturating_add(field.ty.size());
        }
        None
    }

    /// Element type of an array.
    pub fn element(&self) -> Option<RuntimeType<'a>> {
        match self {
            RuntimeType::Array { elem, .. } => Some(**elem),
            _ => None,
        }
    }

    /// Whether the value fits in a single word.
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            RuntimeType::Integer | RuntimeType::Boolean | RuntimeType::Character
        )
    }
}

impl Display for RuntimeType<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeType::Integer => f.write_str("Integer"),
            RuntimeType::Boolean => f.write_str("Boolean"),
            RuntimeType::Character => f.write_str("Char"),
            RuntimeType::Void => f.write_str("Void"),
            RuntimeType::Func { params, ret } => {
                f.write_str("func(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, "): {ret}")
            }
            RuntimeType::Array { len, elem } => write!(f, "array {len} of {elem}"),
            RuntimeType::Record(fields) => {
                f.write_str("record ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                f.write_str(" end")
            }
        }
    }
}
