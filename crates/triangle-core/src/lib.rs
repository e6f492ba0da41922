//! Core types shared by the Triangle compiler crates.
//!
//! - [`Span`]: source positions carried by every tree node
//! - [`CompilationError`]: the code generation error taxonomy
//! - [`RuntimeType`]: resolved, size-bearing types

mod error;
mod runtime_type;
mod span;

pub use error::{CompilationError, Namespace};
pub use runtime_type::{RecordField, RuntimeType};
pub use span::Span;
