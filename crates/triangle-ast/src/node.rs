//! Leaf nodes shared by every syntactic category.

use triangle_core::Span;

/// A name as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident<'ast> {
    /// The name text.
    pub name: &'ast str,
    /// Source location
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create an identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}
