//! Source positions for tree nodes and diagnostics.

use std::fmt;

/// Where a construct starts in the source text.
///
/// The parser fills these in; the back end only carries them through to
/// error messages.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_is_empty() {
        assert!(Span::point(4, 2).is_empty());
        assert!(!Span::new(4, 2, 3).is_empty());
    }

    #[test]
    fn displays_line_and_column() {
        assert_eq!(Span::new(12, 7, 1).to_string(), "12:7");
        assert_eq!(format!("{:?}", Span::point(1, 1)), "1:1");
    }
}
