//! Error types for the Triangle back end.
//!
//! Code generation assumes its input passed semantic analysis, so the
//! taxonomy is small:
//!
//! ```text
//! CompilationError
//! ├── Internal                   - an earlier pass let a malformed tree through (fatal)
//! ├── UnsupportedConstruct       - a tree shape the generator refuses to lower (fatal)
//! └── NestingRestrictionExceeded - a reference too deep for the display (reported, not fatal)
//! ```

use std::fmt;

use thiserror::Error;

use crate::Span;

/// Which half of the scope table a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Variables and constants.
    Value,
    /// Functions and procedures.
    Routine,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Value => f.write_str("value"),
            Namespace::Routine => f.write_str("routine"),
        }
    }
}

/// Errors raised while lowering a program tree to instructions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A name was not bound, or the tree violated an invariant that
    /// semantic analysis is responsible for.
    #[error("internal error at {span}: {message}")]
    Internal {
        /// What went wrong.
        message: String,
        /// The node being lowered.
        span: Span,
    },

    /// The generator has no lowering for this tree shape.
    #[error("at {span}: unsupported construct: {construct}")]
    UnsupportedConstruct {
        /// Description of the construct.
        construct: String,
        /// Where it appears.
        span: Span,
    },

    /// A reference crosses more lexical levels than the display can address.
    #[error(
        "at {span}: '{name}' is {depth} levels out; only {limit} enclosing levels are addressable"
    )]
    NestingRestrictionExceeded {
        /// The referenced name.
        name: String,
        /// Levels between the reference and the declaration.
        depth: usize,
        /// Deepest addressable level.
        limit: usize,
        /// Where the reference appears.
        span: Span,
    },
}

impl CompilationError {
    /// Build the error reported when a lookup fails.
    pub fn unbound(name: &str, namespace: Namespace, span: Span) -> Self {
        CompilationError::Internal {
            message: format!("{namespace} '{name}' is not bound"),
            span,
        }
    }

    /// Build an [`CompilationError::UnsupportedConstruct`].
    pub fn unsupported(construct: impl Into<String>, span: Span) -> Self {
        CompilationError::UnsupportedConstruct {
            construct: construct.into(),
            span,
        }
    }

    /// Build the error reported when storage does not fit in a frame.
    pub fn frame_overflow(words: u32, span: Span) -> Self {
        Self::unsupported(format!("{words} words exceeds addressable frame size"), span)
    }

    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Internal { span, .. } => *span,
            CompilationError::UnsupportedConstruct { span, .. } => *span,
            CompilationError::NestingRestrictionExceeded { span, .. } => *span,
        }
    }

    /// Whether generation had to stop because of this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CompilationError::NestingRestrictionExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_names_the_namespace() {
        let err = CompilationError::unbound("fact", Namespace::Routine, Span::new(3, 9, 4));
        assert_eq!(
            err.to_string(),
            "internal error at 3:9: routine 'fact' is not bound"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn unsupported_display() {
        let err = CompilationError::unsupported("'+' on a 2-word operand", Span::new(1, 4, 1));
        assert_eq!(
            err.to_string(),
            "at 1:4: unsupported construct: '+' on a 2-word operand"
        );
    }

    #[test]
    fn nesting_restriction_is_not_fatal() {
        let span = Span::new(8, 2, 1);
        let err = CompilationError::NestingRestrictionExceeded {
            name: "x".to_string(),
            depth: 7,
            limit: 6,
            span,
        };
        assert!(!err.is_fatal());
        assert_eq!(err.span(), span);
    }
}
