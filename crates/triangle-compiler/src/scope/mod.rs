//! Name resolution for code generation.
//!
//! Triangle keeps values (variables and constants) and routines (functions
//! and procedures) in separate namespaces. [`Scope`] owns one
//! [`ScopeTable`] per namespace and opens and closes their frames together,
//! so the two can never disagree about nesting.
//!
//! The value table's frame state is the next free word offset in the active
//! activation record. The routine table carries no state.

mod table;

pub use table::{FrameKind, ScopeTable};

use triangle_ast::Ident;
use triangle_core::{CompilationError, Namespace, Span};

use crate::bytecode::{Label, Primitive};

// ============================================================================
// Bindings
// ============================================================================

/// Where a value-namespace name lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarBinding {
    /// The value is stored at this displacement in its frame.
    Stored(i32),
    /// The slot at this displacement holds the address of the value.
    Reference(i32),
    /// A constant whose value is known at compile time.
    Known(i32),
}

/// How a routine-namespace name is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineBinding {
    /// A routine declared in the program, entered at this label.
    Label(Label),
    /// A routine parameter: a closure stored at this displacement.
    Closure(i32),
    /// A routine built into the machine.
    Primitive(Primitive),
}

/// A binding together with the lexical distance to its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<B> {
    /// Level frames between the reference and the declaration.
    pub depth: usize,
    /// What the name is bound to.
    pub binding: B,
}

type Result<T> = std::result::Result<T, CompilationError>;

// ============================================================================
// Scope
// ============================================================================

/// Both namespaces, opened and closed in lockstep.
#[derive(Debug)]
pub struct Scope {
    values: ScopeTable<VarBinding, i32>,
    routines: ScopeTable<RoutineBinding, ()>,
}

impl Scope {
    /// An empty scope for a main program, with locals starting at offset 0.
    pub fn new() -> Self {
        Self {
            values: ScopeTable::new(0),
            routines: ScopeTable::new(()),
        }
    }

    /// Open a frame in both namespaces with locals starting at `next_offset`.
    pub fn enter(&mut self, kind: FrameKind, next_offset: i32) {
        self.values.enter_scope(kind, next_offset);
        self.routines.enter_scope(kind, ());
    }

    /// Close the innermost frame in both namespaces.
    pub fn exit(&mut self) {
        self.values.exit_scope();
        self.routines.exit_scope();
    }

    /// Number of open frames, the root included.
    pub fn frames(&self) -> usize {
        self.values.frames()
    }

    /// Number of routine levels above the main program.
    pub fn level(&self) -> usize {
        self.values.level()
    }

    // ========================================================================
    // Binding
    // ========================================================================

    pub fn bind_value(&mut self, name: &str, binding: VarBinding) {
        self.values.add(name, binding);
    }

    pub fn bind_routine(&mut self, name: &str, binding: RoutineBinding) {
        self.routines.add(name, binding);
    }

    // ========================================================================
    // Stack accounting
    // ========================================================================

    /// The next free displacement in the active activation record.
    pub fn next_offset(&self) -> i32 {
        *self.values.local_state()
    }

    pub fn set_next_offset(&mut self, offset: i32) {
        self.values.set_local_state(offset);
    }

    /// Claim `words` at the top of the active record, returning the first
    /// displacement claimed.
    ///
    /// Fails, claiming nothing, if the record would outgrow the addressable
    /// displacements.
    pub fn allocate(&mut self, words: u32, span: Span) -> Result<i32> {
        let offset = self.next_offset();
        let next = i32::try_from(words)
            .ok()
            .and_then(|words| offset.checked_add(words))
            .ok_or_else(|| CompilationError::frame_overflow(words, span))?;
        self.set_next_offset(next);
        Ok(offset)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve a value-namespace reference.
    ///
    /// Semantic analysis guarantees every name is bound, so a miss is an
    /// internal error.
    pub fn resolve_value(&self, name: &Ident<'_>) -> Result<Resolved<VarBinding>> {
        self.values
            .lookup_with_depth(name.name)
            .map(|(depth, binding)| Resolved {
                depth,
                binding: *binding,
            })
            .ok_or_else(|| CompilationError::unbound(name.name, Namespace::Value, name.span))
    }

    /// Resolve a routine-namespace reference.
    pub fn resolve_routine(&self, name: &Ident<'_>) -> Result<Resolved<RoutineBinding>> {
        self.routines
            .lookup_with_depth(name.name)
            .map(|(depth, binding)| Resolved {
                depth,
                binding: *binding,
            })
            .ok_or_else(|| CompilationError::unbound(name.name, Namespace::Routine, name.span))
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
