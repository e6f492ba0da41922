//! A stack of name frames with depth-aware lookup.

use rustc_hash::FxHashMap;

// ============================================================================
// Types
// ============================================================================

/// What opening a frame means at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A routine body: a new activation record, so one more lexical level.
    Level,
    /// A `let`: new names inside the current activation.
    Block,
}

/// One frame: its bindings and its auxiliary state.
#[derive(Debug)]
struct Frame<B, S> {
    kind: FrameKind,
    bindings: FxHashMap<String, B>,
    state: S,
}

impl<B, S> Frame<B, S> {
    fn new(kind: FrameKind, state: S) -> Self {
        Self {
            kind,
            bindings: FxHashMap::default(),
            state,
        }
    }
}

// ============================================================================
// ScopeTable
// ============================================================================

/// Frames of `B` bindings, each carrying one `S` of frame-local state.
///
/// The table always has at least one frame: the root, which is a
/// [`FrameKind::Level`] frame. Lookups scan from the innermost frame outward
/// and report how many level frames were left behind on the way.
#[derive(Debug)]
pub struct ScopeTable<B, S> {
    /// The innermost frame
    current: Frame<B, S>,

    /// Enclosing frames, outermost first
    enclosing: Vec<Frame<B, S>>,
}

impl<B, S> ScopeTable<B, S> {
    /// Create a table holding only the root frame.
    pub fn new(root_state: S) -> Self {
        Self {
            current: Frame::new(FrameKind::Level, root_state),
            enclosing: Vec::new(),
        }
    }

    /// Bind `name` in the innermost frame, replacing any binding of the same
    /// name in that frame. Outer bindings are shadowed, not touched.
    pub fn add(&mut self, name: impl Into<String>, binding: B) {
        self.current.bindings.insert(name.into(), binding);
    }

    /// Open a frame whose local state starts at `state`.
    pub fn enter_scope(&mut self, kind: FrameKind, state: S) {
        let outer = std::mem::replace(&mut self.current, Frame::new(kind, state));
        self.enclosing.push(outer);
    }

    /// Close the innermost frame, dropping its bindings.
    ///
    /// Returns `false` when only the root frame is left; the root is never
    /// closed.
    pub fn exit_scope(&mut self) -> bool {
        match self.enclosing.pop() {
            Some(outer) => {
                self.current = outer;
                true
            }
            None => false,
        }
    }

    /// Find the nearest binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&B> {
        self.lookup_with_depth(name).map(|(_, binding)| binding)
    }

    /// Find the nearest binding of `name` and the number of lexical levels
    /// between the innermost frame and the frame holding it.
    pub fn lookup_with_depth(&self, name: &str) -> Option<(usize, &B)> {
        let mut depth = 0;
        for frame in std::iter::once(&self.current).chain(self.enclosing.iter().rev()) {
            if let Some(binding) = frame.bindings.get(name) {
                return Some((depth, binding));
            }
            if frame.kind == FrameKind::Level {
                depth += 1;
            }
        }
        None
    }

    /// The innermost frame's state.
    pub fn local_state(&self) -> &S {
        &self.current.state
    }

    /// Replace the innermost frame's state.
    pub fn set_local_state(&mut self, state: S) {
        self.current.state = state;
    }

    /// Number of open frames, the root included.
    pub fn frames(&self) -> usize {
        self.enclosing.len() + 1
    }

    /// Number of level frames above the root. Zero in the main program.
    pub fn level(&self) -> usize {
        std::iter::once(&self.current)
            .chain(self.enclosing.iter())
            .filter(|frame| frame.kind == FrameKind::Level)
            .count()
            - 1
    }
}

impl<B, S: Default> Default for ScopeTable<B, S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn frame_kind() -> impl Strategy<Value = FrameKind> {
        prop_oneof![Just(FrameKind::Level), Just(FrameKind::Block)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn depth_is_the_number_of_levels_entered(kinds in prop::collection::vec(frame_kind(), 0..16)) {
            let mut table: ScopeTable<usize, ()> = ScopeTable::default();
            table.add("root", 0);
            for (i, kind) in kinds.iter().enumerate() {
                table.enter_scope(*kind, ());
                table.add("x", i);
            }

            let levels = kinds.iter().filter(|k| **k == FrameKind::Level).count();
            prop_assert_eq!(table.lookup_with_depth("root"), Some((levels, &0)));
            prop_assert_eq!(table.level(), levels);
            if !kinds.is_empty() {
                prop_assert_eq!(table.lookup_with_depth("x"), Some((0, &(kinds.len() - 1))));
            }

            for _ in &kinds {
                prop_assert!(table.exit_scope());
            }
            prop_assert_eq!(table.frames(), 1);
            prop_assert_eq!(table.lookup("x"), None);
        }
    }
}
