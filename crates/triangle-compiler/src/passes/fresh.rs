//! Fresh name source for compiler-introduced bindings.

use bumpalo::Bump;

/// Marks compiler-introduced names. The lexer never produces it inside an
/// identifier.
pub const FRESH_PREFIX: char = '$';

/// Hands out names that cannot collide with source identifiers or with
/// each other.
///
/// One instance lives for one pass over one program; the counter never
/// resets while it does.
#[derive(Debug)]
pub struct FreshNames {
    stem: &'static str,
    next: u32,
}

impl FreshNames {
    /// Names of the form `$<stem><n>`, starting at 1.
    pub fn new(stem: &'static str) -> Self {
        Self { stem, next: 1 }
    }

    /// The next unused name, allocated in `arena`.
    pub fn fresh<'ast>(&mut self, arena: &'ast Bump) -> &'ast str {
        let name = format!("{FRESH_PREFIX}{}{}", self.stem, self.next);
        self.next += 1;
        arena.alloc_str(&name)
    }

    /// How many names have been handed out.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}
