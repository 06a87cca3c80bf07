//! Session settings visible to rule predicates

/// Default memory budget for accelerated operators: 1 GiB
pub const DEFAULT_MEMORY_BUDGET_BYTES: u64 = 1 << 30;

/// Settings extra checks consult while tagging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagContext {
    /// Strict (ANSI) arithmetic: overflow and invalid input must raise errors
    pub ansi_strict: bool,
    /// Memory an accelerated operator may hold at once
    pub memory_budget_bytes: u64,
}

impl Default for TagContext {
    fn default() -> Self {
        Self {
            ansi_strict: false,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
        }
    }
}

impl TagContext {
    /// Enable or disable strict arithmetic
    #[inline]
    #[must_use]
    pub fn with_ansi_strict(mut self, ansi_strict: bool) -> Self {
        self.ansi_strict = ansi_strict;
        self
    }

    /// Set the memory budget
    #[inline]
    #[must_use]
    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget_bytes = bytes;
        self
    }
}
