//! Tagging configuration

use ovr_plan::{NodeKind, DEFAULT_MAX_PLAN_DEPTH};
use ovr_registry::TagContext;
use std::collections::HashSet;

/// Settings that decide which nodes may be accelerated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagConfig {
    /// Master switch; when off every node stays on the host
    pub enabled: bool,
    /// Settings handed to extra checks
    pub context: TagContext,
    /// Kinds turned off by configuration
    pub disabled_kinds: HashSet<NodeKind>,
    /// Kinds turned on explicitly, lifting compatibility restrictions
    pub enabled_kinds: HashSet<NodeKind>,
    /// Allow operators whose results can differ from the host
    pub incompatible_ops: bool,
    /// Keep expressions on the host when their parent stays there
    pub fuse_expression_fallback: bool,
    /// Deepest plan accepted, counting edges
    pub max_depth: usize,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            context: TagContext::default(),
            disabled_kinds: HashSet::new(),
            enabled_kinds: HashSet::new(),
            incompatible_ops: false,
            fuse_expression_fallback: true,
            max_depth: DEFAULT_MAX_PLAN_DEPTH,
        }
    }
}

impl TagConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the master switch
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the extra-check context
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: TagContext) -> Self {
        self.context = context;
        self
    }

    /// Turn a kind off
    #[must_use]
    pub fn disable(mut self, kind: impl Into<NodeKind>) -> Self {
        let kind = kind.into();
        self.enabled_kinds.remove(&kind);
        self.disabled_kinds.insert(kind);
        self
    }

    /// Turn a kind on explicitly
    #[must_use]
    pub fn enable(mut self, kind: impl Into<NodeKind>) -> Self {
        let kind = kind.into();
        self.disabled_kinds.remove(&kind);
        self.enabled_kinds.insert(kind);
        self
    }

    /// Allow incompatible operators
    #[inline]
    #[must_use]
    pub fn with_incompatible_ops(mut self, allowed: bool) -> Self {
        self.incompatible_ops = allowed;
        self
    }

    /// Set expression-fallback fusion
    #[inline]
    #[must_use]
    pub fn with_expression_fusion(mut self, fuse: bool) -> Self {
        self.fuse_expression_fallback = fuse;
        self
    }

    /// Set the depth ceiling
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check if `kind` was turned off
    #[must_use]
    pub fn is_disabled(&self, kind: &str) -> bool {
        self.disabled_kinds.contains(kind)
    }

    /// Check if `kind` was turned on explicitly
    #[must_use]
    pub fn is_explicitly_enabled(&self, kind: &str) -> bool {
        self.enabled_kinds.contains(kind)
    }
}
