//! Capability traits composed into replacement rules
//!
//! Rules do not inherit behaviour from each other. Shared validation is a
//! list of [`ExtraCheck`]s and construction is a [`NodeConstructor`];
//! closures implement both.

use crate::context::TagContext;
use ovr_plan::{AcceleratedNode, PlanNode, RewrittenNode};

/// Additional validation beyond type signatures
pub trait ExtraCheck: Send + Sync {
    /// Check `node`; `Err` carries the rejection reason verbatim
    ///
    /// # Errors
    /// A human-readable reason when the node must stay on the host.
    fn check(&self, node: &PlanNode, ctx: &TagContext) -> Result<(), String>;
}

impl<F> ExtraCheck for F
where
    F: Fn(&PlanNode, &TagContext) -> Result<(), String> + Send + Sync,
{
    fn check(&self, node: &PlanNode, ctx: &TagContext) -> Result<(), String> {
        self(node, ctx)
    }
}

/// Builds the accelerated replacement of an accepted node
pub trait NodeConstructor: Send + Sync {
    /// Construct the replacement over already rewritten children
    fn construct(&self, node: &PlanNode, children: Vec<RewrittenNode>) -> AcceleratedNode;
}

impl<F> NodeConstructor for F
where
    F: Fn(&PlanNode, Vec<RewrittenNode>) -> AcceleratedNode + Send + Sync,
{
    fn construct(&self, node: &PlanNode, children: Vec<RewrittenNode>) -> AcceleratedNode {
        self(node, children)
    }
}

/// Constructor naming the replacement `<prefix><Kind>` and keeping parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefixed(pub &'static str);

/// Prefix used by the built-in rules
pub const DEFAULT_PREFIX: &str = "Gpu";

impl Default for Prefixed {
    fn default() -> Self {
        Self(DEFAULT_PREFIX)
    }
}

impl NodeConstructor for Prefixed {
    fn construct(&self, node: &PlanNode, children: Vec<RewrittenNode>) -> AcceleratedNode {
        AcceleratedNode {
            name: format!("{}{}", self.0, node.kind),
            source_kind: node.kind.clone(),
            class: node.class,
            output_type: node.output_type.clone(),
            params: node.params.clone(),
            children,
        }
    }
}
