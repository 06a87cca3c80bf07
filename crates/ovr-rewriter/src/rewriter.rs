//! Plan rewriter
//!
//! Turns a tagged plan into the executable tree. Accepted nodes are built
//! by their rule's constructor over already rewritten children; rejected
//! nodes are copied as they are. Wherever a child's output is on the wrong
//! side for its parent, an adapter inserts the transition.

use crate::stats::RewriteStats;
use ovr_plan::{HostNode, RewrittenNode};
use ovr_registry::ChildPolicy;
use ovr_tagger::{TaggedNode, TaggedPlan};

/// Rewrites tagged plans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRewriter {
    host_output: bool,
}

impl Default for PlanRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanRewriter {
    /// Rewriter whose result is delivered on the host
    #[must_use]
    pub fn new() -> Self {
        Self { host_output: true }
    }

    /// Choose whether the root is adapted back to the host
    #[inline]
    #[must_use]
    pub fn with_host_output(mut self, host_output: bool) -> Self {
        self.host_output = host_output;
        self
    }

    /// Build the rewritten tree; the input plan is not modified
    #[must_use]
    pub fn rewrite(&self, plan: &TaggedPlan<'_>) -> RewrittenNode {
        let root = Self::rewrite_node(&plan.root, plan);
        let root = if self.host_output { root.to_host() } else { root };
        let stats = RewriteStats::of(&root);
        tracing::debug!(
            accelerated = stats.accelerated,
            host = stats.host,
            transitions = stats.transitions(),
            "rewrote plan"
        );
        root
    }

    fn rewrite_node(node: &TaggedNode<'_>, plan: &TaggedPlan<'_>) -> RewrittenNode {
        let children: Vec<RewrittenNode> = node
            .children
            .iter()
            .map(|child| Self::rewrite_node(child, plan))
            .collect();

        match plan.decision(node.id).and_then(|d| d.rule()) {
            Some(rule) => {
                let children = children
                    .into_iter()
                    .enumerate()
                    .map(|(position, child)| {
                        match rule.input(position).map(|s| s.policy).unwrap_or_default() {
                            ChildPolicy::Mixed => child,
                            ChildPolicy::Adaptable | ChildPolicy::Strict => child.to_device(),
                        }
                    })
                    .collect();
                RewrittenNode::Accelerated(rule.construct(node.node, children))
            }
            None => RewrittenNode::Host(HostNode::from_plan(
                node.node,
                children.into_iter().map(RewrittenNode::to_host).collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovr_plan::{Placement, PlanNode, TransitionKind};
    use ovr_sig::DataType;
    use ovr_tagger::{CompatibilityTagger, TagConfig};
    use ovr_test_utils::{acos, acos_registry, default_registry, double_literal, join, join_registry, scan};
    use pretty_assertions::assert_eq;

    #[test]
    fn accepted_nodes_use_rule_constructor() {
        let registry = acos_registry();
        let plan = acos(DataType::Double, double_literal(0.5));
        let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
            .tag(&plan)
            .unwrap();

        let rewritten = PlanRewriter::new().with_host_output(false).rewrite(&tagged);
        assert_eq!(rewritten.name(), "GpuAcos");
        assert_eq!(rewritten.children()[0].name(), "GpuLiteral");
        assert_eq!(RewriteStats::of(&rewritten).transitions(), 0);

        let delivered = PlanRewriter::new().rewrite(&tagged);
        assert_eq!(delivered.placement(), Placement::Host);
        assert_eq!(delivered.name(), "DeviceToHost");
    }

    #[test]
    fn rejected_join_adapts_accelerated_child_back() {
        let registry = join_registry();
        let plan = join(scan("ScanA", 100), scan("UnsupportedScan", 100));
        let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
            .tag(&plan)
            .unwrap();
        let rewritten = PlanRewriter::new().rewrite(&tagged);

        assert_eq!(
            rewritten.to_string(),
            "Join (LONG)\n├─ DeviceToHost\n│  └─ *GpuScanA (LONG)\n└─ UnsupportedScan (LONG)\n"
        );
        assert_eq!(
            RewriteStats::of(&rewritten),
            RewriteStats {
                accelerated: 1,
                host: 2,
                host_to_device: 0,
                device_to_host: 1,
            }
        );
    }

    #[test]
    fn host_child_of_accelerated_exec_is_uploaded() {
        let registry = default_registry();
        let plan = PlanNode::exec("Filter", DataType::Long)
            .with_child(PlanNode::exec("Window", DataType::Long));
        let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
            .tag(&plan)
            .unwrap();
        let rewritten = PlanRewriter::new().with_host_output(false).rewrite(&tagged);
        let child = rewritten.children()[0];
        match child {
            RewrittenNode::Transition(t) => {
                assert_eq!(t.direction, TransitionKind::HostToDevice);
                assert_eq!(t.input.name(), "Window");
            }
            other => panic!("expected a transition, got {other:?}"),
        }
    }

    #[test]
    fn mixed_positions_get_no_transition() {
        let registry = default_registry();
        let plan = PlanNode::exec("Union", DataType::Long)
            .with_child(PlanNode::exec("Scan", DataType::Long))
            .with_child(PlanNode::exec("Window", DataType::Long));
        let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
            .tag(&plan)
            .unwrap();
        let rewritten = PlanRewriter::new().with_host_output(false).rewrite(&tagged);
        let names: Vec<&str> = rewritten.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["GpuScan", "Window"]);
    }
}
