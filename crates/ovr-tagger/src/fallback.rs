//! Expression-fallback fusion
//!
//! An expression is evaluated by the operator that owns it. When that
//! operator stays on the host, so do its expressions, even if their own
//! rules would have accepted them. Exec descendants keep their decisions;
//! the rewriter places transitions around them.

use crate::decision::{TagOutcome, TaggedNode, TaggedPlan};
use ovr_plan::{NodeClass, NodeKind};
use smallvec::smallvec;

/// Demote accepted expressions under host parents; returns how many
pub(crate) fn fuse_expression_fallback(plan: &mut TaggedPlan<'_>) -> usize {
    let decisions = &mut plan.decisions;
    let mut demoted = 0;
    let mut stack: Vec<(&TaggedNode<'_>, Option<&NodeKind>)> = vec![(&plan.root, None)];

    while let Some((node, host_parent)) = stack.pop() {
        let decision = &mut decisions[node.id.index()];
        if let Some(parent) = host_parent {
            if decision.class == NodeClass::Expression && decision.is_accepted() {
                decision.outcome = TagOutcome::Rejected {
                    reasons: smallvec![format!(
                        "expression stays on the host with its parent {parent}"
                    )],
                };
                demoted += 1;
            }
        }
        let on_host = !decision.is_accepted();
        let kind = &node.node.kind;
        stack.extend(
            node.children
                .iter()
                .rev()
                .map(|child| (child, on_host.then_some(kind))),
        );
    }
    demoted
}
