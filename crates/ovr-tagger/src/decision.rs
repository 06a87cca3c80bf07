//! Tag decisions and the tagged tree

use ovr_plan::{NodeClass, NodeKind, PlanNode};
use ovr_registry::ReplacementRule;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Position of a node in post-order; indexes [`TaggedPlan::decisions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Index into the decision list
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rejection reasons; most rejections carry one or two
pub type Reasons = SmallVec<[String; 2]>;

/// Outcome of tagging one node
#[derive(Debug, Clone)]
pub enum TagOutcome {
    /// The rule accepted the node
    Accepted {
        /// Rule that will build the replacement
        rule: Arc<ReplacementRule>,
    },
    /// The node stays on the host
    Rejected {
        /// Non-empty list of non-empty reasons, verbatim
        reasons: Reasons,
    },
}

/// Decision for one node
#[derive(Debug, Clone)]
pub struct TagDecision {
    /// Back-reference to the node
    pub node: NodeId,
    /// Node kind
    pub kind: NodeKind,
    /// Node class
    pub class: NodeClass,
    /// Distance from the root
    pub depth: usize,
    /// Accepted or rejected
    pub outcome: TagOutcome,
}

impl TagDecision {
    /// Check if the node will be accelerated
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, TagOutcome::Accepted { .. })
    }

    /// Accepting rule, if any
    #[must_use]
    pub fn rule(&self) -> Option<&Arc<ReplacementRule>> {
        match &self.outcome {
            TagOutcome::Accepted { rule } => Some(rule),
            TagOutcome::Rejected { .. } => None,
        }
    }

    /// Rejection reasons; empty when accepted
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        match &self.outcome {
            TagOutcome::Accepted { .. } => &[],
            TagOutcome::Rejected { reasons } => reasons.as_slice(),
        }
    }

    /// Reasons joined with `; `, if rejected
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match &self.outcome {
            TagOutcome::Accepted { .. } => None,
            TagOutcome::Rejected { reasons } => Some(reasons.join("; ")),
        }
    }
}

/// Node of the tagged tree, borrowing the input plan
#[derive(Debug, Clone)]
pub struct TaggedNode<'p> {
    /// Input node
    pub node: &'p PlanNode,
    /// Index of its decision
    pub id: NodeId,
    /// Distance from the root
    pub depth: usize,
    /// Tagged children in input order
    pub children: Vec<TaggedNode<'p>>,
}

/// Input plan annotated with one decision per node
#[derive(Debug, Clone)]
pub struct TaggedPlan<'p> {
    /// Root of the tagged tree
    pub root: TaggedNode<'p>,
    /// Decisions in post-order
    pub decisions: Vec<TagDecision>,
}

impl<'p> TaggedPlan<'p> {
    /// Decision for `id`
    #[must_use]
    pub fn decision(&self, id: NodeId) -> Option<&TagDecision> {
        self.decisions.get(id.index())
    }

    /// Decision of the root node
    #[must_use]
    pub fn root_decision(&self) -> Option<&TagDecision> {
        self.decision(self.root.id)
    }

    /// Check if the node behind `id` will be accelerated
    #[must_use]
    pub fn is_accepted(&self, id: NodeId) -> bool {
        self.decision(id).is_some_and(TagDecision::is_accepted)
    }

    /// Number of accepted nodes
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_accepted()).count()
    }

    /// Number of rejected nodes
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.decisions.len() - self.accepted_count()
    }

    /// Tagged nodes in pre-order
    pub fn pre_order(&self) -> impl Iterator<Item = &TaggedNode<'p>> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}
