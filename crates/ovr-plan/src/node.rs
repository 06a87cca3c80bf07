//! Host plan nodes
//!
//! A [`PlanNode`] owns its children exclusively, so a plan built from
//! nodes is always a finite tree. Plans that arrive in flat form are
//! validated by [`crate::PlanArena::to_tree`] before they get here.

use crate::display::{DisplayTree, TreeNode};
use crate::kind::{NodeClass, NodeKind};
use crate::params::{NodeParams, ParamValue, ESTIMATED_BYTES};
use ovr_sig::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of a host execution plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    /// Operator identifier
    pub kind: NodeKind,
    /// Expression or exec
    pub class: NodeClass,
    /// Declared output type
    pub output_type: DataType,
    /// Node-specific parameters
    #[serde(default, skip_serializing_if = "NodeParams::is_empty")]
    pub params: NodeParams,
    /// Ordered children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Create a leaf node
    pub fn new(kind: impl Into<NodeKind>, class: NodeClass, output_type: DataType) -> Self {
        Self {
            kind: kind.into(),
            class,
            output_type,
            params: NodeParams::new(),
            children: Vec::new(),
        }
    }

    /// Create an expression leaf
    pub fn expr(kind: impl Into<NodeKind>, output_type: DataType) -> Self {
        Self::new(kind, NodeClass::Expression, output_type)
    }

    /// Create an exec leaf
    pub fn exec(kind: impl Into<NodeKind>, output_type: DataType) -> Self {
        Self::new(kind, NodeClass::Exec, output_type)
    }

    /// Append a child
    #[must_use]
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = PlanNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Set a parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Get a parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Estimated output size in bytes, if the planner supplied one
    #[must_use]
    pub fn estimated_bytes(&self) -> Option<u64> {
        self.param(ESTIMATED_BYTES).and_then(ParamValue::as_u64)
    }

    /// Number of nodes in this subtree
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Longest root-to-leaf path, counting edges
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Kinds and nesting of this subtree
    #[must_use]
    pub fn shape(&self) -> PlanShape {
        PlanShape {
            kind: self.kind.clone(),
            children: self.children.iter().map(PlanNode::shape).collect(),
        }
    }
}

impl TreeNode for PlanNode {
    fn label(&self) -> String {
        self.kind.to_string()
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        self.children.iter().map(|c| c as &dyn TreeNode).collect()
    }

    fn details(&self) -> Option<String> {
        Some(self.output_type.to_string())
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DisplayTree::new(self))
    }
}

/// Kind-only skeleton of a tree, used to compare plan structure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanShape {
    /// Node kind
    pub kind: NodeKind,
    /// Child shapes in order
    pub children: Vec<PlanShape>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlanNode {
        PlanNode::exec("Project", DataType::Double)
            .with_child(PlanNode::expr("Acos", DataType::Double).with_child(
                PlanNode::expr("Literal", DataType::Double).with_param("value", 0.5),
            ))
            .with_child(PlanNode::exec("Scan", DataType::Double).with_param(ESTIMATED_BYTES, 64_i64))
    }

    #[test]
    fn counts_and_depth() {
        let plan = sample();
        assert_eq!(plan.node_count(), 4);
        assert_eq!(plan.depth(), 2);
        assert_eq!(plan.children[1].estimated_bytes(), Some(64));
        assert_eq!(plan.estimated_bytes(), None);
    }

    #[test]
    fn renders_tree() {
        let rendered = sample().to_string();
        assert_eq!(
            rendered,
            "Project (DOUBLE)\n├─ Acos (DOUBLE)\n│  └─ Literal (DOUBLE)\n└─ Scan (DOUBLE)\n"
        );
    }

    #[test]
    fn json_round_trip() {
        let plan = sample();
        let json = serde_json::to_string(&plan).unwrap();
        let back: PlanNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }
}
