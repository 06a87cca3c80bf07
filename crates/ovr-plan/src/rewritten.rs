//! Rewritten plans
//!
//! The output of rewriting mixes host nodes, accelerated nodes and the
//! transitions that move data between the two sides. Adapters
//! ([`RewrittenNode::to_host`] and [`RewrittenNode::to_device`]) are
//! idempotent and cancel an adjacent transition in the opposite
//! direction instead of stacking a second one.

use crate::display::{DisplayTree, TreeNode};
use crate::kind::{NodeClass, NodeKind};
use crate::node::{PlanNode, PlanShape};
use crate::params::NodeParams;
use ovr_sig::DataType;
use serde::Serialize;
use std::fmt;

/// Side a subtree produces its output on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Placement {
    /// Host memory, row or host-columnar
    Host,
    /// Accelerator memory
    Device,
}

/// Direction of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransitionKind {
    /// Copy accelerator output back to the host
    DeviceToHost,
    /// Upload host output to the accelerator
    HostToDevice,
}

impl TransitionKind {
    /// Name used in plan output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceToHost => "DeviceToHost",
            Self::HostToDevice => "HostToDevice",
        }
    }

    /// Side the transition produces its output on
    #[must_use]
    pub const fn target(self) -> Placement {
        match self {
            Self::DeviceToHost => Placement::Host,
            Self::HostToDevice => Placement::Device,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node kept on the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostNode {
    /// Operator identifier
    pub kind: NodeKind,
    /// Expression or exec
    pub class: NodeClass,
    /// Declared output type
    pub output_type: DataType,
    /// Node-specific parameters
    pub params: NodeParams,
    /// Rewritten children
    pub children: Vec<RewrittenNode>,
}

impl HostNode {
    /// Host node for `node` over already rewritten children
    #[must_use]
    pub fn from_plan(node: &PlanNode, children: Vec<RewrittenNode>) -> Self {
        Self {
            kind: node.kind.clone(),
            class: node.class,
            output_type: node.output_type.clone(),
            params: node.params.clone(),
            children,
        }
    }
}

/// Node replaced by its accelerated counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceleratedNode {
    /// Name of the accelerated operator
    pub name: String,
    /// Kind of the host node it replaces
    pub source_kind: NodeKind,
    /// Expression or exec
    pub class: NodeClass,
    /// Declared output type
    pub output_type: DataType,
    /// Node-specific parameters
    pub params: NodeParams,
    /// Rewritten children
    pub children: Vec<RewrittenNode>,
}

/// Boundary between host and accelerator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    /// Direction of the copy
    pub direction: TransitionKind,
    /// Subtree whose output is moved
    pub input: Box<RewrittenNode>,
}

/// Node of a rewritten plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RewrittenNode {
    /// Original host node
    Host(HostNode),
    /// Accelerated replacement
    Accelerated(AcceleratedNode),
    /// Host/accelerator boundary
    Transition(Transition),
}

impl RewrittenNode {
    /// Side this subtree produces output on
    #[must_use]
    pub fn placement(&self) -> Placement {
        match self {
            Self::Host(_) => Placement::Host,
            Self::Accelerated(_) => Placement::Device,
            Self::Transition(t) => t.direction.target(),
        }
    }

    /// Output type of this subtree
    #[must_use]
    pub fn output_type(&self) -> &DataType {
        match self {
            Self::Host(n) => &n.output_type,
            Self::Accelerated(n) => &n.output_type,
            Self::Transition(t) => t.input.output_type(),
        }
    }

    /// Label shown in plan output
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Host(n) => n.kind.as_str(),
            Self::Accelerated(n) => &n.name,
            Self::Transition(t) => t.direction.as_str(),
        }
    }

    /// Direct children, with a transition's input as its only child
    #[must_use]
    pub fn children(&self) -> Vec<&RewrittenNode> {
        match self {
            Self::Host(n) => n.children.iter().collect(),
            Self::Accelerated(n) => n.children.iter().collect(),
            Self::Transition(t) => vec![t.input.as_ref()],
        }
    }

    /// Check if this node is a transition
    #[must_use]
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition(_))
    }

    /// Adapt this subtree so that it produces host output
    #[must_use]
    pub fn to_host(self) -> Self {
        self.adapt(TransitionKind::DeviceToHost)
    }

    /// Adapt this subtree so that it produces accelerator output
    #[must_use]
    pub fn to_device(self) -> Self {
        self.adapt(TransitionKind::HostToDevice)
    }

    fn adapt(self, direction: TransitionKind) -> Self {
        if self.placement() == direction.target() {
            return self;
        }
        match self {
            Self::Transition(t) => *t.input,
            other => Self::Transition(Transition {
                direction,
                input: Box::new(other),
            }),
        }
    }

    /// Pre-order iterator over this subtree
    pub fn iter(&self) -> impl Iterator<Item = &RewrittenNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let children = node.children();
            stack.extend(children.into_iter().rev());
            Some(node)
        })
    }

    /// Original kinds and nesting, with transitions elided
    #[must_use]
    pub fn shape(&self) -> PlanShape {
        match self {
            Self::Host(n) => PlanShape {
                kind: n.kind.clone(),
                children: n.children.iter().map(RewrittenNode::shape).collect(),
            },
            Self::Accelerated(n) => PlanShape {
                kind: n.source_kind.clone(),
                children: n.children.iter().map(RewrittenNode::shape).collect(),
            },
            Self::Transition(t) => t.input.shape(),
        }
    }

    /// Convert back to a host plan when nothing was accelerated
    #[must_use]
    pub fn into_host_plan(self) -> Option<PlanNode> {
        match self {
            Self::Host(n) => {
                let children = n
                    .children
                    .into_iter()
                    .map(RewrittenNode::into_host_plan)
                    .collect::<Option<Vec<_>>>()?;
                Some(PlanNode {
                    kind: n.kind,
                    class: n.class,
                    output_type: n.output_type,
                    params: n.params,
                    children,
                })
            }
            Self::Accelerated(_) | Self::Transition(_) => None,
        }
    }
}

impl TreeNode for RewrittenNode {
    fn label(&self) -> String {
        match self {
            Self::Accelerated(n) => format!("*{}", n.name),
            other => other.name().to_string(),
        }
    }

    fn children(&self) -> Vec<&dyn TreeNode> {
        RewrittenNode::children(self)
            .into_iter()
            .map(|c| c as &dyn TreeNode)
            .collect()
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Transition(_) => None,
            other => Some(other.output_type().to_string()),
        }
    }
}

impl fmt::Display for RewrittenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", DisplayTree::new(self))
    }
}
