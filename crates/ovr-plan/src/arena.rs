//! Flat, id-addressed plans
//!
//! Plans handed over from outside the process (for example as JSON) arrive
//! as a list of nodes referring to their children by id. Nothing about
//! that form guarantees a tree, so [`PlanArena::to_tree`] checks ownership,
//! acyclicity, typing and depth while it assembles the owned
//! [`PlanNode`] tree.

use crate::error::StructuralTreeError;
use crate::kind::{NodeClass, NodeKind};
use crate::node::PlanNode;
use crate::params::NodeParams;
use ovr_sig::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default ceiling on plan depth
pub const DEFAULT_MAX_PLAN_DEPTH: usize = 1024;

/// Node of a [`PlanArena`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaNode {
    /// Unique id within the arena
    pub id: u32,
    /// Operator identifier
    pub kind: NodeKind,
    /// Expression or exec
    pub class: NodeClass,
    /// Declared output type
    #[serde(default)]
    pub output_type: Option<DataType>,
    /// Node-specific parameters
    #[serde(default, skip_serializing_if = "NodeParams::is_empty")]
    pub params: NodeParams,
    /// Child ids in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<u32>,
}

/// Flat plan with an explicit root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanArena {
    /// Id of the root node
    pub root: u32,
    /// All nodes, in any order
    pub nodes: Vec<ArenaNode>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

enum Visit {
    Enter(u32, usize),
    Exit(u32),
}

impl PlanArena {
    /// Flatten a tree, numbering nodes in pre-order from zero
    #[must_use]
    pub fn from_tree(root: &PlanNode) -> Self {
        let mut nodes: Vec<ArenaNode> = Vec::with_capacity(root.node_count());
        let mut stack: Vec<(&PlanNode, Option<usize>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            #[allow(clippy::cast_possible_truncation)]
            let id = nodes.len() as u32;
            if let Some(parent) = parent {
                nodes[parent].children.push(id);
            }
            let slot = nodes.len();
            nodes.push(ArenaNode {
                id,
                kind: node.kind.clone(),
                class: node.class,
                output_type: Some(node.output_type.clone()),
                params: node.params.clone(),
                children: Vec::with_capacity(node.children.len()),
            });
            stack.extend(node.children.iter().rev().map(|c| (c, Some(slot))));
        }
        Self { root: 0, nodes }
    }

    /// Assemble the owned tree, checking its structure
    ///
    /// # Errors
    /// [`StructuralTreeError`] for duplicate ids, a missing root, dangling
    /// or shared children, cycles, untyped reachable nodes and trees deeper
    /// than `max_depth` edges.
    pub fn to_tree(&self, max_depth: usize) -> Result<PlanNode, StructuralTreeError> {
        let mut index: HashMap<u32, &ArenaNode> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if index.insert(node.id, node).is_some() {
                return Err(StructuralTreeError::DuplicateNodeId(node.id));
            }
        }
        if !index.contains_key(&self.root) {
            return Err(StructuralTreeError::MissingRoot(self.root));
        }

        let mut state: HashMap<u32, VisitState> = HashMap::with_capacity(index.len());
        let mut owner: HashMap<u32, u32> = HashMap::with_capacity(index.len());
        let mut built: HashMap<u32, PlanNode> = HashMap::new();
        let mut stack = vec![Visit::Enter(self.root, 0)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id, depth) => {
                    if depth > max_depth {
                        return Err(StructuralTreeError::TooDeep { limit: max_depth });
                    }
                    let node = index[&id];
                    if node.output_type.is_none() {
                        return Err(StructuralTreeError::Untyped {
                            node: id,
                            kind: node.kind.clone(),
                        });
                    }
                    state.insert(id, VisitState::InProgress);
                    stack.push(Visit::Exit(id));
                    for &child in node.children.iter().rev() {
                        if !index.contains_key(&child) {
                            return Err(StructuralTreeError::DanglingChild { parent: id, child });
                        }
                        if state.get(&child) == Some(&VisitState::InProgress) {
                            return Err(StructuralTreeError::Cycle { node: child });
                        }
                        if let Some(first_parent) = owner.insert(child, id) {
                            return Err(StructuralTreeError::SharedChild {
                                child,
                                first_parent,
                                second_parent: id,
                            });
                        }
                        stack.push(Visit::Enter(child, depth + 1));
                    }
                }
                Visit::Exit(id) => {
                    state.insert(id, VisitState::Done);
                    let node = index[&id];
                    let mut children = Vec::with_capacity(node.children.len());
                    for child in &node.children {
                        let built_child = built
                            .remove(child)
                            .ok_or(StructuralTreeError::DanglingChild { parent: id, child: *child })?;
                        children.push(built_child);
                    }
                    let output_type = node.output_type.clone().ok_or_else(|| {
                        StructuralTreeError::Untyped {
                            node: id,
                            kind: node.kind.clone(),
                        }
                    })?;
                    built.insert(
                        id,
                        PlanNode {
                            kind: node.kind.clone(),
                            class: node.class,
                            output_type,
                            params: node.params.clone(),
                            children,
                        },
                    );
                }
            }
        }

        let unreachable = index.len() - state.len();
        if unreachable > 0 {
            tracing::debug!(unreachable, "ignoring plan nodes not reachable from the root");
        }
        built
            .remove(&self.root)
            .ok_or(StructuralTreeError::MissingRoot(self.root))
    }
}
