//! Structural errors in plan input

use crate::kind::NodeKind;
use thiserror::Error;

/// The plan is not a well-formed, fully typed, finite tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralTreeError {
    /// A node is reachable from itself
    #[error("cycle detected through node {node}")]
    Cycle {
        /// Node that closes the cycle
        node: u32,
    },

    /// A node references a child that does not exist
    #[error("node {parent} references missing child {child}")]
    DanglingChild {
        /// Referencing node
        parent: u32,
        /// Missing id
        child: u32,
    },

    /// A node has more than one parent
    #[error("node {child} is a child of both {first_parent} and {second_parent}")]
    SharedChild {
        /// Shared node
        child: u32,
        /// First owner seen
        first_parent: u32,
        /// Second owner seen
        second_parent: u32,
    },

    /// Two nodes use the same id
    #[error("duplicate node id {0}")]
    DuplicateNodeId(u32),

    /// The root id does not name a node
    #[error("root node {0} is not in the plan")]
    MissingRoot(u32),

    /// A node has no declared output type
    #[error("node {node} ({kind}) has no declared output type")]
    Untyped {
        /// Untyped node
        node: u32,
        /// Its kind
        kind: NodeKind,
    },

    /// The plan nests deeper than allowed
    #[error("plan is deeper than the ceiling of {limit} levels")]
    TooDeep {
        /// Configured ceiling
        limit: usize,
    },
}
