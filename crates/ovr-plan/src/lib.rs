//! Accelerated Plan Overrides: Plan Model
//!
//! Host plan trees, their flat arena form and the rewritten trees that
//! mix host nodes, accelerated nodes and transitions.
//!
//! # Overview
//!
//! - **PlanNode**: typed host node owning its children
//! - **PlanArena**: id-addressed form, validated into a tree
//! - **RewrittenNode**: result of rewriting, with idempotent adapters
//!
//! # Example
//!
//! ```rust
//! use ovr_plan::{PlanNode, RewrittenNode, HostNode, Placement};
//! use ovr_sig::DataType;
//!
//! let scan = PlanNode::exec("Scan", DataType::Long);
//! let host = RewrittenNode::Host(HostNode::from_plan(&scan, vec![]));
//! let device = host.clone().to_device();
//! assert_eq!(device.placement(), Placement::Device);
//! assert_eq!(device.to_host(), host);
//! ```

#![warn(missing_docs)]

pub mod arena;
pub mod display;
pub mod error;
pub mod kind;
pub mod node;
pub mod params;
pub mod rewritten;

// Re-exports
pub use arena::{ArenaNode, PlanArena, DEFAULT_MAX_PLAN_DEPTH};
pub use display::{DisplayTree, TreeNode};
pub use error::StructuralTreeError;
pub use kind::{NodeClass, NodeKind};
pub use node::{PlanNode, PlanShape};
pub use params::{NodeParams, ParamValue, ESTIMATED_BYTES};
pub use rewritten::{
    AcceleratedNode, HostNode, Placement, RewrittenNode, Transition, TransitionKind,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
