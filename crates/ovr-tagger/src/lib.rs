//! Accelerated Plan Overrides: Compatibility Tagger
//!
//! Decides, per plan node, whether it can be replaced by an accelerated
//! operator, and explains why not when it cannot.
//!
//! # Example
//!
//! ```rust
//! use ovr_plan::PlanNode;
//! use ovr_registry::RegistryBuilder;
//! use ovr_sig::DataType;
//! use ovr_tagger::{CompatibilityTagger, TagConfig};
//!
//! let registry = RegistryBuilder::with_defaults().unwrap().build();
//! let plan = PlanNode::expr("Acos", DataType::Double)
//!     .with_child(PlanNode::expr("Literal", DataType::Double));
//! let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
//!     .tag(&plan)
//!     .unwrap();
//! assert_eq!(tagged.accepted_count(), 2);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod decision;
pub mod explain;
mod fallback;
pub mod tagger;

// Re-exports
pub use config::TagConfig;
pub use decision::{NodeId, Reasons, TagDecision, TagOutcome, TaggedNode, TaggedPlan};
pub use explain::{
    decision_records, explain, explain_line, DecisionRecord, ExplainMode, ExplainModeParseError,
};
pub use tagger::CompatibilityTagger;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
