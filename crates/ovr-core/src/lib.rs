//! Accelerated Plan Overrides: Core Engine
//!
//! Ties the registry, tagger and rewriter together behind one
//! configurable entry point.
//!
//! # Overview
//!
//! - **OverrideConfig**: `sql.*` settings from TOML or `key=value` strings
//! - **PlanOverrides**: tag, rewrite, explain and count one plan or many
//! - **OverrideOutcome**: rewritten tree, decision log, explain text, stats
//!
//! # Example
//!
//! ```rust
//! use ovr_core::{OverrideConfig, PlanOverrides};
//! use ovr_plan::PlanNode;
//! use ovr_registry::RegistryBuilder;
//! use ovr_sig::DataType;
//!
//! let registry = RegistryBuilder::with_defaults().unwrap().build();
//! let engine = PlanOverrides::new(&registry, OverrideConfig::default());
//! let plan = PlanNode::exec("Filter", DataType::Long)
//!     .with_child(PlanNode::exec("Scan", DataType::Long));
//! let outcome = engine.apply(&plan).unwrap();
//! assert!(outcome.fully_accelerated());
//! assert_eq!(outcome.stats.device_to_host, 1);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod overrides;

// Re-exports
pub use config::{OverrideConfig, TestModeConfig};
pub use error::{ConfigError, OverrideError};
pub use overrides::{OverrideOutcome, PlanOverrides};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
