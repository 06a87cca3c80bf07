//! Accelerated Plan Overrides: Capability Registry
//!
//! Maps node kinds to the replacement rules that say when and how a host
//! node can be swapped for an accelerated one.
//!
//! # Overview
//!
//! - **ReplacementRule**: signatures, child policies, extra checks,
//!   constructor and compatibility flag for one kind
//! - **RegistryBuilder / RuleRegistry**: write-then-freeze rule set, with
//!   a write-once process-wide instance
//! - **SupportMatrix**: per-type support table for documentation
//!
//! # Example
//!
//! ```rust
//! use ovr_registry::{ReplacementRule, RegistryBuilder, InputSpec};
//! use ovr_sig::{TypeSig, TypeTags};
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register(
//!         ReplacementRule::expr("Acos", "inverse cosine")
//!             .signature(TypeSig::of(TypeTags::DOUBLE))
//!             .input(InputSpec::new("input").with_sig(TypeSig::of(TypeTags::DOUBLE)))
//!             .build(),
//!     )
//!     .unwrap();
//! let registry = builder.build();
//! assert!(registry.lookup("Acos").is_some());
//! assert!(registry.lookup("Cosh").is_none());
//! ```

#![warn(missing_docs)]

pub mod capability;
pub mod checks;
pub mod context;
pub mod defaults;
pub mod matrix;
pub mod registry;
pub mod rule;

// Re-exports
pub use capability::{ExtraCheck, NodeConstructor, Prefixed, DEFAULT_PREFIX};
pub use context::{TagContext, DEFAULT_MEMORY_BUDGET_BYTES};
pub use defaults::default_rules;
pub use matrix::{Support, SupportMatrix, SupportRow};
pub use registry::{
    global, global_or_defaults, install_global, DuplicateRuleError, RegistryBuilder,
    RegistryError, RuleRegistry,
};
pub use rule::{ChildPolicy, Compatibility, InputSpec, ReplacementRule, RuleBuilder};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
