//! Accelerated Plan Overrides: Plan Rewriter
//!
//! Produces the executable tree from a tagged plan, placing transitions at
//! every host/accelerator boundary.

#![warn(missing_docs)]

pub mod rewriter;
pub mod stats;

// Re-exports
pub use rewriter::PlanRewriter;
pub use stats::RewriteStats;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
