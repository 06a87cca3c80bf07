//! Accelerated Plan Overrides: Type Signatures
//!
//! Data types carried by plan nodes and the signature algebra used to
//! describe which of them an accelerated operator supports.
//!
//! # Overview
//!
//! - **DataType**: concrete, possibly nested type of a node's output
//! - **TypeTags**: bitset over the flat tag enumeration
//! - **TypeSig**: immutable set expression with union, intersection,
//!   membership and nested expansion
//!
//! # Example
//!
//! ```rust
//! use ovr_sig::{DataType, TypeSig, TypeTags};
//!
//! let sig = TypeSig::of(TypeTags::DOUBLE) + TypeSig::decimal_64();
//! assert!(sig.contains(&DataType::Double));
//! assert!(!sig.contains(&DataType::String));
//! assert!(sig.nested().contains(&DataType::array_of(DataType::Double)));
//! ```

#![warn(missing_docs)]

pub mod data_type;
pub mod decimal;
pub mod sig;
pub mod tags;

// Re-exports
pub use data_type::{DataType, DataTypeParseError, StructField, TypeTag};
pub use decimal::{DecimalBounds, DECIMAL_128_MAX_PRECISION, DECIMAL_64_MAX_PRECISION};
pub use sig::{RecursionLimitExceeded, TypeSig, MAX_NESTING_DEPTH};
pub use tags::TypeTags;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
