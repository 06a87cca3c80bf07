//! Error types for the overrides engine
//!
//! Rejections are not errors; they are reported through decisions. The
//! types here cover malformed input, bad configuration and registry
//! lifecycle problems.

use ovr_plan::StructuralTreeError;
use ovr_registry::{DuplicateRuleError, RegistryError};
use std::path::PathBuf;

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The key is not a known setting
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The value does not parse for this key
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// Setting key
        key: String,
        /// Offending value
        value: String,
        /// What was expected
        reason: String,
    },

    /// A command-line setting without `=`
    #[error("setting '{0}' must be written as key=value")]
    MalformedSetting(String),

    /// TOML syntax error
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    /// Two rules registered for one kind
    #[error(transparent)]
    DuplicateRule(#[from] DuplicateRuleError),

    /// Registry installation failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The plan is not a well-formed tree
    #[error("malformed plan: {0}")]
    Structural(#[from] StructuralTreeError),

    /// Configuration could not be applied
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Test mode found nodes on the host that were expected on the accelerator
    #[error(
        "test mode: {} node(s) unexpectedly stayed on the host: {}",
        .kinds.len(),
        .kinds.join(", ")
    )]
    UnexpectedFallback {
        /// Kinds of the offending nodes, one entry per node
        kinds: Vec<String>,
    },
}

impl OverrideError {
    /// Check if the error is caused by the input plan rather than setup
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}
