//! Rule registry
//!
//! [`RegistryBuilder`] collects rules during start-up and rejects a second
//! rule for the same kind. [`RegistryBuilder::build`] freezes the set into
//! a [`RuleRegistry`], which is immutable and shared freely between
//! threads. One registry can be installed process-wide; the write-once
//! cell makes every rule visible to all readers once installation returns.

use crate::matrix::SupportMatrix;
use crate::rule::ReplacementRule;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use ovr_plan::NodeKind;
use ovr_sig::{DataType, TypeSig};
use std::sync::Arc;
use thiserror::Error;

/// A rule for this kind is already registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a replacement rule for '{kind}' is already registered")]
pub struct DuplicateRuleError {
    /// Kind registered twice
    pub kind: NodeKind,
}

/// Registry lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two rules for one kind
    #[error(transparent)]
    Duplicate(#[from] DuplicateRuleError),

    /// The process-wide registry was installed before
    #[error("the process-wide rule registry is already installed")]
    AlreadyInstalled,
}

/// Mutable collection of rules used during start-up
#[derive(Debug)]
pub struct RegistryBuilder {
    rules: IndexMap<NodeKind, Arc<ReplacementRule>>,
    transition_sig: TypeSig,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Create an empty builder; transitions exist for every type
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
            transition_sig: TypeSig::all(),
        }
    }

    /// Create a builder holding the built-in rules
    ///
    /// # Errors
    /// [`DuplicateRuleError`] if the built-in set names a kind twice.
    pub fn with_defaults() -> Result<Self, DuplicateRuleError> {
        let mut builder = Self::new();
        builder.register_defaults()?;
        Ok(builder)
    }

    /// Restrict the types host/accelerator transitions exist for
    #[must_use]
    pub fn with_transition_types(mut self, sig: TypeSig) -> Self {
        self.transition_sig = sig;
        self
    }

    /// Add a rule
    ///
    /// # Errors
    /// [`DuplicateRuleError`] if the kind already has a rule; the existing
    /// rule stays in place.
    pub fn register(&mut self, rule: ReplacementRule) -> Result<(), DuplicateRuleError> {
        if self.rules.contains_key(rule.kind()) {
            return Err(DuplicateRuleError {
                kind: rule.kind().clone(),
            });
        }
        tracing::trace!(kind = %rule.kind(), class = %rule.class(), "registered replacement rule");
        self.rules.insert(rule.kind().clone(), Arc::new(rule));
        Ok(())
    }

    /// Add several rules, stopping at the first duplicate
    ///
    /// # Errors
    /// [`DuplicateRuleError`] for the first kind already present.
    pub fn register_all(
        &mut self,
        rules: impl IntoIterator<Item = ReplacementRule>,
    ) -> Result<(), DuplicateRuleError> {
        rules.into_iter().try_for_each(|rule| self.register(rule))
    }

    /// Add the built-in rules
    ///
    /// # Errors
    /// [`DuplicateRuleError`] if one of them is already present.
    pub fn register_defaults(&mut self) -> Result<(), DuplicateRuleError> {
        self.register_all(crate::defaults::default_rules())
    }

    /// Number of rules so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rule is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freeze into an immutable registry
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            rules: self.rules,
            transition_sig: self.transition_sig,
        }
    }
}

/// Immutable set of rules keyed by node kind
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: IndexMap<NodeKind, Arc<ReplacementRule>>,
    transition_sig: TypeSig,
}

impl RuleRegistry {
    /// Start building a registry
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Rule for `kind`; `None` means the kind is host-only
    #[inline]
    #[must_use]
    pub fn lookup(&self, kind: &str) -> Option<&Arc<ReplacementRule>> {
        self.rules.get(kind)
    }

    /// Check if a rule exists for `kind`
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }

    /// Rules in registration order
    pub fn rules(&self) -> impl Iterator<Item = &Arc<ReplacementRule>> {
        self.rules.values()
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Types a host/accelerator transition exists for
    #[must_use]
    pub fn transition_sig(&self) -> &TypeSig {
        &self.transition_sig
    }

    /// Check if a value of `ty` can cross the host/accelerator boundary
    #[must_use]
    pub fn has_transition(&self, ty: &DataType) -> bool {
        self.transition_sig.contains(ty)
    }

    /// Per-type support table of every rule
    #[must_use]
    pub fn support_matrix(&self) -> SupportMatrix {
        SupportMatrix::from_registry(self)
    }
}

static GLOBAL: OnceCell<RuleRegistry> = OnceCell::new();

/// Install the process-wide registry
///
/// # Errors
/// [`RegistryError::AlreadyInstalled`] on every call after the first.
pub fn install_global(registry: RuleRegistry) -> Result<&'static RuleRegistry, RegistryError> {
    let installed = GLOBAL
        .try_insert(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    tracing::info!(rules = installed.len(), "installed process-wide rule registry");
    Ok(installed)
}

/// The process-wide registry, if installed
#[must_use]
pub fn global() -> Option<&'static RuleRegistry> {
    GLOBAL.get()
}

/// The process-wide registry, installing the built-in rules if empty
///
/// # Errors
/// [`RegistryError::Duplicate`] if the built-in rules clash.
pub fn global_or_defaults() -> Result<&'static RuleRegistry, RegistryError> {
    GLOBAL
        .get_or_try_init(|| RegistryBuilder::with_defaults().map(RegistryBuilder::build))
        .map_err(RegistryError::from)
}
