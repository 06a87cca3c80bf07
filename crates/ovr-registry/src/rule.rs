//! Replacement rules
//!
//! A [`ReplacementRule`] states, for one node kind, which types the
//! accelerated replacement accepts, what it requires of each child
//! position, which extra predicates must pass and how the replacement is
//! built. Rules are assembled with a [`RuleBuilder`] and never change
//! after registration.

use crate::capability::{ExtraCheck, NodeConstructor, Prefixed};
use crate::context::TagContext;
use ovr_plan::{AcceleratedNode, NodeClass, NodeKind, PlanNode, RewrittenNode};
use ovr_sig::TypeSig;
use std::fmt;
use std::sync::Arc;

/// What a parent requires of the child at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChildPolicy {
    /// A host child is fine when a transition exists for its output type
    #[default]
    Adaptable,
    /// The child must itself be accelerated
    Strict,
    /// Host and accelerated children both work without a transition
    Mixed,
}

/// Requirements for one child position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    /// Position name used in documentation
    pub name: String,
    /// Types the child's output must belong to, if constrained
    pub sig: Option<TypeSig>,
    /// Boundary policy for this position
    pub policy: ChildPolicy,
}

impl InputSpec {
    /// Unconstrained, adaptable position
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sig: None,
            policy: ChildPolicy::default(),
        }
    }

    /// Constrain the child's output type
    #[must_use]
    pub fn with_sig(mut self, sig: TypeSig) -> Self {
        self.sig = Some(sig);
        self
    }

    /// Set the boundary policy
    #[must_use]
    pub fn with_policy(mut self, policy: ChildPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// How far the accelerated replacement matches host results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Compatibility {
    /// Results match the host
    #[default]
    Full,
    /// Results can differ; used only when incompatible operators are
    /// allowed or the operator is explicitly enabled
    Incompatible(String),
    /// Used only when the operator is explicitly enabled
    DisabledByDefault(String),
}

impl Compatibility {
    /// Note explaining a restriction, if any
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Full => None,
            Self::Incompatible(note) | Self::DisabledByDefault(note) => Some(note),
        }
    }
}

/// Capability description for one node kind
pub struct ReplacementRule {
    kind: NodeKind,
    class: NodeClass,
    description: String,
    accelerated_sig: TypeSig,
    host_sig: TypeSig,
    inputs: Vec<InputSpec>,
    variadic: Option<InputSpec>,
    checks: Vec<Arc<dyn ExtraCheck>>,
    constructor: Arc<dyn NodeConstructor>,
    compat: Compatibility,
}

impl ReplacementRule {
    /// Start a rule for an expression kind
    pub fn expr(kind: impl Into<NodeKind>, description: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(kind.into(), NodeClass::Expression, description.into())
    }

    /// Start a rule for an exec kind
    pub fn exec(kind: impl Into<NodeKind>, description: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(kind.into(), NodeClass::Exec, description.into())
    }

    /// Node kind this rule replaces
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Class of the nodes this rule replaces
    #[inline]
    #[must_use]
    pub fn class(&self) -> NodeClass {
        self.class
    }

    /// Human-readable description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Output types the accelerated replacement supports
    #[inline]
    #[must_use]
    pub fn accelerated_sig(&self) -> &TypeSig {
        &self.accelerated_sig
    }

    /// Output types the host operator supports
    #[inline]
    #[must_use]
    pub fn host_sig(&self) -> &TypeSig {
        &self.host_sig
    }

    /// Requirements for the child at `position`
    #[must_use]
    pub fn input(&self, position: usize) -> Option<&InputSpec> {
        self.inputs.get(position).or(self.variadic.as_ref())
    }

    /// Declared fixed positions
    #[must_use]
    pub fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    /// Compatibility flag
    #[inline]
    #[must_use]
    pub fn compat(&self) -> &Compatibility {
        &self.compat
    }

    /// Run every extra check, collecting reasons in declaration order
    #[must_use]
    pub fn run_checks(&self, node: &PlanNode, ctx: &TagContext) -> Vec<String> {
        self.checks
            .iter()
            .filter_map(|check| check.check(node, ctx).err())
            .collect()
    }

    /// Build the accelerated replacement
    #[must_use]
    pub fn construct(&self, node: &PlanNode, children: Vec<RewrittenNode>) -> AcceleratedNode {
        self.constructor.construct(node, children)
    }
}

impl fmt::Debug for ReplacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplacementRule")
            .field("kind", &self.kind)
            .field("class", &self.class)
            .field("accelerated_sig", &self.accelerated_sig)
            .field("inputs", &self.inputs)
            .field("checks", &self.checks.len())
            .field("compat", &self.compat)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ReplacementRule`]
#[must_use]
pub struct RuleBuilder {
    rule: ReplacementRule,
}

impl RuleBuilder {
    fn new(kind: NodeKind, class: NodeClass, description: String) -> Self {
        Self {
            rule: ReplacementRule {
                kind,
                class,
                description,
                accelerated_sig: TypeSig::common(),
                host_sig: TypeSig::all(),
                inputs: Vec::new(),
                variadic: None,
                checks: Vec::new(),
                constructor: Arc::new(Prefixed::default()),
                compat: Compatibility::Full,
            },
        }
    }

    /// Output types the accelerated replacement supports
    pub fn signature(mut self, sig: TypeSig) -> Self {
        self.rule.accelerated_sig = sig;
        self
    }

    /// Output types the host operator supports, for documentation
    pub fn host_signature(mut self, sig: TypeSig) -> Self {
        self.rule.host_sig = sig;
        self
    }

    /// Append a fixed child position
    pub fn input(mut self, spec: InputSpec) -> Self {
        self.rule.inputs.push(spec);
        self
    }

    /// Requirements for every position past the fixed ones
    pub fn variadic(mut self, spec: InputSpec) -> Self {
        self.rule.variadic = Some(spec);
        self
    }

    /// Add an extra predicate
    pub fn check(mut self, check: impl ExtraCheck + 'static) -> Self {
        self.rule.checks.push(Arc::new(check));
        self
    }

    /// Replace the default constructor
    pub fn constructor(mut self, constructor: impl NodeConstructor + 'static) -> Self {
        self.rule.constructor = Arc::new(constructor);
        self
    }

    /// Mark results as possibly differing from the host
    pub fn incompatible(mut self, note: impl Into<String>) -> Self {
        self.rule.compat = Compatibility::Incompatible(note.into());
        self
    }

    /// Require an explicit enable
    pub fn disabled_by_default(mut self, note: impl Into<String>) -> Self {
        self.rule.compat = Compatibility::DisabledByDefault(note.into());
        self
    }

    /// Finish the rule
    #[must_use]
    pub fn build(self) -> ReplacementRule {
        self.rule
    }
}
