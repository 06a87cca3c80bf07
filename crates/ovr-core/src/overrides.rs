//! Plan overrides engine
//!
//! Runs the full pass over a plan: tag every node against the registry,
//! rewrite the tree with transitions at each boundary, render explain
//! output and record metrics. The registry is shared and immutable, so
//! one engine can serve many plans at once.

use crate::config::OverrideConfig;
use crate::error::OverrideError;
use ovr_plan::{PlanArena, PlanNode, RewrittenNode};
use ovr_registry::{global_or_defaults, RuleRegistry};
use ovr_rewriter::{PlanRewriter, RewriteStats};
use ovr_tagger::{
    decision_records, explain, CompatibilityTagger, DecisionRecord, ExplainMode, TaggedPlan,
};
use rayon::prelude::*;
use serde::Serialize;

/// Result of applying overrides to one plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverrideOutcome {
    /// Executable tree
    pub plan: RewrittenNode,
    /// One record per input node, in post-order
    pub decisions: Vec<DecisionRecord>,
    /// Explain text in the configured mode; empty when explain is off
    #[serde(skip_serializing_if = "String::is_empty")]
    pub explain: String,
    /// Node and transition counts of `plan`
    pub stats: RewriteStats,
}

impl OverrideOutcome {
    /// Check if every input node was accelerated
    #[must_use]
    pub fn fully_accelerated(&self) -> bool {
        self.decisions.iter().all(|d| d.accelerated)
    }

    /// Records of nodes that stay on the host
    pub fn fallbacks(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.decisions.iter().filter(|d| !d.accelerated)
    }

    /// Fail unless every node outside `allowed` was accelerated
    ///
    /// # Errors
    /// [`OverrideError::UnexpectedFallback`] listing the offending kinds.
    pub fn ensure_accelerated<'a, I>(&self, allowed: I) -> Result<(), OverrideError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let allowed: Vec<&str> = allowed.into_iter().collect();
        let kinds: Vec<String> = self
            .fallbacks()
            .filter(|d| !allowed.contains(&d.kind.as_str()))
            .map(|d| d.kind.to_string())
            .collect();
        if kinds.is_empty() {
            Ok(())
        } else {
            Err(OverrideError::UnexpectedFallback { kinds })
        }
    }
}

/// Applies replacement rules to plans
#[derive(Debug, Clone)]
pub struct PlanOverrides<'r> {
    registry: &'r RuleRegistry,
    config: OverrideConfig,
    rewriter: PlanRewriter,
}

impl PlanOverrides<'static> {
    /// Engine over the process-wide registry, installing the built-in
    /// rules if nothing was installed yet
    ///
    /// # Errors
    /// [`OverrideError::Registry`] if the built-in rules cannot be installed.
    pub fn with_global(config: OverrideConfig) -> Result<Self, OverrideError> {
        Ok(Self::new(global_or_defaults()?, config))
    }
}

impl<'r> PlanOverrides<'r> {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(registry: &'r RuleRegistry, config: OverrideConfig) -> Self {
        Self {
            registry,
            config,
            rewriter: PlanRewriter::new(),
        }
    }

    /// With rewriter
    #[inline]
    #[must_use]
    pub fn with_rewriter(mut self, rewriter: PlanRewriter) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// Rule registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }

    /// Tag `plan` without rewriting it
    ///
    /// # Errors
    /// [`OverrideError::Structural`] if the plan exceeds the depth ceiling.
    pub fn tag<'p>(&self, plan: &'p PlanNode) -> Result<TaggedPlan<'p>, OverrideError> {
        let tagger = CompatibilityTagger::new(self.registry, self.config.tag_config());
        Ok(tagger.tag(plan)?)
    }

    /// Tag and rewrite `plan`
    ///
    /// # Errors
    /// [`OverrideError::Structural`] for plans beyond the depth ceiling;
    /// [`OverrideError::UnexpectedFallback`] in test mode when a node not
    /// on the allowed list stays on the host.
    pub fn apply(&self, plan: &PlanNode) -> Result<OverrideOutcome, OverrideError> {
        self.run(plan, self.config.explain, true)
    }

    /// Tag and rewrite `plan`, rendering explain text in `mode` into the
    /// outcome instead of the log
    ///
    /// # Errors
    /// As [`PlanOverrides::apply`].
    pub fn apply_with_explain(
        &self,
        plan: &PlanNode,
        mode: ExplainMode,
    ) -> Result<OverrideOutcome, OverrideError> {
        self.run(plan, mode, false)
    }

    fn run(
        &self,
        plan: &PlanNode,
        mode: ExplainMode,
        log_explain: bool,
    ) -> Result<OverrideOutcome, OverrideError> {
        let span = tracing::info_span!("apply_overrides", root = %plan.kind);
        let _guard = span.enter();

        let tagged = self.tag(plan)?;
        let explain_text = explain(&tagged, mode);
        if log_explain && !explain_text.is_empty() {
            tracing::warn!("\n{}", explain_text.trim_end());
        }

        let rewritten = self.rewriter.rewrite(&tagged);
        let stats = RewriteStats::of(&rewritten);
        record_metrics(&stats);
        tracing::info!(
            "Applied overrides: {} of {} nodes accelerated, {} transitions",
            tagged.accepted_count(),
            tagged.decisions.len(),
            stats.transitions()
        );

        let outcome = OverrideOutcome {
            plan: rewritten,
            decisions: decision_records(&tagged),
            explain: explain_text,
            stats,
        };
        if self.config.test.enabled {
            outcome.ensure_accelerated(
                self.config
                    .test
                    .allowed_non_accelerated
                    .iter()
                    .map(|k| k.as_str()),
            )?;
        }
        Ok(outcome)
    }

    /// Assemble an arena into a tree, then apply
    ///
    /// # Errors
    /// [`OverrideError::Structural`] for any malformed arena, otherwise as
    /// [`PlanOverrides::apply`].
    pub fn apply_arena(&self, arena: &PlanArena) -> Result<OverrideOutcome, OverrideError> {
        let plan = arena.to_tree(self.config.max_plan_depth)?;
        self.apply(&plan)
    }

    /// Apply to many independent plans in parallel
    ///
    /// Results keep the order of `plans`; one failing plan does not affect
    /// the others.
    #[must_use]
    pub fn apply_all(&self, plans: &[PlanNode]) -> Vec<Result<OverrideOutcome, OverrideError>> {
        plans.par_iter().map(|plan| self.apply(plan)).collect()
    }

    /// Explain `plan` in `mode` without rewriting it
    ///
    /// # Errors
    /// As [`PlanOverrides::tag`].
    pub fn explain(&self, plan: &PlanNode, mode: ExplainMode) -> Result<String, OverrideError> {
        let tagged = self.tag(plan)?;
        Ok(explain(&tagged, mode))
    }
}

fn record_metrics(stats: &RewriteStats) {
    metrics::counter!("ovr_plans_total").increment(1);
    metrics::counter!("ovr_nodes_accelerated_total").increment(stats.accelerated as u64);
    metrics::counter!("ovr_nodes_host_total").increment(stats.host as u64);
    metrics::counter!("ovr_transitions_total", "direction" => "host_to_device")
        .increment(stats.host_to_device as u64);
    metrics::counter!("ovr_transitions_total", "direction" => "device_to_host")
        .increment(stats.device_to_host as u64);
}
