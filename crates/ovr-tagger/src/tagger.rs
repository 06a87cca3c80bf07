//! Compatibility tagger
//!
//! Walks a plan bottom-up and decides, for every node, whether its
//! replacement rule accepts it. Every failing condition contributes a
//! reason, so a rejected node reports all of them at once. Tagging never
//! fails for a well-formed plan; only a plan deeper than the configured
//! ceiling is refused.

use crate::config::TagConfig;
use crate::decision::{NodeId, Reasons, TagDecision, TagOutcome, TaggedNode, TaggedPlan};
use crate::fallback::fuse_expression_fallback;
use ovr_plan::{NodeClass, PlanNode, StructuralTreeError};
use ovr_registry::{ChildPolicy, Compatibility, RuleRegistry};
use std::sync::Arc;

/// Tags plans against a registry
#[derive(Debug, Clone)]
pub struct CompatibilityTagger<'r> {
    registry: &'r RuleRegistry,
    config: TagConfig,
}

impl<'r> CompatibilityTagger<'r> {
    /// Create a tagger
    #[must_use]
    pub fn new(registry: &'r RuleRegistry, config: TagConfig) -> Self {
        Self { registry, config }
    }

    /// Registry consulted for rules
    #[must_use]
    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &TagConfig {
        &self.config
    }

    /// Produce one decision per node of `plan`
    ///
    /// # Errors
    /// [`StructuralTreeError::TooDeep`] when the plan is deeper than
    /// [`TagConfig::max_depth`].
    pub fn tag<'p>(&self, plan: &'p PlanNode) -> Result<TaggedPlan<'p>, StructuralTreeError> {
        if plan.depth() > self.config.max_depth {
            return Err(StructuralTreeError::TooDeep {
                limit: self.config.max_depth,
            });
        }

        let mut decisions = Vec::with_capacity(plan.node_count());
        let root = self.tag_node(plan, 0, &mut decisions);
        let mut tagged = TaggedPlan { root, decisions };

        if self.config.fuse_expression_fallback {
            let demoted = fuse_expression_fallback(&mut tagged);
            if demoted > 0 {
                tracing::debug!(demoted, "kept expressions on the host with their parents");
            }
        }

        for decision in &tagged.decisions {
            if let Some(reason) = decision.reason() {
                tracing::debug!(
                    node = %decision.node,
                    kind = %decision.kind,
                    class = %decision.class,
                    %reason,
                    "node stays on the host"
                );
            }
        }
        Ok(tagged)
    }

    fn tag_node<'p>(
        &self,
        node: &'p PlanNode,
        depth: usize,
        decisions: &mut Vec<TagDecision>,
    ) -> TaggedNode<'p> {
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.tag_node(child, depth + 1, decisions));
        }

        let outcome = self.decide(node, &children, decisions);
        let id = NodeId(decisions.len());
        decisions.push(TagDecision {
            node: id,
            kind: node.kind.clone(),
            class: node.class,
            depth,
            outcome,
        });
        TaggedNode {
            node,
            id,
            depth,
            children,
        }
    }

    fn decide(
        &self,
        node: &PlanNode,
        children: &[TaggedNode<'_>],
        decisions: &[TagDecision],
    ) -> TagOutcome {
        let mut reasons = Reasons::new();
        if !self.config.enabled {
            reasons.push("acceleration is disabled".to_string());
            return TagOutcome::Rejected { reasons };
        }

        let key = format!("{}.{}", node.class.config_prefix(), node.kind);
        let explicitly_enabled = self.config.is_explicitly_enabled(node.kind.as_str());
        if self.config.is_disabled(node.kind.as_str()) {
            reasons.push(format!("{} has been disabled; set {key}=true to enable it", node.kind));
        }

        let Some(rule) = self.registry.lookup(node.kind.as_str()) else {
            reasons.push(format!(
                "{} is host-only: no replacement rule is registered",
                node.kind
            ));
            return TagOutcome::Rejected { reasons };
        };

        if rule.class() != node.class {
            reasons.push(format!(
                "the rule for {} replaces {} nodes, not {}",
                node.kind,
                rule.class(),
                node.class
            ));
        }

        match rule.compat() {
            Compatibility::Incompatible(note)
                if !(self.config.incompatible_ops || explicitly_enabled) =>
            {
                reasons.push(format!(
                    "{} is not fully compatible with the host ({note}); set \
                     sql.incompatibleOps.enabled=true or {key}=true to enable it",
                    node.kind
                ));
            }
            Compatibility::DisabledByDefault(note) if !explicitly_enabled => {
                reasons.push(format!(
                    "{} is disabled by default ({note}); set {key}=true to enable it",
                    node.kind
                ));
            }
            _ => {}
        }

        if !rule.accelerated_sig().contains(&node.output_type) {
            reasons.push(format!("output type {} not in signature", node.output_type));
        }

        for (position, child) in children.iter().enumerate() {
            let input = child.node;
            let spec = rule.input(position);
            if let Some(spec) = spec {
                if let Some(sig) = &spec.sig {
                    if !sig.contains(&input.output_type) {
                        reasons.push(format!(
                            "child {position} ({}) type {} not in input signature for {}",
                            input.kind, input.output_type, spec.name
                        ));
                    }
                }
            }

            if decisions[child.id.index()].is_accepted() {
                continue;
            }
            if input.class == NodeClass::Expression {
                reasons.push(format!(
                    "child {position} ({}) is an expression that cannot run on the accelerator",
                    input.kind
                ));
                continue;
            }
            match spec.map(|s| s.policy).unwrap_or_default() {
                ChildPolicy::Mixed => {}
                ChildPolicy::Strict => {
                    reasons.push(format!("child {position} ({}) is not accelerated", input.kind));
                }
                ChildPolicy::Adaptable => {
                    if !self.registry.has_transition(&input.output_type) {
                        reasons.push(format!(
                            "no transition exists for {} produced by child {position} ({})",
                            input.output_type, input.kind
                        ));
                    }
                }
            }
        }

        for reason in rule.run_checks(node, &self.config.context) {
            if reason.trim().is_empty() {
                reasons.push(format!("{} failed an extra check", node.kind));
            } else {
                reasons.push(reason);
            }
        }

        if reasons.is_empty() {
            TagOutcome::Accepted {
                rule: Arc::clone(rule),
            }
        } else {
            TagOutcome::Rejected { reasons }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovr_plan::ESTIMATED_BYTES;
    use ovr_registry::{InputSpec, RegistryBuilder, ReplacementRule, TagContext};
    use ovr_sig::{DataType, TypeSig, TypeTags};
    use ovr_test_utils::{acos, acos_registry, default_registry, double_literal, string_literal};

    fn tag_with<'p>(
        registry: &RuleRegistry,
        config: TagConfig,
        plan: &'p PlanNode,
    ) -> TaggedPlan<'p> {
        CompatibilityTagger::new(registry, config).tag(plan).unwrap()
    }

    #[test]
    fn acos_over_double_literal_is_accepted() {
        let registry = acos_registry();
        let plan = acos(DataType::Double, double_literal(0.5));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert_eq!(tagged.decisions.len(), 2);
        assert!(tagged.decisions.iter().all(TagDecision::is_accepted));
        assert_eq!(tagged.root.id, NodeId(1));
    }

    #[test]
    fn acos_with_string_output_names_the_type() {
        let registry = acos_registry();
        let plan = acos(DataType::String, string_literal("x"));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        let root = tagged.root_decision().unwrap();
        assert_eq!(root.reasons(), ["output type STRING not in signature".to_string()]);
    }

    #[test]
    fn unknown_kind_is_host_only() {
        let registry = acos_registry();
        let plan = PlanNode::expr("Cosh", DataType::Double).with_child(double_literal(1.0));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert_eq!(
            tagged.root_decision().unwrap().reason().unwrap(),
            "Cosh is host-only: no replacement rule is registered"
        );
        assert_eq!(
            tagged.decisions[0].reason().unwrap(),
            "expression stays on the host with its parent Cosh"
        );
    }

    #[test]
    fn host_expression_pins_its_owners_to_the_host() {
        let registry = default_registry();
        let plan = PlanNode::exec("Project", DataType::Double)
            .with_child(
                PlanNode::expr("Acos", DataType::Double).with_child(
                    PlanNode::expr("Cosh", DataType::Double)
                        .with_child(PlanNode::expr("ColumnRef", DataType::Double)),
                ),
            )
            .with_child(PlanNode::exec("Scan", DataType::Double));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);

        let reasons: Vec<(&str, String)> = tagged
            .decisions
            .iter()
            .map(|d| (d.kind.as_str(), d.reason().unwrap_or_default()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("ColumnRef", "expression stays on the host with its parent Cosh".to_string()),
                ("Cosh", "Cosh is host-only: no replacement rule is registered".to_string()),
                (
                    "Acos",
                    "child 0 (Cosh) is an expression that cannot run on the accelerator"
                        .to_string()
                ),
                ("Scan", String::new()),
                (
                    "Project",
                    "child 0 (Acos) is an expression that cannot run on the accelerator"
                        .to_string()
                ),
            ]
        );
    }

    #[test]
    fn mixed_policy_does_not_admit_host_expressions() {
        let registry = default_registry();
        let plan = PlanNode::exec("Union", DataType::Long)
            .with_child(PlanNode::exec("Window", DataType::Long))
            .with_child(PlanNode::expr("PythonUdf", DataType::Long));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert_eq!(
            tagged.root_decision().unwrap().reasons(),
            ["child 1 (PythonUdf) is an expression that cannot run on the accelerator".to_string()]
        );
    }

    #[test]
    fn node_ids_index_the_decision_list() {
        let registry = default_registry();
        let plan = ovr_test_utils::wide_plan(64);
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert_eq!(tagged.decisions.len(), plan.node_count());
        for (position, decision) in tagged.decisions.iter().enumerate() {
            assert_eq!(decision.node, NodeId(position));
            assert_eq!(tagged.decision(decision.node).unwrap().kind, decision.kind);
        }
        assert_eq!(tagged.root.id.index(), plan.node_count() - 1);
    }

    #[test]
    fn every_failing_condition_is_reported() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                ReplacementRule::expr("Acos", "inverse cosine")
                    .signature(TypeSig::of(TypeTags::DOUBLE))
                    .input(InputSpec::new("input").with_sig(TypeSig::of(TypeTags::DOUBLE)))
                    .check(|_: &PlanNode, _: &TagContext| -> Result<(), String> {
                        Err("custom".to_string())
                    })
                    .check(|_: &PlanNode, _: &TagContext| -> Result<(), String> {
                        Err(String::new())
                    })
                    .build(),
            )
            .unwrap();
        builder.register(ovr_test_utils::literal_rule()).unwrap();
        let registry = builder.build();

        let plan = acos(DataType::String, string_literal("x"));
        let tagged = tag_with(&registry, TagConfig::default().disable("Acos"), &plan);
        let reasons = tagged.root_decision().unwrap().reasons().to_vec();
        assert_eq!(
            reasons,
            vec![
                "Acos has been disabled; set sql.expression.Acos=true to enable it".to_string(),
                "output type STRING not in signature".to_string(),
                "child 0 (Literal) type STRING not in input signature for input".to_string(),
                "custom".to_string(),
                "Acos failed an extra check".to_string(),
            ]
        );
    }

    #[test]
    fn disabled_master_switch_rejects_everything() {
        let registry = acos_registry();
        let plan = acos(DataType::Double, double_literal(0.5));
        let tagged = tag_with(&registry, TagConfig::default().with_enabled(false), &plan);
        assert_eq!(tagged.accepted_count(), 0);
        assert!(tagged
            .decisions
            .iter()
            .all(|d| d.reason().as_deref() == Some("acceleration is disabled")));
    }

    #[test]
    fn incompatible_and_disabled_by_default_need_opt_in() {
        let registry = default_registry();
        let upper = PlanNode::expr("Upper", DataType::String)
            .with_child(PlanNode::expr("ColumnRef", DataType::String));

        let tagged = tag_with(&registry, TagConfig::default(), &upper);
        assert!(!tagged.root_decision().unwrap().is_accepted());
        let tagged = tag_with(&registry, TagConfig::default().with_incompatible_ops(true), &upper);
        assert!(tagged.root_decision().unwrap().is_accepted());
        let tagged = tag_with(&registry, TagConfig::default().enable("Upper"), &upper);
        assert!(tagged.root_decision().unwrap().is_accepted());

        let limit = PlanNode::exec("CollectLimit", DataType::Long)
            .with_child(PlanNode::exec("Scan", DataType::Long));
        let tagged = tag_with(&registry, TagConfig::default().with_incompatible_ops(true), &limit);
        assert!(tagged.root_decision().unwrap().reason().unwrap().contains("disabled by default"));
        let tagged = tag_with(&registry, TagConfig::default().enable("CollectLimit"), &limit);
        assert!(tagged.root_decision().unwrap().is_accepted());
    }

    #[test]
    fn class_mismatch_is_rejected() {
        let registry = acos_registry();
        let plan = PlanNode::exec("Acos", DataType::Double);
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert_eq!(
            tagged.root_decision().unwrap().reason().unwrap(),
            "the rule for Acos replaces Expression nodes, not Exec"
        );
    }

    #[test]
    fn adaptable_child_needs_a_transition() {
        let registry = RegistryBuilder::with_defaults()
            .unwrap()
            .with_transition_types(TypeSig::common())
            .build();
        let plan = PlanNode::exec("Filter", DataType::Long)
            .with_child(PlanNode::exec("Window", DataType::array_of(DataType::Long)));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert_eq!(
            tagged.root_decision().unwrap().reasons()[0],
            "no transition exists for ARRAY<LONG> produced by child 0 (Window)"
        );

        let plan = PlanNode::exec("Filter", DataType::Long)
            .with_child(PlanNode::exec("Window", DataType::Long));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert!(tagged.root_decision().unwrap().is_accepted());
    }

    #[test]
    fn mixed_positions_accept_host_children() {
        let registry = default_registry();
        let plan = PlanNode::exec("Union", DataType::Long)
            .with_child(PlanNode::exec("Scan", DataType::Long))
            .with_child(PlanNode::exec("Window", DataType::Long));
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert!(tagged.root_decision().unwrap().is_accepted());
        assert_eq!(tagged.accepted_count(), 2);
    }

    #[test]
    fn join_build_side_over_budget() {
        let registry = default_registry();
        let plan = PlanNode::exec("HashJoin", DataType::Long)
            .with_child(PlanNode::exec("Scan", DataType::Long))
            .with_child(PlanNode::exec("Scan", DataType::Long).with_param(ESTIMATED_BYTES, 4096_i64));
        let small = TagConfig::default().with_context(TagContext::default().with_memory_budget(1024));
        let tagged = tag_with(&registry, small, &plan);
        assert!(!tagged.root_decision().unwrap().is_accepted());

        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        assert!(tagged.root_decision().unwrap().is_accepted());
    }

    #[test]
    fn too_deep_plan_is_structural_error() {
        let registry = default_registry();
        let plan = ovr_test_utils::deep_plan(10);
        let tagger = CompatibilityTagger::new(&registry, TagConfig::default().with_max_depth(5));
        assert_eq!(
            tagger.tag(&plan).unwrap_err(),
            StructuralTreeError::TooDeep { limit: 5 }
        );
    }

    #[test]
    fn decisions_are_post_order() {
        let registry = default_registry();
        let plan = ovr_test_utils::wide_plan(2);
        let tagged = tag_with(&registry, TagConfig::default(), &plan);
        let kinds: Vec<&str> = tagged.decisions.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["ColumnRef", "Acos", "Alias", "ColumnRef", "Acos", "Alias", "Scan", "Project"]
        );
        assert_eq!(tagged.root.id.index(), tagged.decisions.len() - 1);
        assert_eq!(tagged.decisions[0].depth, 3);
    }
}
