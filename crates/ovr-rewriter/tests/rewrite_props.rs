//! Rewriting properties over random plans

use ovr_plan::{Placement, RewrittenNode};
use ovr_rewriter::{PlanRewriter, RewriteStats};
use ovr_tagger::{CompatibilityTagger, TagConfig};
use ovr_test_utils::{default_registry, plan_strategy};
use proptest::prelude::*;

fn check_boundaries(root: &RewrittenNode) -> Result<(), TestCaseError> {
    for node in root.iter() {
        match node {
            RewrittenNode::Transition(t) => {
                prop_assert!(!t.input.is_transition(), "stacked transitions in {}", root);
                prop_assert_ne!(t.input.placement(), t.direction.target());
            }
            RewrittenNode::Host(host) => {
                for child in &host.children {
                    prop_assert_eq!(child.placement(), Placement::Host);
                }
            }
            RewrittenNode::Accelerated(accel) if accel.source_kind != "Union" => {
                for child in &accel.children {
                    prop_assert_eq!(child.placement(), Placement::Device);
                }
            }
            RewrittenNode::Accelerated(_) => {}
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_all_rejected_returns_original(plan in plan_strategy()) {
        let registry = default_registry();
        let tagged = CompatibilityTagger::new(&registry, TagConfig::default().with_enabled(false))
            .tag(&plan)
            .unwrap();
        let rewritten = PlanRewriter::new().rewrite(&tagged);
        prop_assert_eq!(RewriteStats::of(&rewritten).transitions(), 0);
        prop_assert_eq!(rewritten.into_host_plan(), Some(plan));
    }

    #[test]
    fn prop_shape_is_preserved(plan in plan_strategy(), incompatible in any::<bool>()) {
        let registry = default_registry();
        let config = TagConfig::default().with_incompatible_ops(incompatible);
        let tagged = CompatibilityTagger::new(&registry, config).tag(&plan).unwrap();
        let rewritten = PlanRewriter::new().rewrite(&tagged);
        prop_assert_eq!(rewritten.shape(), plan.shape());

        let stats = RewriteStats::of(&rewritten);
        prop_assert_eq!(stats.accelerated, tagged.accepted_count());
        prop_assert_eq!(stats.host, tagged.rejected_count());
    }

    #[test]
    fn prop_boundaries_are_adapted(plan in plan_strategy(), fuse in any::<bool>()) {
        let registry = default_registry();
        let config = TagConfig::default().with_expression_fusion(fuse);
        let tagged = CompatibilityTagger::new(&registry, config).tag(&plan).unwrap();
        let rewritten = PlanRewriter::new().rewrite(&tagged);
        prop_assert_eq!(rewritten.placement(), Placement::Host);
        check_boundaries(&rewritten)?;
    }
}
