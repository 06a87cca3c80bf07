//! Tagging scenarios over small fixture registries

use ovr_plan::PlanNode;
use ovr_sig::DataType;
use ovr_tagger::{CompatibilityTagger, TagConfig};
use ovr_test_utils::{acos, acos_registry, double_literal, join, join_registry, scan, string_literal};
use pretty_assertions::assert_eq;

#[test]
fn test_acos_double_is_accepted() {
    let registry = acos_registry();
    let plan = acos(DataType::Double, double_literal(0.25));
    let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
        .tag(&plan)
        .unwrap();
    assert!(tagged.root_decision().unwrap().is_accepted());
}

#[test]
fn test_acos_string_reason_is_exact() {
    let registry = acos_registry();
    let plan = acos(DataType::String, string_literal("nope"));
    let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
        .tag(&plan)
        .unwrap();
    let root = tagged.root_decision().unwrap();
    assert_eq!(root.reason().as_deref(), Some("output type STRING not in signature"));
}

#[test]
fn test_strict_join_rejects_with_unsupported_child() {
    let registry = join_registry();
    let plan = join(scan("ScanA", 100), scan("UnsupportedScan", 100));
    let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
        .tag(&plan)
        .unwrap();

    let kinds: Vec<(&str, bool)> = tagged
        .decisions
        .iter()
        .map(|d| (d.kind.as_str(), d.is_accepted()))
        .collect();
    assert_eq!(
        kinds,
        vec![("ScanA", true), ("UnsupportedScan", false), ("Join", false)]
    );
    let reason = tagged.root_decision().unwrap().reason().unwrap();
    assert!(reason.contains("child 1 (UnsupportedScan) is not accelerated"));
}

#[test]
fn test_disabled_kind_stays_on_host() {
    let registry = acos_registry();
    let plan = acos(DataType::Double, double_literal(0.25));
    let tagged = CompatibilityTagger::new(&registry, TagConfig::default().disable("Acos"))
        .tag(&plan)
        .unwrap();
    assert_eq!(
        tagged.root_decision().unwrap().reason().as_deref(),
        Some("Acos has been disabled; set sql.expression.Acos=true to enable it")
    );
}

#[test]
fn test_exec_under_host_expression_keeps_decision() {
    let registry = ovr_test_utils::default_registry();
    let plan = PlanNode::expr("ScalarSubquery", DataType::Long)
        .with_child(PlanNode::exec("Scan", DataType::Long));
    let tagged = CompatibilityTagger::new(&registry, TagConfig::default())
        .tag(&plan)
        .unwrap();
    assert!(tagged.decisions[0].is_accepted());
    assert!(!tagged.decisions[1].is_accepted());
}
