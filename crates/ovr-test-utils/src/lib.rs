//! Testing utilities for the plan overrides workspace
//!
//! Shared plan builders, registries and proptest strategies.

#![allow(missing_docs)]

use ovr_plan::{PlanNode, ESTIMATED_BYTES};
use ovr_registry::{ChildPolicy, InputSpec, RegistryBuilder, ReplacementRule, RuleRegistry};
use ovr_sig::{DataType, TypeSig, TypeTags};
use proptest::prelude::*;

pub fn double_literal(value: f64) -> PlanNode {
    PlanNode::expr("Literal", DataType::Double).with_param("value", value)
}

pub fn string_literal(value: &str) -> PlanNode {
    PlanNode::expr("Literal", DataType::String).with_param("value", value)
}

pub fn acos(output_type: DataType, child: PlanNode) -> PlanNode {
    PlanNode::expr("Acos", output_type).with_child(child)
}

pub fn scan(kind: &str, estimated_bytes: i64) -> PlanNode {
    PlanNode::exec(kind, DataType::Long).with_param(ESTIMATED_BYTES, estimated_bytes)
}

pub fn join(left: PlanNode, right: PlanNode) -> PlanNode {
    PlanNode::exec("Join", DataType::Long)
        .with_child(left)
        .with_child(right)
}

pub fn literal_rule() -> ReplacementRule {
    ReplacementRule::expr("Literal", "constant value")
        .signature(TypeSig::all())
        .build()
}

/// `Acos` accepting doubles, with no input constraint, plus `Literal`
pub fn acos_registry() -> RuleRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .register(
            ReplacementRule::expr("Acos", "inverse cosine")
                .signature(TypeSig::of(TypeTags::DOUBLE))
                .build(),
        )
        .unwrap();
    builder.register(literal_rule()).unwrap();
    builder.build()
}

/// `Join` with strict inputs; `ScanA` is registered, `UnsupportedScan` is not
pub fn join_registry() -> RuleRegistry {
    let mut builder = RegistryBuilder::new();
    builder
        .register(
            ReplacementRule::exec("Join", "equi-join")
                .signature(TypeSig::common())
                .input(InputSpec::new("left").with_policy(ChildPolicy::Strict))
                .input(InputSpec::new("right").with_policy(ChildPolicy::Strict))
                .build(),
        )
        .unwrap();
    builder
        .register(
            ReplacementRule::exec("ScanA", "supported scan")
                .signature(TypeSig::common())
                .build(),
        )
        .unwrap();
    builder.build()
}

pub fn default_registry() -> RuleRegistry {
    RegistryBuilder::with_defaults().unwrap().build()
}

/// `Filter` chain of `depth` levels over a `Scan`
pub fn deep_plan(depth: usize) -> PlanNode {
    let mut plan = scan("Scan", 1024);
    for _ in 0..depth {
        plan = PlanNode::exec("Filter", DataType::Long).with_child(plan);
    }
    plan
}

/// `Project` of `width` aliased columns over a `Scan`
pub fn wide_plan(width: usize) -> PlanNode {
    let mut project = PlanNode::exec("Project", DataType::Long);
    for i in 0..width {
        let alias = PlanNode::expr("Alias", DataType::Double)
            .with_param("name", format!("c{i}"))
            .with_child(
                PlanNode::expr("Acos", DataType::Double)
                    .with_child(PlanNode::expr("ColumnRef", DataType::Double)),
            );
        project = project.with_child(alias);
    }
    project.with_child(scan("Scan", 4096))
}

pub fn data_type_strategy() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Boolean),
        Just(DataType::Int),
        Just(DataType::Long),
        Just(DataType::Double),
        Just(DataType::String),
        Just(DataType::Binary),
        Just(DataType::decimal(10, 2)),
        Just(DataType::decimal(30, 2)),
        Just(DataType::array_of(DataType::Double)),
    ]
}

/// Kinds drawn from the built-in rules plus a few host-only ones
pub const PLAN_KINDS: [&str; 12] = [
    "Acos", "Add", "Literal", "ColumnRef", "Upper", "Project", "Filter", "HashJoin", "Union",
    "CollectLimit", "Window", "PythonUdf",
];

/// Random plans of kinds from [`PLAN_KINDS`]
pub fn plan_strategy() -> impl Strategy<Value = PlanNode> {
    let leaf = (0..PLAN_KINDS.len(), data_type_strategy(), any::<bool>()).prop_map(
        |(kind, ty, is_expr)| {
            if is_expr {
                PlanNode::expr(PLAN_KINDS[kind], ty)
            } else {
                PlanNode::exec(PLAN_KINDS[kind], ty)
            }
        },
    );
    leaf.prop_recursive(6, 64, 4, |inner| {
        (
            0..PLAN_KINDS.len(),
            data_type_strategy(),
            any::<bool>(),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(kind, ty, is_expr, children)| {
                let node = if is_expr {
                    PlanNode::expr(PLAN_KINDS[kind], ty)
                } else {
                    PlanNode::exec(PLAN_KINDS[kind], ty)
                };
                node.with_children(children)
            })
    })
}
