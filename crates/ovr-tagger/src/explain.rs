//! Explain output
//!
//! Renders tag decisions as indented text, one line per node in
//! pre-order, or as serializable records.

use crate::decision::{TagDecision, TaggedPlan};
use ovr_plan::{NodeClass, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Which decisions explain output shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExplainMode {
    /// Nothing
    #[default]
    None,
    /// Only nodes that stay on the host
    NotOnAccelerator,
    /// Every node
    All,
}

/// Unknown explain mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown explain mode '{0}'; expected NONE, NOT_ON_ACCELERATOR or ALL")]
pub struct ExplainModeParseError(pub String);

impl FromStr for ExplainMode {
    type Err = ExplainModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "NOT_ON_ACCELERATOR" | "NOT_ON_GPU" => Ok(Self::NotOnAccelerator),
            "ALL" => Ok(Self::All),
            _ => Err(ExplainModeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ExplainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "NONE",
            Self::NotOnAccelerator => "NOT_ON_ACCELERATOR",
            Self::All => "ALL",
        })
    }
}

/// One explain line
#[must_use]
pub fn explain_line(decision: &TagDecision) -> String {
    match decision.reason() {
        None => format!(
            "*{} <{}> will run on the accelerator",
            decision.class, decision.kind
        ),
        Some(reason) => format!(
            "!{} <{}> cannot run on the accelerator because {reason}",
            decision.class, decision.kind
        ),
    }
}

/// Render `plan` in `mode`; empty for [`ExplainMode::None`]
#[must_use]
pub fn explain(plan: &TaggedPlan<'_>, mode: ExplainMode) -> String {
    let mut out = String::new();
    if mode == ExplainMode::None {
        return out;
    }
    for node in plan.pre_order() {
        let Some(decision) = plan.decision(node.id) else {
            continue;
        };
        if mode == ExplainMode::NotOnAccelerator && decision.is_accepted() {
            continue;
        }
        let _ = writeln!(
            out,
            "{:indent$}{}",
            "",
            explain_line(decision),
            indent = node.depth * 2
        );
    }
    out
}

/// Machine-readable form of a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Post-order node id
    pub id: usize,
    /// Node kind
    pub kind: NodeKind,
    /// Node class
    pub class: NodeClass,
    /// Distance from the root
    pub depth: usize,
    /// Whether the node will be accelerated
    pub accelerated: bool,
    /// Description of the accepting rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Rejection reasons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl From<&TagDecision> for DecisionRecord {
    fn from(decision: &TagDecision) -> Self {
        Self {
            id: decision.node.0,
            kind: decision.kind.clone(),
            class: decision.class,
            depth: decision.depth,
            accelerated: decision.is_accepted(),
            rule: decision.rule().map(|r| r.description().to_string()),
            reasons: decision.reasons().to_vec(),
        }
    }
}

/// Records for every decision, in post-order
#[must_use]
pub fn decision_records(plan: &TaggedPlan<'_>) -> Vec<DecisionRecord> {
    plan.decisions.iter().map(DecisionRecord::from).collect()
}
