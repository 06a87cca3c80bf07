//! Reusable extra checks
//!
//! Predicates shared by several built-in rules. Each returns an
//! [`ExtraCheck`] to pass to [`crate::RuleBuilder::check`].

use crate::capability::ExtraCheck;
use crate::context::TagContext;
use ovr_plan::PlanNode;

/// Parameter naming the build side of a join: `left` or `right`
pub const BUILD_SIDE: &str = "build_side";

/// Reject integral arithmetic under strict arithmetic
///
/// The accelerated kernels wrap on integer overflow; strict mode requires
/// an error instead.
#[must_use]
pub fn ansi_overflow_safe() -> impl ExtraCheck {
    |node: &PlanNode, ctx: &TagContext| {
        if ctx.ansi_strict && node.output_type.is_integral() {
            Err(format!(
                "{} overflow on {} cannot raise an error under ANSI mode",
                node.kind, node.output_type
            ))
        } else {
            Ok(())
        }
    }
}

/// Reject the node whenever strict arithmetic is on
#[must_use]
pub fn reject_under_ansi(what: &'static str) -> impl ExtraCheck {
    move |_: &PlanNode, ctx: &TagContext| {
        if ctx.ansi_strict {
            Err(format!("{what} is not supported under ANSI mode"))
        } else {
            Ok(())
        }
    }
}

/// Reject a join whose build side is estimated above the memory budget
///
/// The build side is the child named by [`BUILD_SIDE`], right by default.
/// Joins without a size estimate pass.
#[must_use]
pub fn build_side_fits_budget() -> impl ExtraCheck {
    |node: &PlanNode, ctx: &TagContext| {
        let side = node
            .param(BUILD_SIDE)
            .and_then(|v| v.as_str())
            .unwrap_or("right");
        let index = if side.eq_ignore_ascii_case("left") { 0 } else { 1 };
        match node.children.get(index).and_then(PlanNode::estimated_bytes) {
            Some(bytes) if bytes > ctx.memory_budget_bytes => Err(format!(
                "build side estimated at {bytes} bytes exceeds the memory budget of {} bytes",
                ctx.memory_budget_bytes
            )),
            _ => Ok(()),
        }
    }
}
