//! Rewrite statistics

use ovr_plan::{RewrittenNode, TransitionKind};
use serde::Serialize;
use std::ops::AddAssign;

/// Node counts of a rewritten plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Accelerated replacements
    pub accelerated: usize,
    /// Nodes kept on the host
    pub host: usize,
    /// Uploads to the accelerator
    pub host_to_device: usize,
    /// Copies back to the host
    pub device_to_host: usize,
}

impl RewriteStats {
    /// Count the nodes of `plan`
    #[must_use]
    pub fn of(plan: &RewrittenNode) -> Self {
        let mut stats = Self::default();
        for node in plan.iter() {
            match node {
                RewrittenNode::Host(_) => stats.host += 1,
                RewrittenNode::Accelerated(_) => stats.accelerated += 1,
                RewrittenNode::Transition(t) => match t.direction {
                    TransitionKind::HostToDevice => stats.host_to_device += 1,
                    TransitionKind::DeviceToHost => stats.device_to_host += 1,
                },
            }
        }
        stats
    }

    /// Transitions in both directions
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> usize {
        self.host_to_device + self.device_to_host
    }
}

impl AddAssign for RewriteStats {
    fn add_assign(&mut self, rhs: Self) {
        self.accelerated += rhs.accelerated;
        self.host += rhs.host;
        self.host_to_device += rhs.host_to_device;
        self.device_to_host += rhs.device_to_host;
    }
}
