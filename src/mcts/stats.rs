//! Counters the engine keeps while planning.
//!
//! Everything here is cumulative over the lifetime of an `MCTSSearch`;
//! re-rooting keeps the counters, so rates describe the whole run.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Successful `plan` calls.
    pub iterations: u32,
    pub nodes_expanded: u32,
    pub simulations: u32,
    /// Agent moves played by rollouts, in and beyond the tree.
    pub rollout_steps: u64,
    /// Deepest node any iteration credited.
    pub max_depth: u16,

    // Probability mass problems: a group normalized to uniform, and a draw
    // over weights that were all zero.
    pub degenerate_groups: u32,
    pub degenerate_samples: u32,

    /// Wall-clock time inside `search` / `search_for`, in microseconds.
    pub time_us: u64,
}

impl SearchStats {
    /// Iterations per second of budgeted search; 0 before any timing.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        match self.time_us {
            0 => 0.0,
            us => f64::from(self.iterations) * 1e6 / us as f64,
        }
    }

    #[must_use]
    pub fn mean_rollout_length(&self) -> f64 {
        ratio(self.rollout_steps as f64, self.simulations)
    }

    /// Share of iterations that grew the tree. Falls below 1 once leaves
    /// are terminal or the node budget is spent.
    #[must_use]
    pub fn expansion_rate(&self) -> f64 {
        ratio(f64::from(self.nodes_expanded), self.iterations)
    }
}

fn ratio(numerator: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        numerator / f64::from(count)
    }
}
