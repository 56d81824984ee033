//! Policies for the phases of the MCTS planner
//!
//! This module contains the strategy traits the search is assembled from:
//! - Selection policies: which chance node to descend into at a decision node
//! - Evaluation policies: initial values of new chance nodes and values at
//!   the depth cutoff
//! - Backpropagation policies: how node statistics absorb a trial's return

pub mod backpropagation;
pub mod evaluation;
pub mod selection;

pub use backpropagation::{BackpropagationPolicy, RunningMeanPolicy};
pub use evaluation::{EvaluationPolicy, PosteriorMeanPolicy, RolloutPolicy};
pub use selection::{SelectionPolicy, UCB1Policy};

/// Horizon bookkeeping of one search session
///
/// A session searches `max_depth` steps of an episode that has `horizon`
/// steps left; heuristics account for the steps beyond the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext {
    /// Remaining decision steps of the episode
    pub horizon: usize,
    /// Depth at which the search is cut off
    pub max_depth: usize,
}

impl SearchContext {
    /// Creates a context, limiting the search depth to the horizon
    pub fn new(horizon: usize, max_depth: usize) -> Self {
        SearchContext {
            horizon,
            max_depth: max_depth.min(horizon),
        }
    }

    /// Number of episode steps past the search cutoff
    pub fn steps_beyond_cutoff(&self) -> usize {
        self.horizon.saturating_sub(self.max_depth)
    }
}
