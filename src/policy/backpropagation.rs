//! Backpropagation policies for the MCTS planner
//!
//! Backpropagation policies determine how to update node statistics with
//! the return of a trial.

use crate::tree::MCTSNode;

/// Trait for policies that back up trial returns
pub trait BackpropagationPolicy: Send + Sync {
    /// Updates statistics for a node with the return observed below it
    fn update_stats(&self, node: &mut MCTSNode, result: f64);

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn BackpropagationPolicy>;
}

/// Running-mean backup
///
/// Increments the visit count and folds the return into the node value as
/// an incremental sample mean, `value += (result - value) / visits`. Values
/// therefore stay on the scale of a single return regardless of how often a
/// node is visited.
#[derive(Debug, Clone)]
pub struct RunningMeanPolicy;

impl RunningMeanPolicy {
    /// Creates a new running-mean policy
    pub fn new() -> Self {
        RunningMeanPolicy
    }
}

impl Default for RunningMeanPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackpropagationPolicy for RunningMeanPolicy {
    fn update_stats(&self, node: &mut MCTSNode, result: f64) {
        node.visits += 1;
        node.value = crate::utils::running_mean(node.value, result, node.visits);
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy> {
        Box::new(self.clone())
    }
}

// Implement BackpropagationPolicy for Box<dyn BackpropagationPolicy>
impl BackpropagationPolicy for Box<dyn BackpropagationPolicy> {
    fn update_stats(&self, node: &mut MCTSNode, result: f64) {
        (**self).update_stats(node, result)
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy> {
        (**self).clone_box()
    }
}
