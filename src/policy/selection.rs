//! Selection policies for the MCTS planner
//!
//! Selection policies determine which chance node a trial descends into at
//! a decision node that has already been expanded, balancing exploration and
//! exploitation.

use std::f64;

use crate::tree::{NodeId, SearchTree};

/// Trait for tree policies
pub trait SelectionPolicy: Send + Sync {
    /// Selects a child of the decision node `node`
    ///
    /// Returns `None` if the node has no children.
    fn select_child(&self, tree: &SearchTree, node: NodeId) -> Option<NodeId>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SelectionPolicy>;
}

/// Upper Confidence Bound (UCB1) tree policy
///
/// Any child that has never been visited is selected first, in action
/// order. Once every child has been visited the policy picks
///
/// ```text
/// argmax value + C * sqrt(2 * ln(parent_visits) / child_visits)
/// ```
///
/// where ties go to the first child. Higher exploration constants favor
/// less-visited children.
#[derive(Debug, Clone)]
pub struct UCB1Policy {
    /// Exploration constant `C`
    pub exploration_constant: f64,
}

impl UCB1Policy {
    /// Creates a new UCB1 policy with the given exploration constant
    pub fn new(exploration_constant: f64) -> Self {
        UCB1Policy {
            exploration_constant,
        }
    }

    /// Calculates the upper confidence bound of a child
    pub fn ucb1_value(&self, child_value: f64, child_visits: u64, parent_visits: u64) -> f64 {
        crate::utils::ucb_value(
            child_value,
            child_visits,
            parent_visits,
            self.exploration_constant,
        )
    }
}

impl Default for UCB1Policy {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl SelectionPolicy for UCB1Policy {
    fn select_child(&self, tree: &SearchTree, node: NodeId) -> Option<NodeId> {
        let parent = tree.node(node);
        let children = parent.children();

        if let Some(&unvisited) = children.iter().find(|&&id| tree.node(id).visits == 0) {
            return Some(unvisited);
        }

        let bounds = children.iter().map(|&id| {
            let child = tree.node(id);
            self.ucb1_value(child.value, child.visits, parent.visits)
        });
        crate::utils::argmax(bounds).map(|i| children[i])
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        Box::new(self.clone())
    }
}

// Implement SelectionPolicy for Box<dyn SelectionPolicy>
impl SelectionPolicy for Box<dyn SelectionPolicy> {
    fn select_child(&self, tree: &SearchTree, node: NodeId) -> Option<NodeId> {
        (**self).select_child(tree, node)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy> {
        (**self).clone_box()
    }
}
