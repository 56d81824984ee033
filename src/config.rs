//! Configuration options for the MCTS planner
//!
//! This module defines the configuration parameters that control the
//! behavior of the UCT search.

use std::time::Duration;

use crate::{PlannerError, Result};

/// Criteria for selecting the root action after search is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestChildCriteria {
    /// Select the child with the highest value estimate
    ///
    /// Exploitation only: the exploration bonus of the tree policy plays no
    /// part in the final choice.
    HighestValue,

    /// Select the child with the most visits
    ///
    /// More conservative with few trials, since visit counts are less noisy
    /// than value estimates.
    MostVisits,
}

/// How newly created chance nodes get their initial value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Remaining steps times the posterior mean of the pulled arm
    PosteriorMean,

    /// Average return of random-action rollouts
    Rollout {
        /// Number of rollouts averaged per node
        rollouts: usize,
    },
}

/// Configuration for the MCTS planner
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use bayes_bandit_planner::{MCTSConfig, config::{BestChildCriteria, SeedStrategy}};
/// use std::time::Duration;
///
/// let config = MCTSConfig::default()
///     .with_exploration_constant(1.5)
///     .with_trials(5_000)
///     .with_max_depth(15)
///     .with_max_time(Duration::from_millis(50))
///     .with_seed_strategy(SeedStrategy::Rollout { rollouts: 4 })
///     .with_best_child_criteria(BestChildCriteria::MostVisits);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MCTSConfig {
    /// Exploration constant `C` of the UCB1 tree policy
    ///
    /// Higher values favor exploration of less-visited chance nodes.
    pub exploration_constant: f64,

    /// Number of trials run per search
    pub trials: usize,

    /// Maximum search depth
    ///
    /// The effective depth of a search is the smaller of this and the
    /// remaining horizon.
    pub max_depth: usize,

    /// Maximum time to run the search
    ///
    /// If set, the search stops after this duration even if trials remain.
    pub max_time: Option<Duration>,

    /// Initial values of new chance nodes
    pub seed_strategy: SeedStrategy,

    /// Keep the node arena between decisions of an episode
    ///
    /// When set, [`crate::MCTS::advance`] re-roots the existing tree instead
    /// of discarding it.
    pub reuse_tree: bool,

    /// Criteria for selecting the root action after search
    pub best_child_criteria: BestChildCriteria,

    /// Seed of the search's random number generator
    pub seed: u64,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        MCTSConfig {
            exploration_constant: 2.0,
            trials: 1_000,
            max_depth: 10,
            max_time: None,
            seed_strategy: SeedStrategy::PosteriorMean,
            reuse_tree: false,
            best_child_criteria: BestChildCriteria::HighestValue,
            seed: 0,
        }
    }
}

impl MCTSConfig {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the number of trials per search
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Sets the maximum search depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the maximum time to run the search
    pub fn with_max_time(mut self, duration: Duration) -> Self {
        self.max_time = Some(duration);
        self
    }

    /// Sets how new chance nodes are seeded
    pub fn with_seed_strategy(mut self, strategy: SeedStrategy) -> Self {
        self.seed_strategy = strategy;
        self
    }

    /// Sets whether the tree is kept between decisions
    pub fn with_tree_reuse(mut self, reuse_tree: bool) -> Self {
        self.reuse_tree = reuse_tree;
        self
    }

    /// Sets the criteria for selecting the best child
    pub fn with_best_child_criteria(mut self, criteria: BestChildCriteria) -> Self {
        self.best_child_criteria = criteria;
        self
    }

    /// Sets the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the configuration for values the planner cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(PlannerError::InvalidConfiguration(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if let SeedStrategy::Rollout { rollouts: 0 } = self.seed_strategy {
            return Err(PlannerError::InvalidConfiguration(
                "rollout seeding needs at least one rollout".to_string(),
            ));
        }
        Ok(())
    }
}
