//! # bayes-bandit-planner
//!
//! Planning for Bayesian Bernoulli bandits over a belief-state Markov decision
//! process.
//!
//! The unknown success probability of every arm carries a Beta posterior, and
//! the vector of posteriors (the *belief*) is the state of an MDP whose
//! transitions are the posterior updates caused by pulling an arm. Planning in
//! this belief-MDP trades exploration against exploitation for a fixed
//! horizon.
//!
//! ## Features
//!
//! - [`BeliefMDP`] contract with a Beta-Bernoulli instantiation and
//!   interchangeable reward and sampling conventions
//! - Exact finite-horizon [`ValueIteration`]
//! - Depth-limited AND/OR tree search ([`AOTreeSearch`]) with a pluggable
//!   cutoff heuristic
//! - Monte Carlo tree search ([`MCTS`]) with a UCB1 tree policy, heuristic or
//!   rollout seeding of new nodes and a running-mean backup
//! - [`Learner`] adapters for an episode loop: UCB1, Thompson sampling, value
//!   iteration, AO lookahead, UCT, rollout and random baselines
//!
//! ## Basic Usage
//!
//! ```
//! use bayes_bandit_planner::{
//!     learners::{Learner, UctLearner},
//!     MCTSConfig,
//! };
//!
//! fn main() -> Result<(), bayes_bandit_planner::PlannerError> {
//!     let config = MCTSConfig::default()
//!         .with_trials(200)
//!         .with_max_depth(5)
//!         .with_seed(7);
//!
//!     // Two arms, ten pulls per episode
//!     let mut learner = UctLearner::new(2, 10, config)?;
//!     learner.reset();
//!
//!     let action = learner.select_action()?;
//!     // ... pull `action` in the real environment and observe a 0/1 reward
//!     learner.update(action, 1.0)?;
//!
//!     assert_eq!(learner.belief().arm(action)?.alpha, 2);
//!     assert_eq!(learner.horizon(), 9);
//!     Ok(())
//! }
//! ```
//!
//! ## Planning Directly
//!
//! The planners can also be used without a learner:
//!
//! ```
//! use bayes_bandit_planner::{BeliefMDP, BetaBernoulliMDP, ValueIteration};
//!
//! let mdp = BetaBernoulliMDP::new(2).unwrap();
//! let table = ValueIteration::new(&mdp).solve(3).unwrap();
//!
//! let decision = table.lookup(3, &mdp.initial_belief()).unwrap();
//! assert!(decision.value > 1.49);
//! ```

pub mod aotree;
pub mod belief;
pub mod config;
pub mod learners;
pub mod mcts;
pub mod mdp;
pub mod policy;
pub mod stats;
pub mod tree;
pub mod utils;
pub mod value_iteration;

pub use aotree::{AOTreeSearch, CutoffHeuristic, OptimisticHeuristic};
pub use belief::{BeliefState, BetaArm};
pub use config::MCTSConfig;
pub use learners::Learner;
pub use mcts::MCTS;
pub use mdp::{BeliefMDP, BetaBernoulliMDP, RewardConvention, SamplingConvention};
pub use policy::{BackpropagationPolicy, EvaluationPolicy, SearchContext, SelectionPolicy};
pub use stats::{PlannerKind, SearchStatistics};
pub use tree::{MCTSNode, NodeId, NodeKey, NodeKind, SearchTree};
pub use value_iteration::{Decision, ValueIteration, ValueTable};

/// Error types for the planners
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An action index outside the MDP's action set
    #[error("Invalid action {action}: MDP has {num_actions} actions")]
    InvalidAction {
        /// The rejected action
        action: usize,
        /// Number of actions in the MDP
        num_actions: usize,
    },

    /// A reward outside the learner's reward domain
    #[error("Invalid reward: {0}")]
    InvalidReward(f64),

    /// A belief violating the positivity invariant or the MDP's shape
    #[error("Invalid belief: {0}")]
    InvalidBelief(String),

    /// The episode has no remaining decision steps
    #[error("Horizon exhausted: no decision steps remain")]
    HorizonExhausted,

    /// A value table lookup for a state that was never solved
    #[error("No value table entry for horizon {horizon} and belief {belief}")]
    MissingTableEntry {
        /// Remaining horizon of the lookup
        horizon: usize,
        /// Display form of the belief
        belief: String,
    },
}

/// Result type for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;
