//! Learners: the decision-making interface seen by an episode loop
//!
//! A learner is asked for an arm, is told the reward the arm paid, and is
//! reset between episodes. The planning learners keep a Beta posterior and
//! the remaining horizon in a [`BeliefTracker`] and call a planner on every
//! decision; the bandit baselines keep simple running statistics.
//!
//! ```
//! use bayes_bandit_planner::learners::{Learner, LearnerKind};
//!
//! let mut learner = LearnerKind::Lookahead { max_depth: 2 }.build(2, 5, 0).unwrap();
//! learner.reset();
//! for reward in [1.0, 0.0, 1.0] {
//!     let action = learner.select_action().unwrap();
//!     learner.update(action, reward).unwrap();
//! }
//! ```

pub mod lookahead;
pub mod random;
pub mod rollout;
pub mod thompson;
pub mod ucb;
pub mod uct;
pub mod vi;

pub use lookahead::LookaheadLearner;
pub use random::RandomLearner;
pub use rollout::RolloutLearner;
pub use thompson::ThompsonLearner;
pub use ucb::Ucb1Learner;
pub use uct::UctLearner;
pub use vi::ValueIterationLearner;

use std::fmt;

use crate::{belief::BeliefState, config::MCTSConfig, PlannerError, Result};

/// Trait for decision makers driven by an episode loop
///
/// `reset` must be called before the first `select_action` of every
/// episode.
pub trait Learner {
    /// Chooses the arm to pull next
    fn select_action(&mut self) -> Result<usize>;

    /// Absorbs the reward observed after pulling `action`
    fn update(&mut self, action: usize, reward: f64) -> Result<()>;

    /// Reinitializes the learner for a fresh episode
    fn reset(&mut self);
}

impl<L: Learner + ?Sized> Learner for Box<L> {
    fn select_action(&mut self) -> Result<usize> {
        (**self).select_action()
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        (**self).update(action, reward)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Posterior and remaining horizon of a planning learner
///
/// Mutated only through [`BeliefTracker::observe`] and
/// [`BeliefTracker::reset`]; replaying the same observations after a reset
/// reproduces the same beliefs.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefTracker {
    start: BeliefState,
    belief: BeliefState,
    initial_horizon: usize,
    horizon: usize,
}

impl BeliefTracker {
    /// Creates a tracker at `start` with `horizon` steps to go
    pub fn new(start: BeliefState, horizon: usize) -> Self {
        BeliefTracker {
            belief: start.clone(),
            start,
            initial_horizon: horizon,
            horizon,
        }
    }

    /// Current belief
    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    /// Remaining decision steps
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Episode length
    pub fn initial_horizon(&self) -> usize {
        self.initial_horizon
    }

    /// Fails if no decision steps remain
    pub fn ensure_remaining(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(PlannerError::HorizonExhausted);
        }
        Ok(())
    }

    /// Folds a binary reward on `action` into the belief and consumes a step
    ///
    /// The tracker is left untouched on error.
    pub fn observe(&mut self, action: usize, reward: f64) -> Result<()> {
        self.ensure_remaining()?;
        self.belief = self.belief.observe_reward(action, reward)?;
        self.horizon -= 1;
        Ok(())
    }

    /// Returns to the start belief and the full horizon
    pub fn reset(&mut self) {
        self.belief = self.start.clone();
        self.horizon = self.initial_horizon;
    }
}

/// Named learner configurations
#[derive(Debug, Clone)]
pub enum LearnerKind {
    /// Uniformly random arm
    Random,
    /// UCB1 index policy
    Ucb1,
    /// Thompson sampling from Beta posteriors
    Thompson,
    /// Exact value iteration, solved once per learner
    ValueIteration,
    /// AO tree search with a depth cutoff
    Lookahead {
        /// Search depth per decision
        max_depth: usize,
    },
    /// Monte Carlo rollouts with random continuation
    Rollout {
        /// Rollouts per arm and decision
        trials: usize,
    },
    /// UCT search
    Uct(MCTSConfig),
}

impl LearnerKind {
    /// Builds a learner for `num_arms` arms and episodes of `horizon` steps
    ///
    /// `seed` seeds the learner's random source; for UCT it replaces the
    /// seed held in the configuration.
    pub fn build(&self, num_arms: usize, horizon: usize, seed: u64) -> Result<Box<dyn Learner>> {
        Ok(match self {
            LearnerKind::Random => Box::new(RandomLearner::new(num_arms, seed)?),
            LearnerKind::Ucb1 => Box::new(Ucb1Learner::new(num_arms)?),
            LearnerKind::Thompson => Box::new(ThompsonLearner::new(num_arms, seed)?),
            LearnerKind::ValueIteration => {
                Box::new(ValueIterationLearner::new(num_arms, horizon)?)
            }
            LearnerKind::Lookahead { max_depth } => {
                Box::new(LookaheadLearner::new(num_arms, horizon, *max_depth)?)
            }
            LearnerKind::Rollout { trials } => {
                Box::new(RolloutLearner::new(num_arms, horizon, *trials, seed)?)
            }
            LearnerKind::Uct(config) => Box::new(UctLearner::new(
                num_arms,
                horizon,
                config.clone().with_seed(seed),
            )?),
        })
    }
}

impl fmt::Display for LearnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnerKind::Random => write!(f, "Random"),
            LearnerKind::Ucb1 => write!(f, "UCB1"),
            LearnerKind::Thompson => write!(f, "TS"),
            LearnerKind::ValueIteration => write!(f, "VI"),
            LearnerKind::Lookahead { max_depth } => write!(f, "AO(D={})", max_depth),
            LearnerKind::Rollout { trials } => write!(f, "Rollout(N={})", trials),
            LearnerKind::Uct(config) => {
                write!(f, "UCT(N={}, D={})", config.trials, config.max_depth)
            }
        }
    }
}
