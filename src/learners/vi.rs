//! Bayes-optimal learner backed by exact value iteration
//!
//! The whole episode is solved once, when the learner is built. Decisions
//! are table lookups at the current `(remaining horizon, belief)` pair.

use crate::{
    belief::BeliefState,
    learners::{BeliefTracker, Learner},
    mdp::{BeliefMDP, BetaBernoulliMDP},
    value_iteration::{ValueIteration, ValueTable},
    Result,
};

/// Value-iteration learner over Beta-Bernoulli arms
#[derive(Debug, Clone)]
pub struct ValueIterationLearner {
    table: ValueTable,
    tracker: BeliefTracker,
}

impl ValueIterationLearner {
    /// Solves an episode of `horizon` steps over `num_arms` uniform arms
    pub fn new(num_arms: usize, horizon: usize) -> Result<Self> {
        Self::with_mdp(&BetaBernoulliMDP::new(num_arms)?, horizon)
    }

    /// Solves an episode of `horizon` steps from the MDP's initial belief
    pub fn with_mdp<M: BeliefMDP + ?Sized>(mdp: &M, horizon: usize) -> Result<Self> {
        let start = mdp.initial_belief();
        let table = ValueIteration::new(mdp).solve_from(&start, horizon)?;
        Ok(ValueIterationLearner {
            table,
            tracker: BeliefTracker::new(start, horizon),
        })
    }

    /// The solved table
    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// Current posterior
    pub fn belief(&self) -> &BeliefState {
        self.tracker.belief()
    }

    /// Remaining decision steps
    pub fn horizon(&self) -> usize {
        self.tracker.horizon()
    }
}

impl Learner for ValueIterationLearner {
    fn select_action(&mut self) -> Result<usize> {
        self.tracker.ensure_remaining()?;
        let decision = self
            .table
            .get(self.tracker.horizon(), self.tracker.belief())?;
        Ok(decision.action)
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        self.tracker.observe(action, reward)
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }
}
