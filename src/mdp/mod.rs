//! The belief-MDP contract shared by every planner.
//!
//! The [`BeliefMDP`] trait is the interface the search algorithms are written
//! against. It exposes the prior belief, the exact transition distribution
//! for an action, stochastic sampling of a successor belief, and the reward
//! of a transition.

pub mod beta_bernoulli;

pub use beta_bernoulli::{BetaBernoulliMDP, RewardConvention, SamplingConvention};

use rand::{Rng, RngCore};

use crate::{belief::BeliefState, PlannerError, Result};

/// Trait defining a Markov decision process over belief states
///
/// Implementations must be pure: none of the methods may mutate the MDP,
/// and the same inputs (and random stream) must yield the same outputs.
pub trait BeliefMDP: Send + Sync {
    /// Number of actions available in every belief
    fn num_actions(&self) -> usize;

    /// The prior belief at the start of an episode
    fn initial_belief(&self) -> BeliefState;

    /// Enumerates the successor beliefs of taking `action` in `belief`
    ///
    /// Returns `(probability, next_belief)` pairs whose probabilities sum
    /// to one. The order is part of the contract: planners iterate outcomes
    /// in this order.
    fn transition(&self, belief: &BeliefState, action: usize) -> Result<Vec<(f64, BeliefState)>>;

    /// Draws one successor belief of taking `action` in `belief`
    ///
    /// The default implementation draws a uniform variate against the
    /// cumulative transition distribution.
    fn sample(
        &self,
        belief: &BeliefState,
        action: usize,
        rng: &mut dyn RngCore,
    ) -> Result<BeliefState> {
        let outcomes = self.transition(belief, action)?;
        let u: f64 = rng.gen();

        let mut cumulative = 0.0;
        let mut last = None;
        for (probability, next_belief) in outcomes {
            cumulative += probability;
            if u < cumulative {
                return Ok(next_belief);
            }
            last = Some(next_belief);
        }

        // Rounding can leave the cumulative sum just below one
        last.ok_or_else(|| {
            PlannerError::InvalidBelief(format!(
                "transition from {} under action {} has no outcomes",
                belief, action
            ))
        })
    }

    /// Scalar reward of the transition `belief --action--> next_belief`
    fn reward(&self, belief: &BeliefState, action: usize, next_belief: &BeliefState)
        -> Result<f64>;
}

impl<M: BeliefMDP + ?Sized> BeliefMDP for Box<M> {
    fn num_actions(&self) -> usize {
        (**self).num_actions()
    }

    fn initial_belief(&self) -> BeliefState {
        (**self).initial_belief()
    }

    fn transition(&self, belief: &BeliefState, action: usize) -> Result<Vec<(f64, BeliefState)>> {
        (**self).transition(belief, action)
    }

    fn sample(
        &self,
        belief: &BeliefState,
        action: usize,
        rng: &mut dyn RngCore,
    ) -> Result<BeliefState> {
        (**self).sample(belief, action, rng)
    }

    fn reward(
        &self,
        belief: &BeliefState,
        action: usize,
        next_belief: &BeliefState,
    ) -> Result<f64> {
        (**self).reward(belief, action, next_belief)
    }
}
