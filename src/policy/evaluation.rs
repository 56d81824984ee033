//! Evaluation policies for the MCTS planner
//!
//! Evaluation policies stand in for the part of the search tree that has not
//! been built: they seed new chance nodes with an initial value and value the
//! beliefs reached at the depth cutoff.

use rand::{Rng, RngCore};

use crate::{belief::BeliefState, mdp::BeliefMDP, policy::SearchContext, PlannerError, Result};

/// Trait for policies that estimate values of unexplored nodes
pub trait EvaluationPolicy: Send + Sync {
    /// Initial value of the chance node `(belief, action)`
    ///
    /// `depth` is the number of search steps left at the node, including the
    /// pull of `action` itself.
    fn init_q_value(
        &self,
        mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        action: usize,
        depth: usize,
        context: &SearchContext,
        rng: &mut dyn RngCore,
    ) -> Result<f64>;

    /// Value of a decision node reached at the depth cutoff
    fn terminal_value(
        &self,
        mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        context: &SearchContext,
    ) -> Result<f64>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn EvaluationPolicy>;
}

/// Posterior-mean seeding
///
/// Seeds a chance node with the number of episode steps left times the
/// posterior mean of its arm, and values cutoff beliefs as the steps beyond
/// the cutoff times the best posterior mean. This is the value of committing
/// to a single arm without further learning.
#[derive(Debug, Clone)]
pub struct PosteriorMeanPolicy;

impl PosteriorMeanPolicy {
    /// Creates a new posterior-mean policy
    pub fn new() -> Self {
        PosteriorMeanPolicy
    }
}

impl Default for PosteriorMeanPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationPolicy for PosteriorMeanPolicy {
    fn init_q_value(
        &self,
        _mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        action: usize,
        depth: usize,
        context: &SearchContext,
        _rng: &mut dyn RngCore,
    ) -> Result<f64> {
        let steps = depth + context.steps_beyond_cutoff();
        Ok(steps as f64 * belief.arm(action)?.mean())
    }

    fn terminal_value(
        &self,
        _mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        context: &SearchContext,
    ) -> Result<f64> {
        Ok(context.steps_beyond_cutoff() as f64 * belief.best_mean())
    }

    fn clone_box(&self) -> Box<dyn EvaluationPolicy> {
        Box::new(self.clone())
    }
}

/// Rollout seeding
///
/// Seeds a chance node with the average return of random rollouts: the
/// first pull is `action`, every following pull is a uniformly random arm,
/// until the search depth is used up. Cutoff beliefs are worth zero.
#[derive(Debug, Clone)]
pub struct RolloutPolicy {
    rollouts: usize,
}

impl RolloutPolicy {
    /// Creates a rollout policy averaging `rollouts` rollouts per seed
    pub fn new(rollouts: usize) -> Result<Self> {
        if rollouts == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "rollout seeding needs at least one rollout".to_string(),
            ));
        }
        Ok(RolloutPolicy { rollouts })
    }

    /// Number of rollouts averaged per seed
    pub fn rollouts(&self) -> usize {
        self.rollouts
    }

    /// Total reward of one rollout of `depth` pulls starting with `action`
    pub fn rollout(
        mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        action: usize,
        depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<f64> {
        let mut total = 0.0;
        let mut state = belief.clone();
        let mut action = action;

        for step in 0..depth {
            if step > 0 {
                action = rng.gen_range(0..mdp.num_actions());
            }
            let next_state = mdp.sample(&state, action, rng)?;
            total += mdp.reward(&state, action, &next_state)?;
            state = next_state;
        }

        Ok(total)
    }
}

impl Default for RolloutPolicy {
    fn default() -> Self {
        RolloutPolicy { rollouts: 1 }
    }
}

impl EvaluationPolicy for RolloutPolicy {
    fn init_q_value(
        &self,
        mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        action: usize,
        depth: usize,
        _context: &SearchContext,
        rng: &mut dyn RngCore,
    ) -> Result<f64> {
        let mut total = 0.0;
        for _ in 0..self.rollouts {
            total += Self::rollout(mdp, belief, action, depth, rng)?;
        }
        Ok(total / self.rollouts as f64)
    }

    fn terminal_value(
        &self,
        _mdp: &dyn BeliefMDP,
        _belief: &BeliefState,
        _context: &SearchContext,
    ) -> Result<f64> {
        Ok(0.0)
    }

    fn clone_box(&self) -> Box<dyn EvaluationPolicy> {
        Box::new(self.clone())
    }
}

// Implement EvaluationPolicy for Box<dyn EvaluationPolicy>
impl EvaluationPolicy for Box<dyn EvaluationPolicy> {
    fn init_q_value(
        &self,
        mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        action: usize,
        depth: usize,
        context: &SearchContext,
        rng: &mut dyn RngCore,
    ) -> Result<f64> {
        (**self).init_q_value(mdp, belief, action, depth, context, rng)
    }

    fn terminal_value(
        &self,
        mdp: &dyn BeliefMDP,
        belief: &BeliefState,
        context: &SearchContext,
    ) -> Result<f64> {
        (**self).terminal_value(mdp, belief, context)
    }

    fn clone_box(&self) -> Box<dyn EvaluationPolicy> {
        (**self).clone_box()
    }
}
