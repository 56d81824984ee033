//! Monte Carlo rollout learner
//!
//! Estimates the value of every arm by averaging random rollouts over the
//! rest of the episode: pull the arm, then pull uniformly random arms until
//! the horizon runs out. Pulls the arm with the best estimate.

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    belief::BeliefState,
    learners::{BeliefTracker, Learner},
    mdp::{BeliefMDP, BetaBernoulliMDP},
    policy::RolloutPolicy,
    utils, PlannerError, Result,
};

/// Rollout learner over Beta-Bernoulli arms
#[derive(Debug, Clone)]
pub struct RolloutLearner {
    mdp: BetaBernoulliMDP,
    trials: usize,
    tracker: BeliefTracker,
    rng: StdRng,
}

impl RolloutLearner {
    /// Creates a learner averaging `trials` rollouts per arm and decision
    pub fn new(num_arms: usize, horizon: usize, trials: usize, seed: u64) -> Result<Self> {
        if trials == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "rollout learner needs at least one trial".to_string(),
            ));
        }
        let mdp = BetaBernoulliMDP::new(num_arms)?;
        let start = mdp.initial_belief();
        Ok(RolloutLearner {
            mdp,
            trials,
            tracker: BeliefTracker::new(start, horizon),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Current posterior
    pub fn belief(&self) -> &BeliefState {
        self.tracker.belief()
    }

    /// Remaining decision steps
    pub fn horizon(&self) -> usize {
        self.tracker.horizon()
    }

    fn q_value(&mut self, action: usize) -> Result<f64> {
        let mut total = 0.0;
        for _ in 0..self.trials {
            total += RolloutPolicy::rollout(
                &self.mdp,
                self.tracker.belief(),
                action,
                self.tracker.horizon(),
                &mut self.rng,
            )?;
        }
        Ok(total / self.trials as f64)
    }
}

impl Learner for RolloutLearner {
    fn select_action(&mut self) -> Result<usize> {
        self.tracker.ensure_remaining()?;

        let mut q_values = Vec::with_capacity(self.mdp.num_actions());
        for action in 0..self.mdp.num_actions() {
            q_values.push(self.q_value(action)?);
        }
        Ok(utils::argmax(q_values).unwrap_or(0))
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        self.tracker.observe(action, reward)
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }
}
