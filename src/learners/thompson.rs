//! Thompson sampling from Beta posteriors
//!
//! Draws a success probability from every arm's posterior and pulls the arm
//! with the largest draw. Seedable, so runs are reproducible.

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Beta, Distribution};

use crate::{
    belief::{BeliefState, BetaArm},
    learners::Learner,
    utils, PlannerError, Result,
};

/// Thompson-sampling learner over Beta-Bernoulli arms
#[derive(Debug, Clone)]
pub struct ThompsonLearner {
    prior: BeliefState,
    belief: BeliefState,
    rng: StdRng,
}

impl ThompsonLearner {
    /// Creates a learner with uniform priors
    pub fn new(num_arms: usize, seed: u64) -> Result<Self> {
        if num_arms == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "a bandit needs at least one arm".to_string(),
            ));
        }
        Self::with_prior(BeliefState::uniform(num_arms, BetaArm::uniform())?, seed)
    }

    /// Creates a learner starting from `prior`
    pub fn with_prior(prior: BeliefState, seed: u64) -> Result<Self> {
        prior.validate()?;
        Ok(ThompsonLearner {
            belief: prior.clone(),
            prior,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Current posterior
    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }
}

impl Learner for ThompsonLearner {
    fn select_action(&mut self) -> Result<usize> {
        let mut samples = Vec::with_capacity(self.belief.len());
        for arm in self.belief.arms() {
            let posterior = Beta::new(f64::from(arm.alpha), f64::from(arm.beta))
                .map_err(|e| PlannerError::InvalidBelief(e.to_string()))?;
            samples.push(posterior.sample(&mut self.rng));
        }
        Ok(utils::argmax(samples).unwrap_or(0))
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        self.belief = self.belief.observe_reward(action, reward)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.belief = self.prior.clone();
    }
}
