//! Uniformly random arm selection, the weakest baseline.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{learners::Learner, PlannerError, Result};

/// Pulls a uniformly random arm every step
#[derive(Debug, Clone)]
pub struct RandomLearner {
    num_arms: usize,
    rng: StdRng,
}

impl RandomLearner {
    /// Creates a random learner over `num_arms` arms
    pub fn new(num_arms: usize, seed: u64) -> Result<Self> {
        if num_arms == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "a bandit needs at least one arm".to_string(),
            ));
        }
        Ok(RandomLearner {
            num_arms,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Learner for RandomLearner {
    fn select_action(&mut self) -> Result<usize> {
        Ok(self.rng.gen_range(0..self.num_arms))
    }

    fn update(&mut self, action: usize, _reward: f64) -> Result<()> {
        if action >= self.num_arms {
            return Err(PlannerError::InvalidAction {
                action,
                num_actions: self.num_arms,
            });
        }
        Ok(())
    }

    fn reset(&mut self) {}
}
