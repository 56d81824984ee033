//! UCB1 index policy
//!
//! The frequentist baseline: play every arm once, then the arm maximizing
//! `mean + sqrt(2 ln n / n_a)`. It ignores the horizon and the belief MDP.

use crate::{learners::Learner, utils, PlannerError, Result};

/// UCB1 learner with running per-arm means
#[derive(Debug, Clone)]
pub struct Ucb1Learner {
    counts: Vec<u64>,
    means: Vec<f64>,
    total: u64,
}

impl Ucb1Learner {
    /// Creates a UCB1 learner over `num_arms` arms
    pub fn new(num_arms: usize) -> Result<Self> {
        if num_arms == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "a bandit needs at least one arm".to_string(),
            ));
        }
        Ok(Ucb1Learner {
            counts: vec![0; num_arms],
            means: vec![0.0; num_arms],
            total: 0,
        })
    }

    /// Number of pulls per arm in this episode
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Average reward per arm in this episode
    pub fn means(&self) -> &[f64] {
        &self.means
    }
}

impl Learner for Ucb1Learner {
    fn select_action(&mut self) -> Result<usize> {
        if let Some(unplayed) = self.counts.iter().position(|&count| count == 0) {
            return Ok(unplayed);
        }

        let bounds = self
            .means
            .iter()
            .zip(&self.counts)
            .map(|(&mean, &count)| utils::ucb_value(mean, count, self.total, 1.0));
        Ok(utils::argmax(bounds).unwrap_or(0))
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        if action >= self.counts.len() {
            return Err(PlannerError::InvalidAction {
                action,
                num_actions: self.counts.len(),
            });
        }
        if !reward.is_finite() {
            return Err(PlannerError::InvalidReward(reward));
        }

        self.total += 1;
        self.counts[action] += 1;
        self.means[action] = utils::running_mean(self.means[action], reward, self.counts[action]);
        Ok(())
    }

    fn reset(&mut self) {
        self.counts.iter_mut().for_each(|count| *count = 0);
        self.means.iter_mut().for_each(|mean| *mean = 0.0);
        self.total = 0;
    }
}
