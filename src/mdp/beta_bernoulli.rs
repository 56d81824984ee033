//! Beta-Bernoulli belief MDP
//!
//! Each arm pays 1 with an unknown probability carrying an independent Beta
//! prior. Pulling an arm has exactly two outcomes, a success that bumps the
//! arm's `alpha` or a failure that bumps its `beta`.

use rand::{Rng, RngCore};
use rand_distr::{Beta, Distribution};

use crate::{
    belief::{BeliefState, BetaArm},
    mdp::BeliefMDP,
    PlannerError, Result,
};

/// Reward attached to a belief transition
///
/// Value iteration and AO tree search need [`RewardConvention::ExpectedUtility`]
/// to stay exact expectation maximizers; MCTS samples transitions anyway and
/// tolerates [`RewardConvention::RealizedPayoff`]. A convention is fixed for the
/// lifetime of an MDP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardConvention {
    /// Posterior mean of the pulled arm under the current belief
    ///
    /// Deterministic given `(belief, action)`.
    #[default]
    ExpectedUtility,

    /// The 0/1 payoff implied by the sampled successor belief
    RealizedPayoff,

    /// Increase of the best posterior mean from one belief to the next
    InformationGain,
}

/// How [`BeliefMDP::sample`] draws a successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingConvention {
    /// Uniform variate against the cumulative transition distribution
    #[default]
    Cumulative,

    /// Draw a success probability from the arm's Beta posterior, then a
    /// Bernoulli trial against it
    PosteriorDraw,
}

/// Belief MDP over independent Beta-Bernoulli arms
///
/// # Example
///
/// ```
/// use bayes_bandit_planner::{BeliefMDP, BetaBernoulliMDP};
///
/// let mdp = BetaBernoulliMDP::new(2).unwrap();
/// let start = mdp.initial_belief();
/// let outcomes = mdp.transition(&start, 0).unwrap();
///
/// assert_eq!(outcomes.len(), 2);
/// assert_eq!(outcomes[0].1.pairs(), vec![(2, 1), (1, 1)]);
/// assert_eq!(outcomes[1].1.pairs(), vec![(1, 2), (1, 1)]);
/// ```
#[derive(Debug, Clone)]
pub struct BetaBernoulliMDP {
    num_arms: usize,
    prior: BetaArm,
    reward_convention: RewardConvention,
    sampling_convention: SamplingConvention,
}

impl BetaBernoulliMDP {
    /// Creates an MDP with `num_arms` arms and uniform Beta(1, 1) priors
    pub fn new(num_arms: usize) -> Result<Self> {
        if num_arms == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "a bandit needs at least one arm".to_string(),
            ));
        }
        Ok(BetaBernoulliMDP {
            num_arms,
            prior: BetaArm::uniform(),
            reward_convention: RewardConvention::default(),
            sampling_convention: SamplingConvention::default(),
        })
    }

    /// Sets the prior shared by every arm
    pub fn with_prior(mut self, alpha: u32, beta: u32) -> Result<Self> {
        self.prior = BetaArm::new(alpha, beta).map_err(|_| {
            PlannerError::InvalidConfiguration(format!(
                "prior parameters must be positive, got ({}, {})",
                alpha, beta
            ))
        })?;
        Ok(self)
    }

    /// Sets the reward convention
    pub fn with_reward_convention(mut self, convention: RewardConvention) -> Self {
        self.reward_convention = convention;
        self
    }

    /// Sets the sampling convention
    pub fn with_sampling_convention(mut self, convention: SamplingConvention) -> Self {
        self.sampling_convention = convention;
        self
    }

    /// The configured reward convention
    pub fn reward_convention(&self) -> RewardConvention {
        self.reward_convention
    }

    /// The configured sampling convention
    pub fn sampling_convention(&self) -> SamplingConvention {
        self.sampling_convention
    }

    /// The prior shared by every arm
    pub fn prior(&self) -> BetaArm {
        self.prior
    }

    fn checked_arm(&self, belief: &BeliefState, action: usize) -> Result<BetaArm> {
        if belief.len() != self.num_arms {
            return Err(PlannerError::InvalidBelief(format!(
                "belief {} has {} arms, MDP has {}",
                belief,
                belief.len(),
                self.num_arms
            )));
        }
        if action >= self.num_arms {
            return Err(PlannerError::InvalidAction {
                action,
                num_actions: self.num_arms,
            });
        }
        let arm = belief.arm(action)?;
        arm.validate()?;
        Ok(arm)
    }

    fn realized_payoff(
        &self,
        arm: BetaArm,
        action: usize,
        next_belief: &BeliefState,
    ) -> Result<f64> {
        let next = next_belief.arm(action)?;
        if next == arm.observe(true) {
            Ok(1.0)
        } else if next == arm.observe(false) {
            Ok(0.0)
        } else {
            Err(PlannerError::InvalidBelief(format!(
                "{} is not a one-step successor under action {}",
                next_belief, action
            )))
        }
    }
}

impl BeliefMDP for BetaBernoulliMDP {
    fn num_actions(&self) -> usize {
        self.num_arms
    }

    fn initial_belief(&self) -> BeliefState {
        BeliefState::repeated(self.num_arms, self.prior)
    }

    fn transition(&self, belief: &BeliefState, action: usize) -> Result<Vec<(f64, BeliefState)>> {
        let arm = self.checked_arm(belief, action)?;
        let total = f64::from(arm.alpha) + f64::from(arm.beta);

        Ok(vec![
            (f64::from(arm.alpha) / total, belief.observe(action, true)?),
            (f64::from(arm.beta) / total, belief.observe(action, false)?),
        ])
    }

    fn sample(
        &self,
        belief: &BeliefState,
        action: usize,
        rng: &mut dyn RngCore,
    ) -> Result<BeliefState> {
        let arm = self.checked_arm(belief, action)?;

        let p_success = match self.sampling_convention {
            SamplingConvention::Cumulative => arm.mean(),
            SamplingConvention::PosteriorDraw => {
                let posterior = Beta::new(f64::from(arm.alpha), f64::from(arm.beta))
                    .map_err(|e| PlannerError::InvalidBelief(e.to_string()))?;
                posterior.sample(rng)
            }
        };

        let success = rng.gen::<f64>() < p_success;
        belief.observe(action, success)
    }

    fn reward(
        &self,
        belief: &BeliefState,
        action: usize,
        next_belief: &BeliefState,
    ) -> Result<f64> {
        let arm = self.checked_arm(belief, action)?;

        match self.reward_convention {
            RewardConvention::ExpectedUtility => Ok(arm.mean()),
            RewardConvention::RealizedPayoff => self.realized_payoff(arm, action, next_belief),
            RewardConvention::InformationGain => {
                next_belief.validate()?;
                Ok(next_belief.best_mean() - belief.best_mean())
            }
        }
    }
}
