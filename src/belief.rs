//! Belief states for Beta-Bernoulli bandits.
//!
//! A belief is the vector of per-arm Beta posterior parameters. Beliefs are
//! immutable values: every observation produces a new `BeliefState`, which
//! makes them usable as keys in the memoization tables of every planner.

use std::fmt;

use crate::{PlannerError, Result};

/// Beta posterior parameters for a single arm
///
/// Both counts are strictly positive. They start at the prior and grow by one
/// with every observed success (`alpha`) or failure (`beta`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BetaArm {
    /// Prior plus number of observed successes
    pub alpha: u32,
    /// Prior plus number of observed failures
    pub beta: u32,
}

impl BetaArm {
    /// Creates arm parameters, rejecting non-positive counts
    pub fn new(alpha: u32, beta: u32) -> Result<Self> {
        let arm = BetaArm { alpha, beta };
        arm.validate()?;
        Ok(arm)
    }

    /// The uniform Beta(1, 1) prior
    pub fn uniform() -> Self {
        BetaArm { alpha: 1, beta: 1 }
    }

    /// Posterior mean `alpha / (alpha + beta)`
    pub fn mean(&self) -> f64 {
        let alpha = f64::from(self.alpha);
        alpha / (alpha + f64::from(self.beta))
    }

    /// Returns the parameters after one observation
    pub fn observe(self, success: bool) -> Self {
        if success {
            BetaArm {
                alpha: self.alpha + 1,
                beta: self.beta,
            }
        } else {
            BetaArm {
                alpha: self.alpha,
                beta: self.beta + 1,
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.alpha == 0 || self.beta == 0 {
            return Err(PlannerError::InvalidBelief(format!(
                "Beta parameters must be positive, got ({}, {})",
                self.alpha, self.beta
            )));
        }
        Ok(())
    }
}

impl Default for BetaArm {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Independent Beta posteriors, one per arm
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeliefState {
    arms: Vec<BetaArm>,
}

impl BeliefState {
    /// Creates a belief where every arm holds the same prior
    ///
    /// Fails for zero arms or a prior with a zero count.
    pub fn uniform(num_arms: usize, prior: BetaArm) -> Result<Self> {
        Self::from_arms(vec![prior; num_arms])
    }

    // Callers have validated both the arm count and the prior
    pub(crate) fn repeated(num_arms: usize, prior: BetaArm) -> Self {
        BeliefState {
            arms: vec![prior; num_arms],
        }
    }

    /// Creates a belief from explicit arm parameters
    pub fn from_arms(arms: Vec<BetaArm>) -> Result<Self> {
        if arms.is_empty() {
            return Err(PlannerError::InvalidConfiguration(
                "a belief needs at least one arm".to_string(),
            ));
        }
        for arm in &arms {
            arm.validate()?;
        }
        Ok(BeliefState { arms })
    }

    /// Creates a belief from `(alpha, beta)` pairs
    ///
    /// ```
    /// use bayes_bandit_planner::BeliefState;
    ///
    /// let belief = BeliefState::from_pairs(&[(4, 1), (1, 1)]).unwrap();
    /// assert_eq!(belief.arm(0).unwrap().mean(), 0.8);
    /// assert!(BeliefState::from_pairs(&[(0, 1)]).is_err());
    /// ```
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Result<Self> {
        Self::from_arms(
            pairs
                .iter()
                .map(|&(alpha, beta)| BetaArm { alpha, beta })
                .collect(),
        )
    }

    /// Number of arms
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Returns true if the belief has no arms
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// All arm parameters in action order
    pub fn arms(&self) -> &[BetaArm] {
        &self.arms
    }

    /// Parameters of one arm
    pub fn arm(&self, action: usize) -> Result<BetaArm> {
        self.arms
            .get(action)
            .copied()
            .ok_or(PlannerError::InvalidAction {
                action,
                num_actions: self.arms.len(),
            })
    }

    /// `(alpha, beta)` pairs in action order
    pub fn pairs(&self) -> Vec<(u32, u32)> {
        self.arms.iter().map(|arm| (arm.alpha, arm.beta)).collect()
    }

    /// Posterior means in action order
    pub fn means(&self) -> impl Iterator<Item = f64> + '_ {
        self.arms.iter().map(BetaArm::mean)
    }

    /// Highest posterior mean over all arms
    pub fn best_mean(&self) -> f64 {
        self.means().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Arm with the highest posterior mean, lowest index on ties
    pub fn greedy_action(&self) -> usize {
        crate::utils::argmax(self.means()).unwrap_or(0)
    }

    /// Returns the belief after observing `success` on `action`
    pub fn observe(&self, action: usize, success: bool) -> Result<Self> {
        let arm = self.arm(action)?;
        let mut arms = self.arms.clone();
        arms[action] = arm.observe(success);
        Ok(BeliefState { arms })
    }

    /// Returns the belief after a binary reward on `action`
    ///
    /// The reward must be exactly 0 or 1.
    pub fn observe_reward(&self, action: usize, reward: f64) -> Result<Self> {
        if reward == 1.0 {
            self.observe(action, true)
        } else if reward == 0.0 {
            self.observe(action, false)
        } else {
            Err(PlannerError::InvalidReward(reward))
        }
    }

    /// Returns true if some sequence of observations leads from this belief
    /// to `other`
    ///
    /// Counts only grow, so this holds exactly when `other` has the same arms
    /// and no count below this belief's.
    ///
    /// ```
    /// use bayes_bandit_planner::BeliefState;
    ///
    /// let start = BeliefState::from_pairs(&[(1, 1), (2, 1)]).unwrap();
    /// let later = BeliefState::from_pairs(&[(3, 1), (2, 4)]).unwrap();
    /// assert!(start.can_reach(&later));
    /// assert!(!later.can_reach(&start));
    /// ```
    pub fn can_reach(&self, other: &BeliefState) -> bool {
        self.arms.len() == other.arms.len()
            && self
                .arms
                .iter()
                .zip(&other.arms)
                .all(|(from, to)| to.alpha >= from.alpha && to.beta >= from.beta)
    }

    /// Checks the positivity invariant on every arm
    pub fn validate(&self) -> Result<()> {
        self.arms.iter().try_for_each(BetaArm::validate)
    }
}

impl fmt::Display for BeliefState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, arm) in self.arms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", arm.alpha, arm.beta)?;
        }
        write!(f, "]")
    }
}
