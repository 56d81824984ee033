//! UCT learner
//!
//! Runs an MCTS search at every decision. By default every search starts
//! from a fresh tree; with tree reuse the search graph follows the real
//! observations through the episode.

use crate::{
    belief::BeliefState,
    config::MCTSConfig,
    learners::{BeliefTracker, Learner},
    mcts::MCTS,
    mdp::{BeliefMDP, BetaBernoulliMDP},
    Result,
};

/// UCT learner over Beta-Bernoulli arms
pub struct UctLearner {
    mcts: MCTS<BetaBernoulliMDP>,
    tracker: BeliefTracker,
}

impl UctLearner {
    /// Creates a learner for `num_arms` uniform arms
    pub fn new(num_arms: usize, horizon: usize, config: MCTSConfig) -> Result<Self> {
        Self::with_mdp(BetaBernoulliMDP::new(num_arms)?, horizon, config)
    }

    /// Creates a learner planning in `mdp`
    ///
    /// Any reward convention of the MDP is usable here, since the search
    /// samples transitions anyway.
    pub fn with_mdp(mdp: BetaBernoulliMDP, horizon: usize, config: MCTSConfig) -> Result<Self> {
        let start = mdp.initial_belief();
        let mcts = MCTS::new(mdp, start.clone(), config)?;
        Ok(UctLearner {
            mcts,
            tracker: BeliefTracker::new(start, horizon),
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

    /// The underlying planner
    pub fn mcts(&self) -> &MCTS<BetaBernoulliMDP> {
        &self.mcts
    }
}

impl Learner for UctLearner {
    fn select_action(&mut self) -> Result<usize> {
        self.tracker.ensure_remaining()?;
        self.mcts.search(self.tracker.horizon())
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        self.tracker.observe(action, reward)?;
        self.mcts.advance(self.tracker.belief().clone())
    }

    fn reset(&mut self) {
        self.tracker.reset();
        let start = self.mcts.mdp().initial_belief();
        // The start belief passed validation when the learner was built
        if let Err(e) = self.mcts.reset(start) {
            log::error!("failed to reset UCT learner: {}", e);
        }
    }
}
