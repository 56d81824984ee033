//! Depth-limited lookahead learner
//!
//! Runs an AO tree search with the optimistic cutoff heuristic at every
//! decision, `min(horizon, max_depth)` steps deep.

use crate::{
    aotree::{AOTreeSearch, OptimisticHeuristic},
    belief::BeliefState,
    learners::{BeliefTracker, Learner},
    mdp::{BeliefMDP, BetaBernoulliMDP},
    stats::{PlannerKind, SearchStatistics},
    Result,
};

/// AO lookahead learner over Beta-Bernoulli arms
#[derive(Debug, Clone)]
pub struct LookaheadLearner {
    mdp: BetaBernoulliMDP,
    max_depth: usize,
    tracker: BeliefTracker,
    last_statistics: SearchStatistics,
}

impl LookaheadLearner {
    /// Creates a learner for `num_arms` uniform arms
    pub fn new(num_arms: usize, horizon: usize, max_depth: usize) -> Result<Self> {
        Self::with_mdp(BetaBernoulliMDP::new(num_arms)?, horizon, max_depth)
    }

    /// Creates a learner planning in `mdp`
    pub fn with_mdp(mdp: BetaBernoulliMDP, horizon: usize, max_depth: usize) -> Result<Self> {
        let start = mdp.initial_belief();
        Ok(LookaheadLearner {
            mdp,
            max_depth,
            tracker: BeliefTracker::new(start, horizon),
            last_statistics: SearchStatistics::new(PlannerKind::AOTree),
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

    /// Statistics of the most recent search
    pub fn last_statistics(&self) -> &SearchStatistics {
        &self.last_statistics
    }
}

impl Learner for LookaheadLearner {
    fn select_action(&mut self) -> Result<usize> {
        self.tracker.ensure_remaining()?;
        let horizon = self.tracker.horizon();
        let depth = horizon.min(self.max_depth);

        let mut search = AOTreeSearch::new(&self.mdp, OptimisticHeuristic);
        let decision = search.search(self.tracker.belief(), depth, horizon)?;
        self.last_statistics = search.get_statistics().clone();

        Ok(decision.action)
    }

    fn update(&mut self, action: usize, reward: f64) -> Result<()> {
        self.tracker.observe(action, reward)
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }
}
