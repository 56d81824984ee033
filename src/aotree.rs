//! Depth-limited AND/OR tree search
//!
//! OR nodes are beliefs where the best action is chosen; AND nodes average
//! over the exact outcome distribution of an action. The recursion stops at
//! a fixed depth and substitutes a [`CutoffHeuristic`] for the value of the
//! rest of the episode. With a cutoff at the full horizon the search is exact
//! and agrees with [`crate::ValueIteration`].

use std::collections::HashMap;
use std::time::Instant;

use crate::{
    belief::BeliefState,
    mdp::BeliefMDP,
    policy::SearchContext,
    stats::{PlannerKind, SearchStatistics},
    value_iteration::Decision,
    PlannerError, Result,
};

/// Value estimate for beliefs at the depth cutoff
pub trait CutoffHeuristic {
    /// Estimated return of the episode steps after the cutoff
    fn evaluate(&self, belief: &BeliefState, context: &SearchContext) -> f64;
}

impl<F> CutoffHeuristic for F
where
    F: Fn(&BeliefState, &SearchContext) -> f64,
{
    fn evaluate(&self, belief: &BeliefState, context: &SearchContext) -> f64 {
        self(belief, context)
    }
}

/// Best posterior mean times the steps left after the cutoff
///
/// The return of pulling the currently best arm for the rest of the episode
/// without learning anything more.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimisticHeuristic;

impl CutoffHeuristic for OptimisticHeuristic {
    fn evaluate(&self, belief: &BeliefState, context: &SearchContext) -> f64 {
        context.steps_beyond_cutoff() as f64 * belief.best_mean()
    }
}

/// AND/OR tree search session over a belief MDP
///
/// # Example
///
/// ```
/// use bayes_bandit_planner::{AOTreeSearch, BeliefMDP, BetaBernoulliMDP, OptimisticHeuristic};
///
/// let mdp = BetaBernoulliMDP::new(3).unwrap();
/// let mut search = AOTreeSearch::new(&mdp, OptimisticHeuristic);
///
/// // Look two steps ahead in an episode with ten steps left
/// let decision = search.search(&mdp.initial_belief(), 2, 10).unwrap();
/// assert!(decision.action < 3);
/// ```
pub struct AOTreeSearch<'a, M: BeliefMDP + ?Sized, H: CutoffHeuristic> {
    mdp: &'a M,
    heuristic: H,
    // layers[d] holds OR nodes solved with d steps to the cutoff
    layers: Vec<HashMap<BeliefState, Decision>>,
    heuristic_cache: HashMap<BeliefState, f64>,
    context: SearchContext,
    statistics: SearchStatistics,
}

impl<'a, M: BeliefMDP + ?Sized, H: CutoffHeuristic> AOTreeSearch<'a, M, H> {
    /// Creates a search over `mdp` with the given cutoff heuristic
    pub fn new(mdp: &'a M, heuristic: H) -> Self {
        AOTreeSearch {
            mdp,
            heuristic,
            layers: Vec::new(),
            heuristic_cache: HashMap::new(),
            context: SearchContext::new(0, 0),
            statistics: SearchStatistics::new(PlannerKind::AOTree),
        }
    }

    /// Searches `max_depth` steps ahead of `start` in an episode with
    /// `horizon` steps remaining
    ///
    /// Memo tables are cleared at the start of every call. With
    /// `max_depth == 0` the greedy arm is returned with its heuristic value.
    pub fn search(
        &mut self,
        start: &BeliefState,
        max_depth: usize,
        horizon: usize,
    ) -> Result<Decision> {
        if max_depth > horizon {
            return Err(PlannerError::InvalidConfiguration(format!(
                "search depth {} exceeds horizon {}",
                max_depth, horizon
            )));
        }
        start.validate()?;

        let start_time = Instant::now();
        self.context = SearchContext::new(horizon, max_depth);
        self.layers = vec![HashMap::new(); max_depth + 1];
        self.heuristic_cache.clear();
        self.statistics = SearchStatistics::new(PlannerKind::AOTree);

        let decision = match self.or_node(start, max_depth)? {
            Some(decision) => decision,
            None => Decision {
                action: start.greedy_action(),
                value: self.cutoff_value(start),
            },
        };

        self.statistics.tree_size = self.layers.iter().map(HashMap::len).sum();
        self.statistics.max_depth = max_depth;
        self.statistics.total_time = start_time.elapsed();
        log::debug!(
            "AO search from {} (depth {}, horizon {}) chose arm {} with value {:.4}; {} OR nodes, {} cache hits",
            start,
            max_depth,
            horizon,
            decision.action,
            decision.value,
            self.statistics.tree_size,
            self.statistics.cache_hits
        );

        Ok(decision)
    }

    /// Returns the statistics of the last search
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn cutoff_value(&mut self, belief: &BeliefState) -> f64 {
        if let Some(&value) = self.heuristic_cache.get(belief) {
            self.statistics.cache_hits += 1;
            return value;
        }
        let value = self.heuristic.evaluate(belief, &self.context);
        self.heuristic_cache.insert(belief.clone(), value);
        value
    }

    fn or_value(&mut self, belief: &BeliefState, depth: usize) -> Result<f64> {
        match self.or_node(belief, depth)? {
            Some(decision) => Ok(decision.value),
            None => Ok(self.cutoff_value(belief)),
        }
    }

    // None at the cutoff
    fn or_node(&mut self, belief: &BeliefState, depth: usize) -> Result<Option<Decision>> {
        if depth == 0 {
            return Ok(None);
        }

        if let Some(&decision) = self.layers[depth].get(belief) {
            self.statistics.cache_hits += 1;
            return Ok(Some(decision));
        }
        self.statistics.iterations += 1;

        let mut best: Option<Decision> = None;
        for action in 0..self.mdp.num_actions() {
            let value = self.and_node(belief, action, depth)?;
            if best.map_or(true, |b| value > b.value) {
                best = Some(Decision { action, value });
            }
        }

        if let Some(decision) = best {
            self.layers[depth].insert(belief.clone(), decision);
        }
        Ok(best)
    }

    fn and_node(&mut self, belief: &BeliefState, action: usize, depth: usize) -> Result<f64> {
        let mut q_value = 0.0;
        for (probability, next_belief) in self.mdp.transition(belief, action)? {
            let reward = self.mdp.reward(belief, action, &next_belief)?;
            q_value += probability * (reward + self.or_value(&next_belief, depth - 1)?);
        }
        Ok(q_value)
    }
}
