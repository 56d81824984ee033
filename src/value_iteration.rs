//! Exact finite-horizon value iteration over a belief MDP
//!
//! Backward induction from the start belief:
//!
//! ```text
//! V(b, 0) = 0
//! V(b, T) = max_a Q(a, b, T)
//! Q(a, b, T) = sum over (p, b') of p * (reward(b, a, b') + V(b', T - 1))
//! ```
//!
//! Every reachable `(T, b)` pair is solved once and memoized by value. The
//! number of reachable beliefs grows exponentially with the horizon, so this
//! solver is meant for small horizons and few arms, where it serves as the
//! reference the heuristic planners are checked against.

use std::collections::HashMap;
use std::time::Instant;

use crate::{
    belief::BeliefState,
    mdp::BeliefMDP,
    stats::{PlannerKind, SearchStatistics},
    PlannerError, Result,
};

/// Best action and its value at a `(horizon, belief)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Action maximizing the expected return, lowest index on ties
    pub action: usize,
    /// Expected return of `action`
    pub value: f64,
}

/// Solved policy: a decision for every reachable `(horizon, belief)` pair
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    // layers[t] holds the beliefs solved with t steps remaining
    layers: Vec<HashMap<BeliefState, Decision>>,
}

impl ValueTable {
    /// Returns the decision for `belief` with `horizon` steps remaining
    pub fn lookup(&self, horizon: usize, belief: &BeliefState) -> Option<Decision> {
        self.layers.get(horizon)?.get(belief).copied()
    }

    /// Like [`ValueTable::lookup`], reporting a missing entry as an error
    pub fn get(&self, horizon: usize, belief: &BeliefState) -> Result<Decision> {
        self.lookup(horizon, belief)
            .ok_or_else(|| PlannerError::MissingTableEntry {
                horizon,
                belief: belief.to_string(),
            })
    }

    /// Largest horizon held by the table
    pub fn horizon(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Total number of solved pairs
    pub fn len(&self) -> usize {
        self.layers.iter().map(HashMap::len).sum()
    }

    /// Returns true if nothing was solved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(horizon, belief, decision)` entries
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BeliefState, &Decision)> {
        self.layers
            .iter()
            .enumerate()
            .flat_map(|(t, layer)| layer.iter().map(move |(b, d)| (t, b, d)))
    }
}

/// Value iteration solver bound to a belief MDP
pub struct ValueIteration<'a, M: BeliefMDP + ?Sized> {
    mdp: &'a M,
    table: ValueTable,
    statistics: SearchStatistics,
}

impl<'a, M: BeliefMDP + ?Sized> ValueIteration<'a, M> {
    /// Creates a solver for `mdp`
    pub fn new(mdp: &'a M) -> Self {
        ValueIteration {
            mdp,
            table: ValueTable::default(),
            statistics: SearchStatistics::new(PlannerKind::ValueIteration),
        }
    }

    /// Solves `horizon` steps from the MDP's initial belief
    pub fn solve(&mut self, horizon: usize) -> Result<ValueTable> {
        let start = self.mdp.initial_belief();
        self.solve_from(&start, horizon)
    }

    /// Solves `horizon` steps from `belief`
    ///
    /// Each call is an independent session: the returned table holds exactly
    /// the pairs reachable from `belief`.
    pub fn solve_from(&mut self, belief: &BeliefState, horizon: usize) -> Result<ValueTable> {
        let start_time = Instant::now();
        self.statistics = SearchStatistics::new(PlannerKind::ValueIteration);
        self.table = ValueTable {
            layers: vec![HashMap::new(); horizon + 1],
        };

        self.decide(belief, horizon)?;

        let table = std::mem::take(&mut self.table);
        self.statistics.tree_size = table.len();
        self.statistics.max_depth = horizon;
        self.statistics.total_time = start_time.elapsed();
        log::debug!(
            "value iteration solved {} pairs for horizon {} in {:.3}s",
            table.len(),
            horizon,
            self.statistics.total_time.as_secs_f64()
        );

        Ok(table)
    }

    /// Returns the statistics of the last solve
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn value(&mut self, belief: &BeliefState, horizon: usize) -> Result<f64> {
        Ok(self.decide(belief, horizon)?.map_or(0.0, |d| d.value))
    }

    fn decide(&mut self, belief: &BeliefState, horizon: usize) -> Result<Option<Decision>> {
        if horizon == 0 {
            return Ok(None);
        }

        if let Some(&decision) = self.table.layers[horizon].get(belief) {
            self.statistics.cache_hits += 1;
            return Ok(Some(decision));
        }
        self.statistics.iterations += 1;

        let mut best: Option<Decision> = None;
        for action in 0..self.mdp.num_actions() {
            let value = self.q_value(action, belief, horizon)?;
            if best.map_or(true, |b| value > b.value) {
                best = Some(Decision { action, value });
            }
        }

        if let Some(decision) = best {
            self.table.layers[horizon].insert(belief.clone(), decision);
        }
        Ok(best)
    }

    fn q_value(&mut self, action: usize, belief: &BeliefState, horizon: usize) -> Result<f64> {
        let mut q_value = 0.0;
        for (probability, next_belief) in self.mdp.transition(belief, action)? {
            let reward = self.mdp.reward(belief, action, &next_belief)?;
            q_value += probability * (reward + self.value(&next_belief, horizon - 1)?);
        }
        Ok(q_value)
    }
}
