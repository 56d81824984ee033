//! Utility functions shared by the planners
//!
//! This module contains small numeric helpers used throughout the crate.

/// Returns the index of the largest value
///
/// Ties resolve to the first index reaching the maximum, which is the
/// tie-break every planner in this crate uses. NaN values are never selected.
/// Returns `None` for an empty iterator or one holding only NaN.
pub fn argmax<I: IntoIterator<Item = f64>>(values: I) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in values.into_iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ if value.is_nan() => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

/// Calculates the exploration term of the UCT bound
///
/// `C * sqrt(2 * ln(parent_visits) / child_visits)`, infinite for unvisited
/// children.
pub fn exploration_term(parent_visits: u64, child_visits: u64, exploration_constant: f64) -> f64 {
    if child_visits == 0 {
        return f64::INFINITY;
    }

    exploration_constant * (2.0 * (parent_visits as f64).ln() / child_visits as f64).sqrt()
}

/// Calculates the upper confidence bound of a child
pub fn ucb_value(value: f64, visits: u64, parent_visits: u64, exploration_constant: f64) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }

    value + exploration_term(parent_visits, visits, exploration_constant)
}

/// Incremental sample mean: folds `sample` into a mean over `count` samples
///
/// `count` must already include the new sample.
pub fn running_mean(mean: f64, sample: f64, count: u64) -> f64 {
    if count == 0 {
        return mean;
    }
    mean + (sample - mean) / count as f64
}
