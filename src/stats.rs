//! Statistics collection for planner searches
//!
//! Every planner fills in a [`SearchStatistics`] while it runs. The same
//! counters mean different things per planner: UCT counts trials and arena
//! nodes, the exact solvers count node evaluations and memo entries.

use std::fmt;
use std::time::Duration;

/// The planner a set of statistics describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlannerKind {
    /// Monte Carlo tree search with UCB1 selection
    #[default]
    Uct,
    /// Depth-limited AND-OR tree search
    AOTree,
    /// Exact finite-horizon value iteration
    ValueIteration,
}

impl PlannerKind {
    fn work_label(self) -> &'static str {
        match self {
            PlannerKind::Uct => "Trials",
            PlannerKind::AOTree | PlannerKind::ValueIteration => "Node evaluations",
        }
    }

    fn size_label(self) -> &'static str {
        match self {
            PlannerKind::Uct => "Tree nodes",
            PlannerKind::AOTree | PlannerKind::ValueIteration => "Memo entries",
        }
    }

    fn hit_label(self) -> &'static str {
        match self {
            PlannerKind::Uct => "Transpositions",
            PlannerKind::AOTree | PlannerKind::ValueIteration => "Memo hits",
        }
    }
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlannerKind::Uct => "UCT",
            PlannerKind::AOTree => "AO tree search",
            PlannerKind::ValueIteration => "Value iteration",
        };
        f.write_str(name)
    }
}

/// Statistics collected during a search
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchStatistics {
    /// Planner that produced these numbers
    pub planner: PlannerKind,

    /// Trials (UCT) or node evaluations (AO, value iteration)
    pub iterations: usize,

    /// Total time spent searching
    pub total_time: Duration,

    /// Arena nodes (UCT) or memo entries (AO, value iteration) at the end
    pub tree_size: usize,

    /// Maximum depth reached below the root
    pub max_depth: usize,

    /// Lookups answered from a memo table or the node index
    pub cache_hits: usize,

    /// Whether the time budget ran out before the trial budget
    pub stopped_early: bool,
}

impl SearchStatistics {
    /// Creates empty statistics for `planner`
    pub fn new(planner: PlannerKind) -> Self {
        SearchStatistics {
            planner,
            ..Default::default()
        }
    }

    /// Returns the average time per iteration in microseconds
    pub fn avg_time_per_iteration_us(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.iterations as f64
    }

    /// Returns the number of iterations per second
    pub fn iterations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.iterations as f64 / self.total_time.as_secs_f64()
    }

    /// Returns a multi-line summary labelled for the planner
    pub fn summary(&self) -> String {
        let kind = self.planner;
        let mut text = format!(
            "{} statistics:\n\
             - {}: {}\n\
             - Total time: {:.3} seconds\n\
             - {}: {}\n\
             - Max depth: {}\n\
             - {}: {}\n\
             - Avg time per {}: {:.3} µs",
            kind,
            kind.work_label(),
            self.iterations,
            self.total_time.as_secs_f64(),
            kind.size_label(),
            self.tree_size,
            self.max_depth,
            kind.hit_label(),
            self.cache_hits,
            if kind == PlannerKind::Uct { "trial" } else { "evaluation" },
            self.avg_time_per_iteration_us(),
        );
        // Only UCT runs under a time budget
        if kind == PlannerKind::Uct {
            text.push_str(&format!(
                "\n - Trials per second: {:.1}\n - Stopped early: {}",
                self.iterations_per_second(),
                self.stopped_early
            ));
        }
        text
    }
}

