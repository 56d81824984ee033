use std::cell::Cell;

use bayes_bandit_planner::{
    AOTreeSearch, BeliefMDP, BeliefState, BetaBernoulliMDP, CutoffHeuristic, OptimisticHeuristic,
    PlannerError, PlannerKind, SearchContext, ValueIteration,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_full_depth_search_matches_value_iteration() {
    init_logger();
    let cases = vec![
        (BetaBernoulliMDP::new(2).unwrap(), vec![(1, 1), (1, 1)], 6),
        (BetaBernoulliMDP::new(2).unwrap(), vec![(2, 1), (1, 3)], 6),
        (BetaBernoulliMDP::new(2).unwrap(), vec![(1, 2), (5, 4)], 5),
        (BetaBernoulliMDP::new(3).unwrap(), vec![(1, 1), (1, 1), (1, 1)], 4),
    ];

    for (mdp, pairs, max_horizon) in cases {
        let start = BeliefState::from_pairs(&pairs).unwrap();
        for horizon in 1..=max_horizon {
            let table = ValueIteration::new(&mdp)
                .solve_from(&start, horizon)
                .unwrap();
            let exact = table.get(horizon, &start).unwrap();

            let mut search = AOTreeSearch::new(&mdp, OptimisticHeuristic);
            let decision = search.search(&start, horizon, horizon).unwrap();

            assert_eq!(
                decision.action, exact.action,
                "{} with horizon {}",
                start, horizon
            );
            assert!((decision.value - exact.value).abs() < 1e-12);
        }
    }
}

#[test]
fn test_symmetric_start_is_deterministic() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();
    let mut search = AOTreeSearch::new(&mdp, OptimisticHeuristic);

    for _ in 0..3 {
        let decision = search.search(&start, 1, 1).unwrap();
        assert_eq!(decision.action, 0);
        assert!((decision.value - 0.5).abs() < 1e-12);
    }
}

#[test]
fn test_depth_beyond_horizon_is_rejected() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let mut search = AOTreeSearch::new(&mdp, OptimisticHeuristic);

    let result = search.search(&mdp.initial_belief(), 4, 3);
    assert!(matches!(result, Err(PlannerError::InvalidConfiguration(_))));
}

#[test]
fn test_zero_depth_is_greedy() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = BeliefState::from_pairs(&[(1, 3), (3, 1)]).unwrap();
    let mut search = AOTreeSearch::new(&mdp, OptimisticHeuristic);

    let decision = search.search(&start, 0, 10).unwrap();
    assert_eq!(decision.action, 1);
    // Optimistic value of ten more pulls of the best mean
    assert!((decision.value - 7.5).abs() < 1e-12);
}

#[test]
fn test_optimistic_heuristic_value() {
    let belief = BeliefState::from_pairs(&[(1, 1), (4, 1)]).unwrap();
    let context = SearchContext::new(10, 4);

    let value = OptimisticHeuristic.evaluate(&belief, &context);
    assert!((value - 6.0 * 0.8).abs() < 1e-12);
}

#[test]
fn test_heuristic_is_evaluated_once_per_cutoff_belief() {
    init_logger();
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();

    let calls = Cell::new(0);
    let heuristic = |belief: &BeliefState, context: &SearchContext| {
        calls.set(calls.get() + 1);
        context.steps_beyond_cutoff() as f64 * belief.best_mean()
    };

    let mut search = AOTreeSearch::new(&mdp, heuristic);
    search.search(&start, 2, 5).unwrap();

    // Two observations spread over four counters give ten beliefs, reached
    // along sixteen paths
    assert_eq!(calls.get(), 10);
    let stats = search.get_statistics();
    assert_eq!(stats.cache_hits, 6);
    assert_eq!(stats.max_depth, 2);
    assert_eq!(stats.planner, PlannerKind::AOTree);
    assert!(stats.summary().starts_with("AO tree search statistics:"));
    assert!(stats.summary().contains("- Memo hits: 6"));
}

#[test]
fn test_closure_heuristic_changes_decision() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();

    // Rewards successes on arm 1 far beyond their real worth
    let biased =
        |belief: &BeliefState, _: &SearchContext| f64::from(belief.arms()[1].alpha) * 100.0;
    let mut search = AOTreeSearch::new(&mdp, biased);
    let decision = search.search(&start, 1, 3).unwrap();

    assert_eq!(decision.action, 1);
}
