use std::time::Duration;

use bayes_bandit_planner::{
    config::{BestChildCriteria, SeedStrategy},
    policy::{RolloutPolicy, UCB1Policy},
    BeliefMDP, BeliefState, BetaBernoulliMDP, MCTSConfig, NodeKey, PlannerError, PlannerKind,
    RewardConvention, SamplingConvention, MCTS,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn planner(pairs: &[(u32, u32)], config: MCTSConfig) -> MCTS<BetaBernoulliMDP> {
    let mdp = BetaBernoulliMDP::new(pairs.len()).unwrap();
    let belief = BeliefState::from_pairs(pairs).unwrap();
    MCTS::new(mdp, belief, config).unwrap()
}

#[test]
fn test_mcts_basic_search() {
    init_logger();
    let config = MCTSConfig::default()
        .with_trials(100)
        .with_max_depth(5);
    let mut mcts = planner(&[(1, 1), (1, 1)], config);

    let action = mcts.search(10).unwrap();
    assert!(action < 2);

    let stats = mcts.get_statistics();
    assert_eq!(stats.iterations, 100);
    assert!(!stats.stopped_early);
    assert!(stats.tree_size > 3);
    assert_eq!(stats.tree_size, mcts.tree().len());
    assert!(stats.max_depth <= 5);
    assert_eq!(stats.planner, PlannerKind::Uct);
    let summary = stats.summary();
    assert!(summary.starts_with("UCT statistics:"));
    assert!(summary.contains("- Trials: 100"));
    assert!(summary.contains(&format!("- Tree nodes: {}", stats.tree_size)));
    assert!(summary.contains("- Stopped early: false"));
}

#[test]
fn test_every_trial_backs_up_the_root() {
    let config = MCTSConfig::default().with_trials(250).with_max_depth(4);
    let mut mcts = planner(&[(1, 1), (2, 1), (1, 2)], config);
    mcts.search(4).unwrap();

    let tree = mcts.tree();
    let root = tree.node(tree.root());
    assert_eq!(root.visits, 250);

    // Each trial passes through exactly one chance node below the root
    let child_visits: u64 = root
        .children()
        .iter()
        .map(|&id| tree.node(id).visits)
        .sum();
    assert_eq!(child_visits, 250);
    assert_eq!(mcts.action_values().len(), 3);
}

#[test]
fn test_converges_to_better_arm() {
    init_logger();
    let mut hits = 0;
    for seed in 0..20 {
        let config = MCTSConfig::default()
            .with_trials(300)
            .with_max_depth(5)
            .with_seed(seed);
        let mut mcts = planner(&[(2, 8), (8, 2)], config);
        if mcts.search(5).unwrap() == 1 {
            hits += 1;
        }
    }
    assert!(hits >= 18, "better arm chosen {} times out of 20", hits);
}

#[test]
fn test_rollout_seeding_converges_to_better_arm() {
    let mut hits = 0;
    for seed in 0..20 {
        let config = MCTSConfig::default()
            .with_trials(300)
            .with_max_depth(4)
            .with_seed_strategy(SeedStrategy::Rollout { rollouts: 1 })
            .with_seed(seed);
        let mut mcts = planner(&[(1, 4), (4, 1)], config);
        if mcts.search(4).unwrap() == 1 {
            hits += 1;
        }
    }
    assert!(hits >= 15, "better arm chosen {} times out of 20", hits);
}

#[test]
fn test_trial_return_is_folded_into_seed() {
    // One arm, one search step, two steps beyond the cutoff
    let config = MCTSConfig::default().with_trials(2).with_max_depth(1);
    let mut mcts = planner(&[(3, 1)], config);
    mcts.search(3).unwrap();

    // Seed: 3 steps at mean 0.75. The second trial earns 0.75 and reaches
    // (4, 1) or (3, 2), worth 2 * 0.8 or 2 * 0.6 beyond the cutoff.
    let seed = 2.25;
    let after_success = (seed + 0.75 + 1.6) / 2.0;
    let after_failure = (seed + 0.75 + 1.2) / 2.0;

    let value = mcts.action_values()[0];
    assert!(
        (value - after_success).abs() < 1e-12 || (value - after_failure).abs() < 1e-12,
        "unexpected chance node value {}",
        value
    );

    let tree = mcts.tree();
    let child = tree.node(tree.root()).children()[0];
    assert_eq!(tree.node(child).visits, 2);
    assert_eq!(tree.node(tree.root()).visits, 2);
}

#[test]
fn test_zero_trials_returns_best_seed() {
    let config = MCTSConfig::default().with_trials(0);
    let mut mcts = planner(&[(1, 3), (3, 1)], config);

    assert_eq!(mcts.search(10).unwrap(), 1);
    assert_eq!(mcts.get_statistics().iterations, 0);
    // Only the root and its chance nodes exist
    assert_eq!(mcts.tree().len(), 3);
}

#[test]
fn test_zero_horizon_still_returns_an_action() {
    let config = MCTSConfig::default().with_trials(50);
    let mut mcts = planner(&[(1, 3), (3, 1)], config);

    let action = mcts.search(0).unwrap();
    assert!(action < 2);
    assert_eq!(mcts.get_statistics().iterations, 0);
}

#[test]
fn test_transpositions_share_decision_nodes() {
    let config = MCTSConfig::default().with_trials(500).with_max_depth(3);
    let mut mcts = planner(&[(1, 1), (1, 1)], config);
    mcts.search(3).unwrap();

    // Sampled successors land on existing decision nodes
    assert!(mcts.get_statistics().cache_hits > 0);

    // At most 1 + 4 + 10 beliefs are expanded within three steps, plus
    // 20 unexpanded leaves, each decision node carrying two chance nodes
    assert!(mcts.tree().len() <= 35 + 2 * 15);

    let both_succeed = BeliefState::from_pairs(&[(2, 1), (2, 1)]).unwrap();
    if let Some(id) = mcts.tree().find(&NodeKey::decision(both_succeed)) {
        assert!(mcts.tree().node(id).is_decision());
    }
}

#[test]
fn test_search_is_reproducible_with_seed() {
    let config = MCTSConfig::default()
        .with_trials(200)
        .with_max_depth(4)
        .with_seed(11);

    let mut first = planner(&[(1, 1), (2, 2), (1, 1)], config.clone());
    let mut second = planner(&[(1, 1), (2, 2), (1, 1)], config);

    assert_eq!(first.search(6).unwrap(), second.search(6).unwrap());
    assert_eq!(first.action_values(), second.action_values());
}

#[test]
fn test_most_visits_criteria() {
    let config = MCTSConfig::default()
        .with_trials(300)
        .with_max_depth(4)
        .with_best_child_criteria(BestChildCriteria::MostVisits);
    let mut mcts = planner(&[(1, 9), (9, 1)], config);

    let action = mcts.search(4).unwrap();
    let tree = mcts.tree();
    let children = tree.node(tree.root()).children();
    assert_eq!(action, 1);
    assert!(tree.node(children[1]).visits >= tree.node(children[0]).visits);
}

#[test]
fn test_time_limited_search() {
    init_logger();
    let config = MCTSConfig::default()
        .with_trials(10_000_000)
        .with_max_depth(50)
        .with_max_time(Duration::from_millis(20));
    let mut mcts = planner(&[(1, 1); 10], config);

    let action = mcts.search(200).unwrap();
    assert!(action < 10);

    let stats = mcts.get_statistics();
    assert!(stats.stopped_early, "Search should have stopped early");
    assert!(stats.iterations < 10_000_000);
    assert!(stats.total_time >= Duration::from_millis(20));
}

#[test]
fn test_visualization() {
    let config = MCTSConfig::default().with_trials(50).with_max_depth(3);
    let mut mcts = planner(&[(1, 1), (1, 1)], config);
    mcts.search(3).unwrap();

    let visualization = mcts.visualize_tree();
    assert!(visualization.starts_with("[(1, 1), (1, 1)]"));
    assert!(visualization.contains("arm 0"));
    assert!(visualization.contains("arm 1"));
    assert!(visualization.contains("visits:"));
    assert!(visualization.contains("value:"));
}

#[test]
fn test_custom_policies() {
    let config = MCTSConfig::default().with_trials(100).with_max_depth(3);
    let mut mcts = planner(&[(1, 1), (1, 1)], config)
        .with_selection_policy(UCB1Policy::new(0.5))
        .with_evaluation_policy(RolloutPolicy::new(2).unwrap());

    assert!(mcts.search(5).unwrap() < 2);
    assert_eq!(mcts.get_statistics().iterations, 100);
}

#[test]
fn test_other_conventions() {
    let mdp = BetaBernoulliMDP::new(2)
        .unwrap()
        .with_reward_convention(RewardConvention::RealizedPayoff)
        .with_sampling_convention(SamplingConvention::PosteriorDraw);
    let belief = mdp.initial_belief();
    let config = MCTSConfig::default().with_trials(200).with_max_depth(4);

    let mut mcts = MCTS::new(mdp, belief, config).unwrap();
    assert!(mcts.search(4).unwrap() < 2);
}

#[test]
fn test_invalid_setup_is_rejected() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let config = MCTSConfig::default().with_exploration_constant(-1.0);
    assert!(matches!(
        MCTS::new(mdp.clone(), mdp.initial_belief(), config),
        Err(PlannerError::InvalidConfiguration(_))
    ));

    let three_arms = BeliefState::from_pairs(&[(1, 1), (1, 1), (1, 1)]).unwrap();
    assert!(matches!(
        MCTS::new(mdp.clone(), three_arms.clone(), MCTSConfig::default()),
        Err(PlannerError::InvalidBelief(_))
    ));

    assert!(matches!(
        RolloutPolicy::new(0),
        Err(PlannerError::InvalidConfiguration(_))
    ));
    assert_eq!(RolloutPolicy::new(3).unwrap().rollouts(), 3);

    let mut mcts = MCTS::new(mdp.clone(), mdp.initial_belief(), MCTSConfig::default()).unwrap();
    assert!(mcts.advance(three_arms).is_err());
    assert_eq!(mcts.root_belief(), &mdp.initial_belief());
}
