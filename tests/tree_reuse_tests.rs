use bayes_bandit_planner::{BeliefMDP, BetaBernoulliMDP, MCTSConfig, NodeKey, MCTS};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_advance_keeps_subtree_statistics() {
    init_logger();
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();
    let config = MCTSConfig::default()
        .with_trials(300)
        .with_max_depth(5)
        .with_tree_reuse(true);
    let mut mcts = MCTS::new(mdp, start.clone(), config).unwrap();

    let action = mcts.search(5).unwrap();
    let next = start.observe(action, true).unwrap();

    let id = mcts
        .tree()
        .find(&NodeKey::decision(next.clone()))
        .expect("the chosen arm's success outcome should have been sampled");
    let visits = mcts.tree().node(id).visits;
    let value = mcts.tree().node(id).value;
    assert!(visits > 0);

    mcts.advance(next.clone()).unwrap();
    let root = mcts.tree().root();
    assert_eq!(mcts.root_belief(), &next);
    assert_eq!(mcts.tree().node(root).visits, visits);
    assert_eq!(mcts.tree().node(root).value, value);

    // The next search continues from the kept statistics
    mcts.search(4).unwrap();
    let root = mcts.tree().root();
    assert_eq!(mcts.tree().node(root).visits, visits + 300);
}

#[test]
fn test_advance_prunes_unreachable_nodes() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();
    let config = MCTSConfig::default()
        .with_trials(300)
        .with_max_depth(5)
        .with_tree_reuse(true);
    let mut mcts = MCTS::new(mdp, start.clone(), config).unwrap();

    let action = mcts.search(5).unwrap();
    let next = start.observe(action, false).unwrap();
    let size = mcts.tree().len();

    mcts.advance(next.clone()).unwrap();
    let tree = mcts.tree();
    // The old root and the other outcome's subtree are gone
    assert!(tree.len() < size);
    assert!(tree.find(&NodeKey::decision(start.clone())).is_none());
    assert!(tree.find(&NodeKey::decision(start.observe(action, true).unwrap())).is_none());

    // Every kept node is reachable and still indexed under its own id
    for id in 0..tree.len() {
        let node = tree.node(id);
        assert!(next.can_reach(node.belief()));
        let key = NodeKey {
            belief: node.belief().clone(),
            action: node.action(),
        };
        assert_eq!(tree.find(&key), Some(id));
        for &child in node.children() {
            assert!(tree.node(child).is_chance());
            assert_eq!(tree.node(child).belief(), node.belief());
        }
    }

    // Searching again only adds nodes below the new root
    mcts.search(4).unwrap();
    let tree = mcts.tree();
    assert!((0..tree.len()).all(|id| next.can_reach(tree.node(id).belief())));
}

#[test]
fn test_advance_to_unseen_belief_creates_root() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();
    let config = MCTSConfig::default()
        .with_trials(20)
        .with_max_depth(2)
        .with_tree_reuse(true);
    let mut mcts = MCTS::new(mdp, start.clone(), config).unwrap();
    mcts.search(2).unwrap();

    // Ten observations away from anything the search reached
    let mut far = start;
    for _ in 0..10 {
        far = far.observe(0, false).unwrap();
    }
    mcts.advance(far.clone()).unwrap();
    assert_eq!(mcts.root_belief(), &far);
    // Nothing the search built can lead to the new root
    assert_eq!(mcts.tree().len(), 1);
    assert_eq!(mcts.tree().node(mcts.tree().root()).visits, 0);
}

#[test]
fn test_fresh_tree_without_reuse() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();
    let config = MCTSConfig::default().with_trials(100).with_max_depth(4);
    let mut mcts = MCTS::new(mdp, start.clone(), config).unwrap();

    let action = mcts.search(4).unwrap();
    let next = start.observe(action, false).unwrap();
    mcts.advance(next.clone()).unwrap();

    assert_eq!(mcts.tree().len(), 1);
    assert_eq!(mcts.root_belief(), &next);
    assert_eq!(mcts.tree().node(mcts.tree().root()).visits, 0);

    // Searching twice from the same root starts over each time
    mcts.search(3).unwrap();
    let first = mcts.tree().node(mcts.tree().root()).visits;
    mcts.search(3).unwrap();
    assert_eq!(mcts.tree().node(mcts.tree().root()).visits, first);
}

#[test]
fn test_reset_discards_reused_tree() {
    let mdp = BetaBernoulliMDP::new(2).unwrap();
    let start = mdp.initial_belief();
    let config = MCTSConfig::default()
        .with_trials(100)
        .with_max_depth(3)
        .with_tree_reuse(true);
    let mut mcts = MCTS::new(mdp, start.clone(), config).unwrap();

    mcts.search(3).unwrap();
    assert!(mcts.tree().len() > 1);

    mcts.reset(start.clone()).unwrap();
    assert_eq!(mcts.tree().len(), 1);
    assert_eq!(mcts.root_belief(), &start);
}
