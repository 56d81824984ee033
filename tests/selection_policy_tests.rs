use bayes_bandit_planner::{
    policy::selection::{SelectionPolicy, UCB1Policy},
    BeliefState, BetaArm, NodeId, SearchTree,
};

// Create a root with two chance children carrying specific statistics
fn create_test_tree_for_policy() -> (SearchTree, NodeId, Vec<NodeId>) {
    let mut tree = SearchTree::new(BeliefState::uniform(2, BetaArm::uniform()).unwrap());
    let root = tree.root();
    let children = tree.expand(root, &[0.0, 0.0]).to_vec();

    tree.node_mut(root).visits = 60;

    // Child 0: high value (0.9), high visits
    tree.node_mut(children[0]).visits = 50;
    tree.node_mut(children[0]).value = 0.9;

    // Child 1: low value (0.4), low visits
    tree.node_mut(children[1]).visits = 10;
    tree.node_mut(children[1]).value = 0.4;

    (tree, root, children)
}

#[test]
fn test_ucb1_exploration_exploitation_balance() {
    let (tree, root, children) = create_test_tree_for_policy();

    // With low exploration constant, exploitation dominates
    let policy_exploitative = UCB1Policy::new(0.1);
    assert_eq!(
        policy_exploitative.select_child(&tree, root),
        Some(children[0]),
        "With low exploration constant, should prefer child with higher value"
    );

    // With extremely high exploration constant, exploration dominates
    let policy_explorative = UCB1Policy::new(100.0);
    assert_eq!(
        policy_explorative.select_child(&tree, root),
        Some(children[1]),
        "With very high exploration constant, should prefer less-visited child"
    );
}

#[test]
fn test_unvisited_child_is_selected_first() {
    let (mut tree, root, children) = create_test_tree_for_policy();

    // A seed far below the sibling does not matter before the first visit
    tree.node_mut(children[1]).visits = 0;
    tree.node_mut(children[1]).value = -5.0;

    let policy = UCB1Policy::default();
    assert_eq!(policy.select_child(&tree, root), Some(children[1]));
}

#[test]
fn test_ties_go_to_lowest_action() {
    let (mut tree, root, children) = create_test_tree_for_policy();
    for &child in &children {
        tree.node_mut(child).visits = 30;
        tree.node_mut(child).value = 0.5;
    }

    let policy = UCB1Policy::new(2.0);
    assert_eq!(policy.select_child(&tree, root), Some(children[0]));
}

#[test]
fn test_ucb1_value() {
    let policy = UCB1Policy::new(2.0);

    let bound = policy.ucb1_value(0.5, 10, 100);
    let expected = 0.5 + 2.0 * (2.0 * (100f64).ln() / 10.0).sqrt();
    assert!((bound - expected).abs() < 1e-12);

    assert_eq!(policy.ucb1_value(0.5, 0, 100), f64::INFINITY);
}

#[test]
fn test_candidates_are_chance_nodes_in_action_order() {
    let (tree, root, children) = create_test_tree_for_policy();

    assert!(tree.node(root).is_decision());
    assert!(!tree.node(root).is_chance());
    for (action, &child) in children.iter().enumerate() {
        let node = tree.node(child);
        assert!(node.is_chance());
        assert!(node.is_leaf());
        assert_eq!(node.action(), Some(action));
        assert_eq!(node.belief(), tree.node(root).belief());
    }
}

#[test]
fn test_leaf_has_no_child_to_select() {
    let tree = SearchTree::new(BeliefState::uniform(3, BetaArm::uniform()).unwrap());
    let policy = UCB1Policy::default();

    assert_eq!(policy.select_child(&tree, tree.root()), None);
}

#[test]
fn test_boxed_policy_forwards() {
    let (tree, root, children) = create_test_tree_for_policy();

    let boxed: Box<dyn SelectionPolicy> = Box::new(UCB1Policy::new(0.1));
    let cloned = boxed.clone_box();
    assert_eq!(boxed.select_child(&tree, root), Some(children[0]));
    assert_eq!(cloned.select_child(&tree, root), Some(children[0]));
}
