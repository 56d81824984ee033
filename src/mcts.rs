//! Main implementation of the Monte Carlo Tree Search planner
//!
//! This module contains the UCT search over a belief MDP. Every search runs a
//! number of trials from the root decision node. A trial descends through
//! decision nodes with the selection policy and through chance nodes by
//! sampling the MDP, seeds new chance nodes with the evaluation policy, and
//! finally backs the return up along the path it took.

use std::time::Instant;

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    belief::BeliefState,
    config::{BestChildCriteria, MCTSConfig, SeedStrategy},
    mdp::BeliefMDP,
    policy::{
        backpropagation::{BackpropagationPolicy, RunningMeanPolicy},
        evaluation::{EvaluationPolicy, PosteriorMeanPolicy, RolloutPolicy},
        selection::{SelectionPolicy, UCB1Policy},
        SearchContext,
    },
    stats::{PlannerKind, SearchStatistics},
    tree::{NodeId, SearchTree},
    PlannerError, Result,
};

/// The main Monte Carlo Tree Search planner
///
/// # Example
///
/// ```
/// use bayes_bandit_planner::{BeliefMDP, BeliefState, BetaBernoulliMDP, MCTSConfig, MCTS};
///
/// let mdp = BetaBernoulliMDP::new(2).unwrap();
/// let belief = BeliefState::from_pairs(&[(2, 8), (8, 2)]).unwrap();
/// let config = MCTSConfig::default().with_trials(300).with_max_depth(5);
///
/// let mut mcts = MCTS::new(mdp, belief, config).unwrap();
/// let action = mcts.search(5).unwrap();
///
/// assert_eq!(action, 1);
/// println!("{}", mcts.get_statistics().summary());
/// ```
pub struct MCTS<M: BeliefMDP> {
    /// The belief MDP being planned in
    mdp: M,

    /// Node arena of the current session
    tree: SearchTree,

    /// Configuration for the search
    config: MCTSConfig,

    /// Statistics gathered during the last search
    statistics: SearchStatistics,

    /// Tree policy at decision nodes
    selection_policy: Box<dyn SelectionPolicy>,

    /// Seeds new chance nodes and values cutoff beliefs
    evaluation_policy: Box<dyn EvaluationPolicy>,

    /// Folds trial returns into node statistics
    backpropagation_policy: Box<dyn BackpropagationPolicy>,

    /// Random source of the session
    rng: StdRng,
}

impl<M: BeliefMDP> MCTS<M> {
    /// Creates a planner rooted at `root_belief`
    ///
    /// The policies follow the configuration: UCB1 with the configured
    /// exploration constant, the configured seed strategy, and the
    /// running-mean backup.
    pub fn new(mdp: M, root_belief: BeliefState, config: MCTSConfig) -> Result<Self> {
        config.validate()?;
        Self::check_belief(&mdp, &root_belief)?;

        let selection_policy: Box<dyn SelectionPolicy> =
            Box::new(UCB1Policy::new(config.exploration_constant));

        let evaluation_policy: Box<dyn EvaluationPolicy> = match config.seed_strategy {
            SeedStrategy::PosteriorMean => Box::new(PosteriorMeanPolicy::new()),
            SeedStrategy::Rollout { rollouts } => Box::new(RolloutPolicy::new(rollouts)?),
        };

        let backpropagation_policy: Box<dyn BackpropagationPolicy> =
            Box::new(RunningMeanPolicy::new());

        Ok(MCTS {
            mdp,
            tree: SearchTree::new(root_belief),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            statistics: SearchStatistics::new(PlannerKind::Uct),
            selection_policy,
            evaluation_policy,
            backpropagation_policy,
        })
    }

    /// Sets the selection policy to use
    pub fn with_selection_policy<P: SelectionPolicy + 'static>(mut self, policy: P) -> Self {
        self.selection_policy = Box::new(policy);
        self
    }

    /// Sets the evaluation policy to use
    pub fn with_evaluation_policy<P: EvaluationPolicy + 'static>(mut self, policy: P) -> Self {
        self.evaluation_policy = Box::new(policy);
        self
    }

    /// Sets the backpropagation policy to use
    pub fn with_backpropagation_policy<P: BackpropagationPolicy + 'static>(
        mut self,
        policy: P,
    ) -> Self {
        self.backpropagation_policy = Box::new(policy);
        self
    }

    /// Returns the belief MDP
    pub fn mdp(&self) -> &M {
        &self.mdp
    }

    /// Returns the configuration
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    /// Returns the search graph of the current session
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Returns the belief at the root
    pub fn root_belief(&self) -> &BeliefState {
        self.tree.node(self.tree.root()).belief()
    }

    /// Runs the search for an episode with `horizon` steps remaining and
    /// returns the best root action
    ///
    /// Unless tree reuse is enabled the node arena is rebuilt from the root
    /// belief first. With zero trials or a zero search depth the root is only
    /// expanded, and the action with the best seed value is returned.
    pub fn search(&mut self, horizon: usize) -> Result<usize> {
        self.statistics = SearchStatistics::new(PlannerKind::Uct);
        if !self.config.reuse_tree {
            self.tree = SearchTree::new(self.root_belief().clone());
        }

        let context = SearchContext::new(horizon, self.config.max_depth);
        let start_time = Instant::now();

        let root = self.tree.root();
        if self.tree.node(root).is_leaf() {
            self.expand(root, context.max_depth, &context)?;
        }

        if context.max_depth > 0 {
            for i in 0..self.config.trials {
                if let Some(max_duration) = self.config.max_time {
                    if start_time.elapsed() >= max_duration {
                        self.statistics.stopped_early = true;
                        log::info!("search stopped after {} trials due to time limit", i);
                        break;
                    }
                }

                let result = self.execute_trial(&context)?;
                log::trace!("trial {} returned {:.4}", i, result);

                self.statistics.iterations = i + 1;
            }
        }

        self.statistics.total_time = start_time.elapsed();
        self.statistics.tree_size = self.tree.len();

        let action = self.select_best_action()?;
        log::debug!(
            "UCT search from {} (horizon {}) chose arm {}\n{}",
            self.root_belief(),
            horizon,
            action,
            self.statistics.summary()
        );
        Ok(action)
    }

    /// Moves the root to `belief` after a real transition
    ///
    /// With tree reuse the existing node for `belief` becomes the root and
    /// keeps its statistics, and nodes the new root cannot reach are dropped.
    /// Otherwise the arena is replaced.
    pub fn advance(&mut self, belief: BeliefState) -> Result<()> {
        Self::check_belief(&self.mdp, &belief)?;

        if self.config.reuse_tree {
            let reused = self.tree.reroot(belief);
            log::debug!(
                "re-rooted search tree at {} ({}, {} nodes kept)",
                self.root_belief(),
                if reused { "reused" } else { "new node" },
                self.tree.len()
            );
        } else {
            self.tree = SearchTree::new(belief);
        }
        Ok(())
    }

    /// Discards the arena and roots a fresh one at `belief`
    pub fn reset(&mut self, belief: BeliefState) -> Result<()> {
        Self::check_belief(&self.mdp, &belief)?;
        self.tree = SearchTree::new(belief);
        Ok(())
    }

    /// Value estimates of the root's chance nodes, in action order
    pub fn action_values(&self) -> Vec<f64> {
        let root = self.tree.node(self.tree.root());
        root.children()
            .iter()
            .map(|&id| self.tree.node(id).value)
            .collect()
    }

    /// Returns the search statistics
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Returns a visualization of the root and its chance nodes
    pub fn visualize_tree(&self) -> String {
        self.tree.to_string()
    }

    fn check_belief(mdp: &M, belief: &BeliefState) -> Result<()> {
        if mdp.num_actions() == 0 {
            return Err(PlannerError::InvalidConfiguration(
                "MDP has no actions".to_string(),
            ));
        }
        if belief.len() != mdp.num_actions() {
            return Err(PlannerError::InvalidBelief(format!(
                "belief {} has {} arms, MDP has {} actions",
                belief,
                belief.len(),
                mdp.num_actions()
            )));
        }
        belief.validate()
    }

    /// Materializes and seeds one chance node per action
    fn expand(&mut self, node: NodeId, depth: usize, context: &SearchContext) -> Result<()> {
        let belief = self.tree.node(node).belief().clone();

        let mut seeds = Vec::with_capacity(self.mdp.num_actions());
        for action in 0..self.mdp.num_actions() {
            seeds.push(self.evaluation_policy.init_q_value(
                &self.mdp,
                &belief,
                action,
                depth,
                context,
                &mut self.rng,
            )?);
        }

        self.tree.expand(node, &seeds);
        Ok(())
    }

    /// Runs one trial from the root and returns its return
    fn execute_trial(&mut self, context: &SearchContext) -> Result<f64> {
        // Nodes to back up, with the reward accrued when leaving them
        let mut path: Vec<(NodeId, f64)> = Vec::new();
        let mut node = self.tree.root();
        let mut depth = context.max_depth;

        let leaf_value = loop {
            if depth == 0 {
                let belief = self.tree.node(node).belief();
                break self
                    .evaluation_policy
                    .terminal_value(&self.mdp, belief, context)?;
            }

            let (visits, action) = {
                let current = self.tree.node(node);
                (current.visits, current.action())
            };

            match action {
                None => {
                    if self.tree.node(node).is_leaf() {
                        self.expand(node, depth, context)?;
                    }
                    let next = self
                        .selection_policy
                        .select_child(&self.tree, node)
                        .ok_or_else(|| {
                            PlannerError::InvalidConfiguration(
                                "decision node without children".to_string(),
                            )
                        })?;
                    path.push((node, 0.0));
                    node = next;
                }
                Some(_) if visits == 0 => {
                    // First visit: the seed stands in for a rollout
                    let chance = self.tree.node_mut(node);
                    chance.visits = 1;
                    break chance.value;
                }
                Some(action) => {
                    let belief = self.tree.node(node).belief().clone();
                    let next_belief = self.mdp.sample(&belief, action, &mut self.rng)?;
                    let reward = self.mdp.reward(&belief, action, &next_belief)?;
                    path.push((node, reward));
                    depth -= 1;

                    let (next, created) = self.tree.find_or_insert_decision(next_belief);
                    if !created {
                        self.statistics.cache_hits += 1;
                    }
                    node = next;
                }
            }
        };

        self.statistics.max_depth = self.statistics.max_depth.max(context.max_depth - depth);

        let mut result = leaf_value;
        for &(id, reward) in path.iter().rev() {
            result += reward;
            self.backpropagation_policy
                .update_stats(self.tree.node_mut(id), result);
        }

        Ok(result)
    }

    /// Selects the best root action based on the configured criteria
    fn select_best_action(&self) -> Result<usize> {
        let root = self.tree.node(self.tree.root());
        let children = root.children();

        let best = match self.config.best_child_criteria {
            BestChildCriteria::HighestValue => {
                crate::utils::argmax(children.iter().map(|&id| self.tree.node(id).value))
            }
            BestChildCriteria::MostVisits => crate::utils::argmax(
                children.iter().map(|&id| self.tree.node(id).visits as f64),
            ),
        };

        best.and_then(|i| self.tree.node(children[i]).action())
            .ok_or_else(|| {
                PlannerError::InvalidConfiguration("root has no actions to choose from".to_string())
            })
    }
}
