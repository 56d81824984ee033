//! Node arena for Monte Carlo Tree Search
//!
//! This module defines the search structure used by MCTS. Nodes live in a
//! flat arena and are found through an index keyed by `(belief, action)`, so
//! two trial paths reaching the same belief share one decision node. The
//! structure is therefore a directed acyclic graph, even though it is walked
//! like a tree. Re-rooting keeps only the nodes reachable from the new root.

use std::collections::HashMap;
use std::fmt;

use crate::belief::BeliefState;

/// Index of a node in the [`SearchTree`] arena
pub type NodeId = usize;

/// Identity of a node
///
/// Decision nodes carry no action, chance nodes carry the action chosen in
/// their belief. Nodes with equal keys are the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    /// Belief at this node
    pub belief: BeliefState,
    /// Chosen action for chance nodes, `None` for decision nodes
    pub action: Option<usize>,
}

impl NodeKey {
    /// Key of the decision node for `belief`
    pub fn decision(belief: BeliefState) -> Self {
        NodeKey {
            belief,
            action: None,
        }
    }

    /// Key of the chance node for `action` in `belief`
    pub fn chance(belief: BeliefState, action: usize) -> Self {
        NodeKey {
            belief,
            action: Some(action),
        }
    }
}

/// The two node variants of the search
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A belief where an action is chosen
    ///
    /// Children are chance nodes in action order, materialized on the first
    /// visit.
    Decision {
        /// Chance node per action, empty until expanded
        children: Vec<NodeId>,
    },

    /// A chosen action whose outcome is still to be sampled
    ///
    /// Successors are not stored: they are resolved through the arena index
    /// by the sampled belief.
    Chance,
}

/// A node in the MCTS search graph
#[derive(Debug, Clone)]
pub struct MCTSNode {
    /// Identity of the node
    pub key: NodeKey,

    /// Decision or chance payload
    pub kind: NodeKind,

    /// Number of backups through this node
    pub visits: u64,

    /// Running mean of the returns backed up through this node
    ///
    /// Chance nodes start at their seed value.
    pub value: f64,
}

impl MCTSNode {
    /// Returns the belief of this node
    pub fn belief(&self) -> &BeliefState {
        &self.key.belief
    }

    /// Returns the chosen action of a chance node
    pub fn action(&self) -> Option<usize> {
        self.key.action
    }

    /// Returns true for decision nodes
    pub fn is_decision(&self) -> bool {
        matches!(self.kind, NodeKind::Decision { .. })
    }

    /// Returns true for chance nodes
    pub fn is_chance(&self) -> bool {
        matches!(self.kind, NodeKind::Chance)
    }

    /// Children of a decision node, empty for chance nodes
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Decision { children } => children,
            NodeKind::Chance => &[],
        }
    }

    /// Returns true if the node has no materialized children
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// Arena of search nodes with a `(belief, action)` index
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<MCTSNode>,
    index: HashMap<NodeKey, NodeId>,
    root: NodeId,
}

impl SearchTree {
    /// Creates a tree holding a single root decision node
    pub fn new(root_belief: BeliefState) -> Self {
        let mut tree = SearchTree {
            nodes: Vec::new(),
            index: HashMap::new(),
            root: 0,
        };
        tree.root = tree.find_or_insert_decision(root_belief).0;
        tree
    }

    /// The current root decision node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn node(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id]
    }

    /// Returns a node by id for modification
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id]
    }

    /// Finds a node by key
    pub fn find(&self, key: &NodeKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Finds the decision node for `belief`, creating it when absent
    ///
    /// Returns the node id and whether it was created.
    pub fn find_or_insert_decision(&mut self, belief: BeliefState) -> (NodeId, bool) {
        let key = NodeKey::decision(belief);
        if let Some(&id) = self.index.get(&key) {
            return (id, false);
        }
        let id = self.push(MCTSNode {
            key,
            kind: NodeKind::Decision {
                children: Vec::new(),
            },
            visits: 0,
            value: 0.0,
        });
        (id, true)
    }

    /// Materializes one chance child per seed value under a decision node
    ///
    /// Child `i` is the chance node for action `i`, starts with zero visits
    /// and holds `seeds[i]` as its value. Expanding a node that already has
    /// children or is not a decision node is a no-op.
    pub fn expand(&mut self, id: NodeId, seeds: &[f64]) -> &[NodeId] {
        if self.nodes[id].is_decision() && self.nodes[id].is_leaf() {
            let belief = self.nodes[id].key.belief.clone();
            let mut children = Vec::with_capacity(seeds.len());
            for (action, &seed) in seeds.iter().enumerate() {
                let key = NodeKey::chance(belief.clone(), action);
                let child = match self.index.get(&key) {
                    Some(&existing) => existing,
                    None => self.push(MCTSNode {
                        key,
                        kind: NodeKind::Chance,
                        visits: 0,
                        value: seed,
                    }),
                };
                children.push(child);
            }
            self.nodes[id].kind = NodeKind::Decision { children };
        }
        self.nodes[id].children()
    }

    /// Makes the decision node for `belief` the new root
    ///
    /// Nodes whose belief cannot be reached from `belief` are dropped and the
    /// survivors renumbered, so ids taken before the call are invalid after
    /// it. Statistics of the kept nodes are unchanged. Returns true if the
    /// node for `belief` already existed.
    pub fn reroot(&mut self, belief: BeliefState) -> bool {
        self.retain_reachable(&belief);
        let (id, created) = self.find_or_insert_decision(belief);
        self.root = id;
        !created
    }

    fn retain_reachable(&mut self, from: &BeliefState) {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut kept = Vec::with_capacity(self.nodes.len());
        for (old, node) in self.nodes.drain(..).enumerate() {
            if from.can_reach(node.belief()) {
                remap[old] = Some(kept.len());
                kept.push(node);
            }
        }

        // Chance children share their parent's belief, so none go missing
        for node in &mut kept {
            if let NodeKind::Decision { children } = &mut node.kind {
                *children = children.iter().filter_map(|&child| remap[child]).collect();
            }
        }

        self.index = kept
            .iter()
            .enumerate()
            .map(|(id, node)| (node.key.clone(), id))
            .collect();
        self.nodes = kept;
    }

    fn push(&mut self, node: MCTSNode) -> NodeId {
        let id = self.nodes.len();
        self.index.insert(node.key.clone(), id);
        self.nodes.push(node);
        id
    }

    fn fmt_node(
        &self,
        id: NodeId,
        indent: usize,
        max_indent: usize,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let node = &self.nodes[id];
        let label = match node.action() {
            Some(action) => format!("arm {}", action),
            None => format!("{}", node.belief()),
        };
        writeln!(
            f,
            "{}{} (visits: {}, value: {:.3})",
            "  ".repeat(indent),
            label,
            node.visits,
            node.value
        )?;

        if indent >= max_indent {
            return Ok(());
        }
        for &child in node.children() {
            self.fmt_node(child, indent + 1, max_indent, f)?;
        }
        Ok(())
    }
}

/// Shows the root decision node and its chance children
impl fmt::Display for SearchTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, 0, 1, f)
    }
}
