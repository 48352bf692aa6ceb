//! Arena-based MCTS tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references. Nodes are never
//! freed individually; the whole arena is dropped or compacted at turn
//! boundaries.

use std::collections::VecDeque;

use super::node::{MCTSNode, NodeId};

/// Arena-based MCTS tree.
///
/// Nodes are stored in a flat vector and referenced by `NodeId` indices.
/// Child ownership lives in each node's edge map.
#[derive(Clone, Debug)]
pub struct MCTSTree<O, A> {
    /// All nodes in the tree.
    nodes: Vec<MCTSNode<O, A>>,

    /// The root node ID (always 0 after construction or re-rooting).
    root: NodeId,
}

impl<O, A> MCTSTree<O, A> {
    /// Create a tree holding a single unexpanded root for `observation`.
    pub fn new(observation: O) -> Self {
        Self::with_capacity(observation, 1024)
    }

    /// Create a tree with custom initial capacity.
    pub fn with_capacity(observation: O, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(MCTSNode::root(observation));
        Self {
            nodes,
            root: NodeId::new(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode<O, A> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode<O, A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: MCTSNode<O, A>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &MCTSNode<O, A> {
        self.get(self.root)
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode<O, A>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let expanded_count = self.nodes.iter().filter(|n| n.is_expanded()).count();
        let total_edges: usize = self
            .nodes
            .iter()
            .filter_map(|n| n.edges.as_ref())
            .map(|e| e.children().len())
            .sum();

        TreeStats {
            node_count: self.nodes.len(),
            expanded_count,
            max_depth,
            total_edges,
        }
    }

    /// Keep only the subtree below `new_root`, compacted into a fresh arena.
    ///
    /// Statistics of the kept nodes survive; depths are rebased so the new
    /// root sits at depth 0.
    #[must_use]
    pub fn into_subtree(self, new_root: NodeId) -> Self {
        let base_depth = self.get(new_root).depth;
        let mut slots: Vec<Option<MCTSNode<O, A>>> = self.nodes.into_iter().map(Some).collect();

        // Breadth-first order becomes the new arena order.
        let mut order = Vec::new();
        let mut remap = vec![u32::MAX; slots.len()];
        let mut queue = VecDeque::from([new_root]);
        while let Some(old) = queue.pop_front() {
            remap[old.0 as usize] = order.len() as u32;
            order.push(old);
            if let Some(edges) = slots[old.0 as usize].as_ref().and_then(|n| n.edges.as_ref()) {
                queue.extend(edges.children().iter().copied());
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            if let Some(mut node) = slots[old.0 as usize].take() {
                node.depth -= base_depth;
                if let Some(edges) = node.edges.as_mut() {
                    edges.remap_children(|child| NodeId::new(remap[child.0 as usize]));
                }
                nodes.push(node);
            }
        }
        nodes[0].probability = 1.0;

        Self {
            nodes,
            root: NodeId::new(0),
        }
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    /// Total number of nodes.
    pub node_count: usize,

    /// Nodes carrying an edge map.
    pub expanded_count: usize,

    /// Maximum depth reached.
    pub max_depth: u16,

    /// Total number of outcome edges across expanded nodes.
    pub total_edges: usize,
}

impl TreeStats {
    /// Average outcomes per expanded node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.expanded_count == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.expanded_count as f64
        }
    }

    /// Share of nodes that have been expanded.
    #[must_use]
    pub fn expansion_ratio(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.expanded_count as f64 / self.node_count as f64
        }
    }
}
