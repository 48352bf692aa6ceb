//! MCTS node structures.
//!
//! Uses arena-based allocation with index references (NodeId). A node owns
//! its children only through its edge map; there are no parent links.

use serde::{Deserialize, Serialize};

use super::edges::EdgeMap;

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A node in the MCTS tree: one observed state plus search statistics.
#[derive(Clone, Debug)]
pub struct MCTSNode<O, A> {
    /// The state this node represents. Never changes after creation.
    pub observation: O,

    /// Number of backpropagations that passed through this node.
    pub visited: u32,

    /// Cumulative reward credited by backpropagation.
    pub win: f64,

    /// Value estimate assigned when the node was produced as an outcome.
    pub expected_reward: f64,

    /// Prior of reaching this node from its parent, given the parent's
    /// agent action. Roots carry 1.0.
    pub probability: f64,

    /// Depth in tree (root = 0).
    pub depth: u16,

    /// Outcome grid, present once the node has been expanded.
    pub edges: Option<EdgeMap<A>>,
}

impl<O, A> MCTSNode<O, A> {
    /// Create an unexpanded root node with zeroed statistics.
    pub fn root(observation: O) -> Self {
        Self::outcome(observation, 0, 0.0, 1.0)
    }

    /// Create an unexpanded node seeded with precomputed estimates.
    pub fn outcome(observation: O, depth: u16, expected_reward: f64, probability: f64) -> Self {
        Self {
            observation,
            visited: 0,
            win: 0.0,
            expected_reward,
            probability,
            depth,
            edges: None,
        }
    }

    /// Has an edge map been attached?
    #[inline]
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.edges.is_some()
    }

    /// Average reward per visit (0 when unvisited).
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.visited == 0 {
            0.0
        } else {
            self.win / self.visited as f64
        }
    }

    /// Read-only view handed to the domain's value and policy models.
    #[must_use]
    pub fn view(&self) -> NodeView<'_, O> {
        NodeView {
            observation: &self.observation,
            visited: self.visited,
            win: self.win,
            expected_reward: self.expected_reward,
            probability: self.probability,
        }
    }
}

/// Borrowed snapshot of a node's state and statistics.
#[derive(Debug)]
pub struct NodeView<'a, O> {
    pub observation: &'a O,
    pub visited: u32,
    pub win: f64,
    pub expected_reward: f64,
    pub probability: f64,
}

// Manual impls: a derive would demand `O: Copy`.
impl<O> Clone for NodeView<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for NodeView<'_, O> {}

impl<'a, O> NodeView<'a, O> {
    /// View of a state that has no node in the tree: zeroed statistics,
    /// probability 1.
    #[must_use]
    pub fn detached(observation: &'a O) -> Self {
        Self {
            observation,
            visited: 0,
            win: 0.0,
            expected_reward: 0.0,
            probability: 1.0,
        }
    }

    /// Average reward per visit (0 when unvisited).
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.visited == 0 {
            0.0
        } else {
            self.win / self.visited as f64
        }
    }
}
