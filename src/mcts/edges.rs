//! Outcome grid of an expanded node.
//!
//! An expanded node holds one child per (agent action, opponent action)
//! pair. Children are stored row-major, so every view the search needs is
//! cheap:
//! - outcomes of one agent action: a contiguous slice
//! - outcomes of one opponent action: a strided iterator
//! - all outcomes: the whole slice
//!
//! Enumeration order is the order the domain listed its legal actions in.
//! Tie-breaking in selection and `decide` relies on it.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{ActionKey, AgentActionId, OpponentActionId};

use super::node::NodeId;

/// Legal actions of one side at a node, with their keys.
#[derive(Clone, Debug)]
pub struct EdgeAxis<A> {
    actions: SmallVec<[A; 8]>,
    keys: SmallVec<[ActionKey; 8]>,
    index: FxHashMap<ActionKey, u16>,
}

impl<A> EdgeAxis<A> {
    /// Build an axis from actions and their already validated keys.
    pub fn new(actions: Vec<A>, keys: Vec<ActionKey>, index: FxHashMap<ActionKey, u16>) -> Self {
        debug_assert_eq!(actions.len(), keys.len());
        debug_assert_eq!(actions.len(), index.len());
        Self {
            actions: SmallVec::from_vec(actions),
            keys: SmallVec::from_vec(keys),
            index,
        }
    }

    /// Number of actions on this axis.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in enumeration order.
    #[must_use]
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Keys in enumeration order.
    #[must_use]
    pub fn keys(&self) -> &[ActionKey] {
        &self.keys
    }

    fn position(&self, key: &str) -> Option<u16> {
        self.index.get(key).copied()
    }
}

/// Agent-action x opponent-action grid of child nodes.
#[derive(Clone, Debug)]
pub struct EdgeMap<A> {
    agent: EdgeAxis<A>,
    opponent: EdgeAxis<A>,
    children: Vec<NodeId>,
}

impl<A> EdgeMap<A> {
    /// Assemble an edge map. `children` must be row-major: all replies to
    /// agent action 0 first, then agent action 1, and so on.
    pub fn new(agent: EdgeAxis<A>, opponent: EdgeAxis<A>, children: Vec<NodeId>) -> Self {
        debug_assert_eq!(children.len(), agent.len() * opponent.len());
        Self {
            agent,
            opponent,
            children,
        }
    }

    /// Agent side of the grid.
    #[must_use]
    pub fn agent_axis(&self) -> &EdgeAxis<A> {
        &self.agent
    }

    /// Opponent side of the grid.
    #[must_use]
    pub fn opponent_axis(&self) -> &EdgeAxis<A> {
        &self.opponent
    }

    /// Agent action IDs in enumeration order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentActionId> {
        (0..self.agent.len() as u16).map(AgentActionId)
    }

    /// Opponent action IDs in enumeration order.
    pub fn opponent_ids(&self) -> impl Iterator<Item = OpponentActionId> {
        (0..self.opponent.len() as u16).map(OpponentActionId)
    }

    #[must_use]
    pub fn agent_action(&self, id: AgentActionId) -> &A {
        &self.agent.actions[id.index()]
    }

    #[must_use]
    pub fn opponent_action(&self, id: OpponentActionId) -> &A {
        &self.opponent.actions[id.index()]
    }

    #[must_use]
    pub fn agent_key(&self, id: AgentActionId) -> &ActionKey {
        &self.agent.keys[id.index()]
    }

    #[must_use]
    pub fn opponent_key(&self, id: OpponentActionId) -> &ActionKey {
        &self.opponent.keys[id.index()]
    }

    /// Look an agent action up by key.
    #[must_use]
    pub fn agent_id(&self, key: &str) -> Option<AgentActionId> {
        self.agent.position(key).map(AgentActionId)
    }

    /// Look an opponent action up by key.
    #[must_use]
    pub fn opponent_id(&self, key: &str) -> Option<OpponentActionId> {
        self.opponent.position(key).map(OpponentActionId)
    }

    /// Outcomes of one agent action, in opponent enumeration order.
    #[must_use]
    pub fn outcomes_for_agent(&self, id: AgentActionId) -> &[NodeId] {
        let width = self.opponent.len();
        let start = id.index() * width;
        &self.children[start..start + width]
    }

    /// Outcomes of one opponent action, in agent enumeration order.
    pub fn outcomes_for_opponent(&self, id: OpponentActionId) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .skip(id.index())
            .step_by(self.opponent.len().max(1))
            .copied()
    }

    /// The child reached by a joint move.
    #[must_use]
    pub fn outcome(&self, agent: AgentActionId, opponent: OpponentActionId) -> NodeId {
        self.children[agent.index() * self.opponent.len() + opponent.index()]
    }

    /// Every child, row-major.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `(agent action, outcomes)` groups in enumeration order.
    pub fn groups(&self) -> impl Iterator<Item = (AgentActionId, &[NodeId])> + '_ {
        self.agent_ids().map(move |id| (id, self.outcomes_for_agent(id)))
    }

    /// Rewrite child ids, e.g. after compacting the arena.
    pub(crate) fn remap_children(&mut self, mut f: impl FnMut(NodeId) -> NodeId) {
        for child in &mut self.children {
            *child = f(*child);
        }
    }
}
