//! The domain contract the planner is parameterized by.
//!
//! Domains implement `MarkovDecisionProcess` to describe:
//! - What each side may do in a state
//! - How a joint (agent, opponent) move advances the state
//! - How states and moves are scored
//! - How opponent replies are distributed

use crate::core::ActionKey;
use crate::mcts::node::NodeView;

/// One candidate outcome of an agent action, as shown to the transition model.
///
/// The full sibling group is handed over so the model can weigh an outcome
/// relative to the other replies the opponent could make.
#[derive(Debug)]
pub struct Sibling<'a, O, A> {
    /// The opponent reply leading to this outcome.
    pub opponent_action: &'a A,
    /// The state after the joint move.
    pub observation: &'a O,
    /// Value estimate assigned to the outcome at creation.
    pub expected_reward: f64,
}

impl<O, A> Clone for Sibling<'_, O, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O, A> Copy for Sibling<'_, O, A> {}

/// Markov Decision Process trait.
///
/// All methods must be pure: equal arguments give equal results, and nothing
/// observable changes between calls. Weighted sampling and backpropagation
/// both rely on it.
///
/// ## Implementation Notes
///
/// - `legal_*_actions`: Return an empty vec only for terminal states; the
///   planner reports `NoLegalAction` otherwise
/// - `key_from_action` / `action_from_key`: Must round-trip for every legal
///   action, and distinct actions of one node must get distinct keys
/// - `transition_probability`: Raw weights are fine; the planner normalizes
///   each sibling group
pub trait MarkovDecisionProcess {
    /// Environment snapshot. Opaque to the planner.
    type Observation: Clone + std::fmt::Debug;

    /// Move of either side. Opaque to the planner beyond equality.
    type Action: Clone + PartialEq + std::fmt::Debug;

    /// Actions available to the searching agent.
    fn legal_agent_actions(&self, observation: &Self::Observation) -> Vec<Self::Action>;

    /// Replies available to the opponent.
    fn legal_opponent_actions(&self, observation: &Self::Observation) -> Vec<Self::Action>;

    /// One-step transition for a joint move.
    fn simulate(
        &self,
        observation: &Self::Observation,
        agent_action: &Self::Action,
        opponent_action: &Self::Action,
    ) -> Self::Observation;

    /// Reward of a state from the agent's point of view.
    fn reward(&self, observation: &Self::Observation) -> f64;

    /// Is this state the end of the episode?
    fn is_terminal(&self, observation: &Self::Observation) -> bool;

    /// Value model: how promising is committing to `action` from `node`.
    ///
    /// Never sees the opponent's reply.
    fn value(&self, node: NodeView<'_, Self::Observation>, action: &Self::Action) -> f64;

    /// Policy model: exploration signal for a node.
    ///
    /// `None` (the default) makes the selection policy fall back to the
    /// UCB1 bonus.
    fn policy(&self, _node: NodeView<'_, Self::Observation>) -> Option<f64> {
        None
    }

    /// Weight of `opponent_action` among the replies to `agent_action`.
    ///
    /// `parent` is the node being expanded; during rollouts beyond the tree
    /// it is a detached view with zeroed statistics. Defaults to uniform
    /// over the sibling group.
    fn transition_probability(
        &self,
        _parent: NodeView<'_, Self::Observation>,
        _agent_action: &Self::Action,
        _opponent_action: &Self::Action,
        siblings: &[Sibling<'_, Self::Observation, Self::Action>],
    ) -> f64 {
        1.0 / siblings.len().max(1) as f64
    }

    /// String key of an action.
    fn key_from_action(&self, action: &Self::Action) -> ActionKey;

    /// Inverse of `key_from_action`; `None` for unknown keys.
    fn action_from_key(&self, key: &str) -> Option<Self::Action>;
}
