//! MCTS policies for selection and rollouts.
//!
//! Policies are trait-based to allow customization:
//! - `SelectionPolicy`: Which agent action to descend at an expanded node
//! - `RolloutPolicy`: Which agent action to play during simulation

use crate::core::{AgentActionId, PlannerRng};
use crate::mdp::MarkovDecisionProcess;

use super::config::MCTSConfig;
use super::node::{NodeId, NodeView};
use super::outcome::blended_value;
use super::tree::MCTSTree;

// =============================================================================
// Selection Policy
// =============================================================================

/// Policy for choosing the agent action to descend at an expanded node.
pub trait SelectionPolicy<D: MarkovDecisionProcess>: Send + Sync {
    /// Pick an agent action at `node`.
    ///
    /// Returns `None` when the node has no edges.
    fn select(
        &self,
        tree: &MCTSTree<D::Observation, D::Action>,
        node: NodeId,
        domain: &D,
        config: &MCTSConfig,
    ) -> Option<AgentActionId>;
}

/// Upper Confidence Bound selection over outcome groups.
///
/// Each outcome `o` of agent action `a` scores
/// `exploitation(o, a) + exploration(o)`, where
/// - exploitation = `o.win * blended_value(o, a) / max(o.visited, 1)`
/// - exploration = the domain's policy model, or the UCB1 bonus
///   `c * sqrt(ln(max(N, 1)) / (1 + o.visited))` with `N` the parent's visits
///
/// The agent action with the largest summed group score wins; ties keep the
/// first action in edge order.
#[derive(Clone, Debug, Default)]
pub struct UCB;

impl UCB {
    /// Win-weighted value estimate of an outcome.
    pub fn exploitation<D: MarkovDecisionProcess>(
        domain: &D,
        outcome: NodeView<'_, D::Observation>,
        action: &D::Action,
        config: &MCTSConfig,
    ) -> f64 {
        let value = blended_value(domain, outcome, action, config.discount_factor);
        outcome.win * value / outcome.visited.max(1) as f64
    }

    /// Exploration bonus of an outcome under a parent visited `parent_visits` times.
    pub fn exploration<D: MarkovDecisionProcess>(
        domain: &D,
        parent_visits: u32,
        outcome: NodeView<'_, D::Observation>,
        config: &MCTSConfig,
    ) -> f64 {
        domain.policy(outcome).unwrap_or_else(|| {
            let ln_parent = (parent_visits.max(1) as f64).ln();
            config.exploration_constant * (ln_parent / (1.0 + outcome.visited as f64)).sqrt()
        })
    }

    /// Full UCB score of one outcome.
    pub fn score<D: MarkovDecisionProcess>(
        domain: &D,
        parent_visits: u32,
        outcome: NodeView<'_, D::Observation>,
        action: &D::Action,
        config: &MCTSConfig,
    ) -> f64 {
        Self::exploitation(domain, outcome, action, config)
            + Self::exploration(domain, parent_visits, outcome, config)
    }
}

impl<D: MarkovDecisionProcess> SelectionPolicy<D> for UCB {
    fn select(
        &self,
        tree: &MCTSTree<D::Observation, D::Action>,
        node: NodeId,
        domain: &D,
        config: &MCTSConfig,
    ) -> Option<AgentActionId> {
        let parent = tree.get(node);
        let edges = parent.edges.as_ref()?;

        let mut best: Option<(AgentActionId, f64)> = None;
        for (id, outcomes) in edges.groups() {
            let action = edges.agent_action(id);
            let total: f64 = outcomes
                .iter()
                .map(|&child| Self::score(domain, parent.visited, tree.get(child).view(), action, config))
                .sum();

            match best {
                Some((_, score)) if total <= score => {}
                _ => best = Some((id, total)),
            }
        }

        best.map(|(id, _)| id)
    }
}

// =============================================================================
// Rollout Policy
// =============================================================================

/// Policy for picking agent actions during simulation.
pub trait RolloutPolicy<O, A>: Send + Sync {
    /// Choose one of `candidates` (by position) at `observation`.
    ///
    /// Returns `None` if `candidates` is empty.
    fn choose(&self, observation: &O, candidates: &[A], rng: &mut PlannerRng) -> Option<usize>;
}

/// Uniform random rollout policy.
#[derive(Clone, Debug, Default)]
pub struct UniformRollout;

impl<O, A> RolloutPolicy<O, A> for UniformRollout {
    fn choose(&self, _observation: &O, candidates: &[A], rng: &mut PlannerRng) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(rng.gen_range_usize(0..candidates.len()))
        }
    }
}
