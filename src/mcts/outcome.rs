//! Outcome generation: expanding a node into its agent x opponent grid.
//!
//! For every legal agent action `a` and opponent reply `b` the domain
//! simulates the joint move. Each child gets:
//! - `expected_reward`: the blended value of the *parent* committing to `a`
//!   (the value model never sees `b`)
//! - `probability`: the transition model's weight for `b`, normalized over
//!   the replies to `a`
//!
//! Expansion validates everything before touching the tree, so a failed
//! expansion leaves the arena exactly as it was.

use tracing::{debug, warn};

use crate::error::{NotExpandableReason, PlannerError, Result};
use crate::mdp::{index_actions, MarkovDecisionProcess, Sibling};

use super::config::MCTSConfig;
use super::edges::{EdgeAxis, EdgeMap};
use super::node::{MCTSNode, NodeId, NodeView};
use super::tree::MCTSTree;

/// What an expansion produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Children allocated.
    pub children: usize,

    /// Agent-action groups whose transition weights had no usable mass.
    pub degenerate_groups: u32,
}

/// Simulated replies to one agent action.
#[derive(Clone, Debug)]
pub struct OutcomeGroup<O> {
    /// Resulting states, in opponent enumeration order.
    pub observations: Vec<O>,

    /// Normalized transition probabilities, same order.
    pub probabilities: Vec<f64>,

    /// The raw weights summed to zero (or were unusable) and a uniform
    /// distribution was substituted.
    pub degenerate: bool,
}

/// `(1 - γ) * value(node, action) + γ * mean observed reward of node`.
pub fn blended_value<D: MarkovDecisionProcess>(
    domain: &D,
    node: NodeView<'_, D::Observation>,
    action: &D::Action,
    discount_factor: f64,
) -> f64 {
    (1.0 - discount_factor) * domain.value(node, action) + discount_factor * node.mean_reward()
}

/// Simulate every reply to `agent_action` from `parent` and weigh the results.
pub fn outcome_group<D: MarkovDecisionProcess>(
    domain: &D,
    parent: NodeView<'_, D::Observation>,
    agent_action: &D::Action,
    opponent_actions: &[D::Action],
    expected_reward: f64,
) -> OutcomeGroup<D::Observation> {
    let observations: Vec<D::Observation> = opponent_actions
        .iter()
        .map(|reply| domain.simulate(parent.observation, agent_action, reply))
        .collect();

    let siblings: Vec<Sibling<'_, D::Observation, D::Action>> = opponent_actions
        .iter()
        .zip(&observations)
        .map(|(reply, outcome)| Sibling {
            opponent_action: reply,
            observation: outcome,
            expected_reward,
        })
        .collect();

    let raw: Vec<f64> = opponent_actions
        .iter()
        .map(|reply| domain.transition_probability(parent, agent_action, reply, &siblings))
        .collect();
    drop(siblings);

    let (probabilities, degenerate) = normalize(raw);
    OutcomeGroup {
        observations,
        probabilities,
        degenerate,
    }
}

/// Scale weights to sum to 1; uniform when there is no usable mass.
///
/// Negative and non-finite weights count as 0.
pub fn normalize(mut weights: Vec<f64>) -> (Vec<f64>, bool) {
    for w in &mut weights {
        if !w.is_finite() || *w < 0.0 {
            *w = 0.0;
        }
    }

    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        for w in &mut weights {
            *w /= total;
        }
        (weights, false)
    } else {
        let uniform = 1.0 / weights.len().max(1) as f64;
        weights.iter_mut().for_each(|w| *w = uniform);
        (weights, true)
    }
}

/// Attach an edge map to `node_id`, allocating one child per joint move.
///
/// Fails with `NotExpandable` on expanded or terminal nodes, `NoLegalAction`
/// when either side has no move, and `InvalidActionKey` when the domain's
/// key mapping is not a bijection over the legal actions.
pub fn expand<D: MarkovDecisionProcess>(
    tree: &mut MCTSTree<D::Observation, D::Action>,
    node_id: NodeId,
    domain: &D,
    config: &MCTSConfig,
) -> Result<ExpansionReport> {
    let node = tree.get(node_id);
    if node.is_expanded() {
        return Err(PlannerError::NotExpandable {
            node: node_id,
            reason: NotExpandableReason::AlreadyExpanded,
        });
    }
    if domain.is_terminal(&node.observation) {
        return Err(PlannerError::NotExpandable {
            node: node_id,
            reason: NotExpandableReason::Terminal,
        });
    }

    let agent_actions = domain.legal_agent_actions(&node.observation);
    if agent_actions.is_empty() {
        return Err(PlannerError::no_legal_action(format!(
            "{node_id} is not terminal but the agent has no legal action"
        )));
    }
    let opponent_actions = domain.legal_opponent_actions(&node.observation);
    if opponent_actions.is_empty() {
        return Err(PlannerError::no_legal_action(format!(
            "{node_id} is not terminal but the opponent has no legal action"
        )));
    }

    let (agent_keys, agent_index) = index_actions(domain, &agent_actions)?;
    let (opponent_keys, opponent_index) = index_actions(domain, &opponent_actions)?;

    let depth = node.depth.saturating_add(1);
    let mut pending = Vec::with_capacity(agent_actions.len() * opponent_actions.len());
    let mut report = ExpansionReport::default();

    for (agent_action, key) in agent_actions.iter().zip(&agent_keys) {
        let expected = blended_value(domain, node.view(), agent_action, config.discount_factor);
        let group = outcome_group(domain, node.view(), agent_action, &opponent_actions, expected);
        if group.degenerate {
            warn!(node = %node_id, action = %key, "degenerate probability mass, using uniform replies");
            report.degenerate_groups += 1;
        }

        pending.extend(
            group
                .observations
                .into_iter()
                .zip(group.probabilities)
                .map(|(observation, p)| MCTSNode::outcome(observation, depth, expected, p)),
        );
    }

    // Nothing below can fail: the tree is only touched from here on.
    report.children = pending.len();
    let children: Vec<NodeId> = pending.into_iter().map(|child| tree.alloc(child)).collect();
    let edges = EdgeMap::new(
        EdgeAxis::new(agent_actions, agent_keys, agent_index),
        EdgeAxis::new(opponent_actions, opponent_keys, opponent_index),
        children,
    );
    tree.get_mut(node_id).edges = Some(edges);

    debug!(node = %node_id, children = report.children, "expanded node");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rps::{RockPaperScissors, RpsAction, RpsObservation};

    fn rps_tree(turn: u32, agent: u32, opponent: u32) -> MCTSTree<RpsObservation, RpsAction> {
        MCTSTree::new(RpsObservation::new(turn, agent, opponent))
    }

    #[test]
    fn test_normalize() {
        let (p, degenerate) = normalize(vec![2.0, 1.0, 1.0]);
        assert!(!degenerate);
        assert_eq!(p, vec![0.5, 0.25, 0.25]);

        let (p, degenerate) = normalize(vec![0.0, 0.0]);
        assert!(degenerate);
        assert_eq!(p, vec![0.5, 0.5]);

        let (p, degenerate) = normalize(vec![-1.0, f64::NAN, 4.0]);
        assert!(!degenerate);
        assert_eq!(p, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_expand_builds_full_grid() {
        let game = RockPaperScissors::default();
        let mut tree = rps_tree(0, 0, 0);
        let root = tree.root();

        let report = expand(&mut tree, root, &game, &MCTSConfig::default()).unwrap();

        assert_eq!(report.children, 9);
        assert_eq!(report.degenerate_groups, 0);
        assert_eq!(tree.len(), 10);

        let edges = tree.get(root).edges.as_ref().unwrap();
        let keys: Vec<_> = edges.agent_axis().keys().iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["rock", "paper", "scissors"]);

        for (_, outcomes) in edges.groups() {
            assert_eq!(outcomes.len(), 3);
            let mass: f64 = outcomes.iter().map(|&c| tree.get(c).probability).sum();
            assert!((mass - 1.0).abs() < 1e-9);
            for &child in outcomes {
                assert_eq!(tree.get(child).depth, 1);
                assert_eq!(tree.get(child).observation.turn, 1);
            }
        }

        // paper vs rock is a won round for the agent
        let paper = edges.agent_id("paper").unwrap();
        let rock = edges.opponent_id("rock").unwrap();
        let child = tree.get(edges.outcome(paper, rock));
        assert_eq!(child.observation.score.agent, 1);
        assert!((child.probability - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_expand_twice_fails_without_mutation() {
        let game = RockPaperScissors::default();
        let mut tree = rps_tree(0, 0, 0);
        let root = tree.root();
        expand(&mut tree, root, &game, &MCTSConfig::default()).unwrap();

        let before = tree.len();
        let err = expand(&mut tree, root, &game, &MCTSConfig::default()).unwrap_err();

        assert_eq!(
            err,
            PlannerError::NotExpandable {
                node: root,
                reason: NotExpandableReason::AlreadyExpanded
            }
        );
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn test_expand_terminal_fails_without_mutation() {
        let game = RockPaperScissors::default();
        let mut tree = rps_tree(5, 3, 2);
        let root = tree.root();

        let err = expand(&mut tree, root, &game, &MCTSConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            PlannerError::NotExpandable {
                reason: NotExpandableReason::Terminal,
                ..
            }
        ));
        assert_eq!(tree.len(), 1);
        assert!(!tree.root_node().is_expanded());
    }

    #[test]
    fn test_zero_mass_falls_back_to_uniform() {
        let game = RockPaperScissors::builder()
            .opponent_distribution([0.0, 0.0, 0.0])
            .build();
        let mut tree = rps_tree(0, 0, 0);
        let root = tree.root();

        let report = expand(&mut tree, root, &game, &MCTSConfig::default()).unwrap();

        assert_eq!(report.degenerate_groups, 3);
        for &child in tree.get(root).edges.as_ref().unwrap().children() {
            assert!((tree.get(child).probability - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    /// Opponent reply 0 gains weight with every visit of the parent.
    struct VisitTilted;

    impl MarkovDecisionProcess for VisitTilted {
        type Observation = u32;
        type Action = u8;

        fn legal_agent_actions(&self, _: &u32) -> Vec<u8> {
            vec![0]
        }
        fn legal_opponent_actions(&self, _: &u32) -> Vec<u8> {
            vec![0, 1]
        }
        fn simulate(&self, turn: &u32, _: &u8, reply: &u8) -> u32 {
            turn + 1 + u32::from(*reply)
        }
        fn reward(&self, _: &u32) -> f64 {
            0.0
        }
        fn is_terminal(&self, turn: &u32) -> bool {
            *turn >= 10
        }
        fn value(&self, _: NodeView<'_, u32>, _: &u8) -> f64 {
            0.0
        }
        fn transition_probability(
            &self,
            parent: NodeView<'_, u32>,
            _agent_action: &u8,
            opponent_action: &u8,
            _siblings: &[Sibling<'_, u32, u8>],
        ) -> f64 {
            if *opponent_action == 0 {
                1.0 + f64::from(parent.visited)
            } else {
                1.0
            }
        }
        fn key_from_action(&self, action: &u8) -> crate::core::ActionKey {
            crate::core::ActionKey::from(action.to_string())
        }
        fn action_from_key(&self, key: &str) -> Option<u8> {
            key.parse().ok()
        }
    }

    #[test]
    fn test_transition_model_sees_parent_statistics() {
        let mut tree: MCTSTree<u32, u8> = MCTSTree::new(0);
        let root = tree.root();
        tree.get_mut(root).visited = 3;

        expand(&mut tree, root, &VisitTilted, &MCTSConfig::default()).unwrap();

        let children = tree.get(root).edges.as_ref().unwrap().children().to_vec();
        assert!((tree.get(children[0]).probability - 0.8).abs() < 1e-12);
        assert!((tree.get(children[1]).probability - 0.2).abs() < 1e-12);

        // Off-tree states get a detached, unvisited parent
        let group = outcome_group(&VisitTilted, NodeView::detached(&5), &0, &[0, 1], 0.0);
        assert_eq!(group.observations, vec![6, 7]);
        assert_eq!(group.probabilities, vec![0.5, 0.5]);
    }

    #[test]
    fn test_children_share_parent_value() {
        let game = RockPaperScissors::default();
        let mut tree = rps_tree(0, 0, 0);
        let root = tree.root();
        let config = MCTSConfig::default();
        expand(&mut tree, root, &game, &config).unwrap();

        let edges = tree.get(root).edges.as_ref().unwrap();
        let rock = edges.agent_id("rock").unwrap();
        let expected = blended_value(&game, tree.root_node().view(), &RpsAction::Rock, config.discount_factor);
        for &child in edges.outcomes_for_agent(rock) {
            assert_eq!(tree.get(child).expected_reward, expected);
        }
    }
}
