//! Core MCTS search algorithm.
//!
//! One `plan` call is one iteration:
//! 1. Selection: descend expanded nodes, choosing the agent action with the
//!    selection policy and the opponent reply by weighted sampling
//! 2. Expansion: attach the outcome grid to the leaf reached
//! 3. Simulation: roll out to a terminal state and read its reward
//! 4. Backpropagation: credit the reward to every node on the selection path
//!
//! Everything runs in explicit loops; no phase recurses, so horizon length
//! only costs time and the path vector.

use std::time::{Duration, Instant};

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::{AgentActionId, PlannerRng};
use crate::error::{PlannerError, Result};
use crate::mdp::MarkovDecisionProcess;

use super::config::MCTSConfig;
use super::edges::EdgeMap;
use super::node::{MCTSNode, NodeId, NodeView};
use super::outcome::{expand, outcome_group};
use super::policy::{RolloutPolicy, SelectionPolicy, UniformRollout, UCB};
use super::sampling::pick_weighted;
use super::stats::SearchStats;
use super::tree::MCTSTree;

/// Main MCTS search context.
///
/// Generic over the domain. Owns the search tree, configuration and RNG,
/// and exposes `plan` / `decide` plus budgeted wrappers.
pub struct MCTSSearch<D: MarkovDecisionProcess> {
    /// The domain being planned in.
    domain: D,

    /// Search configuration.
    config: MCTSConfig,

    /// The search tree.
    tree: MCTSTree<D::Observation, D::Action>,

    /// RNG for outcome sampling and rollouts.
    rng: PlannerRng,

    /// Selection policy.
    selection: Box<dyn SelectionPolicy<D>>,

    /// Rollout policy.
    rollout: Box<dyn RolloutPolicy<D::Observation, D::Action>>,

    /// Search statistics.
    stats: SearchStats,
}

impl<D: MarkovDecisionProcess> MCTSSearch<D> {
    /// Create a search rooted at `observation`.
    pub fn new(domain: D, config: MCTSConfig, observation: D::Observation) -> Self {
        let rng = config.seed.map_or_else(PlannerRng::from_entropy, PlannerRng::new);
        let tree = MCTSTree::with_capacity(observation, config.max_nodes.min(4096));

        Self {
            domain,
            config,
            tree,
            rng,
            selection: Box::new(UCB),
            rollout: Box::new(UniformRollout),
            stats: SearchStats::default(),
        }
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy<D> + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Set a custom rollout policy.
    pub fn with_rollout<R: RolloutPolicy<D::Observation, D::Action> + 'static>(mut self, rollout: R) -> Self {
        self.rollout = Box::new(rollout);
        self
    }

    /// Drive the search from `rng`, e.g. one restored with
    /// `PlannerRng::from_state` to resume a checkpointed run.
    pub fn with_rng(mut self, rng: PlannerRng) -> Self {
        self.rng = rng;
        self
    }

    /// Discard the tree and start over from `observation`.
    pub fn set_root(&mut self, observation: D::Observation) {
        self.tree = MCTSTree::with_capacity(observation, self.config.max_nodes.min(4096));
    }

    /// Run one full iteration from the root and return the reward obtained.
    ///
    /// A freshly expanded leaf takes its first step into one of its new
    /// children before the rollout, so the iteration that expands the root
    /// already credits one root outcome. A failed iteration backpropagates
    /// nothing, so node statistics are left as they were.
    pub fn plan(&mut self) -> Result<f64> {
        let mut path = self.select()?;
        let mut leaf = path[path.len() - 1];

        // === EXPANSION ===
        let leaf_node = self.tree.get(leaf);
        if !leaf_node.is_expanded() && !self.domain.is_terminal(&leaf_node.observation) {
            if self.tree.len() < self.config.max_nodes {
                let report = expand(&mut self.tree, leaf, &self.domain, &self.config)?;
                self.stats.nodes_expanded += 1;
                self.stats.degenerate_groups += report.degenerate_groups;

                if let Some(child) = self.rollout_step(leaf)? {
                    path.push(child);
                    leaf = child;
                    let depth = (path.len() - 1).min(u16::MAX as usize) as u16;
                    self.stats.max_depth = self.stats.max_depth.max(depth);
                }
            } else {
                trace!(node = %leaf, "node budget reached, simulating without expansion");
            }
        }

        // === SIMULATION ===
        let reward = self.simulate(leaf)?;
        self.stats.simulations += 1;

        // === BACKPROPAGATION ===
        self.backpropagate(&path, reward);
        self.stats.iterations += 1;

        trace!(depth = path.len() - 1, reward, "plan iteration");
        Ok(reward)
    }

    /// Most-visited agent action at the root.
    ///
    /// Visits are summed over each action's outcomes; ties keep the first
    /// action in edge order. Read-only.
    pub fn decide(&self) -> Result<D::Action> {
        let id = self.best_root_action()?;
        let edges = self.root_edges()?;
        Ok(edges.agent_action(id).clone())
    }

    /// Run `iterations` plans, then decide.
    ///
    /// Stops early once the tree reaches `config.max_nodes`.
    pub fn search(&mut self, iterations: u32) -> Result<D::Action> {
        self.ensure_root_playable()?;
        let start = Instant::now();

        for _ in 0..iterations {
            self.plan()?;
            if self.budget_exhausted() {
                break;
            }
        }

        self.finish(start)
    }

    /// Plan until `budget` has elapsed, then decide.
    ///
    /// The deadline is only checked between iterations.
    pub fn search_for(&mut self, budget: Duration) -> Result<D::Action> {
        self.ensure_root_playable()?;
        let start = Instant::now();
        let deadline = start + budget;

        while Instant::now() < deadline {
            self.plan()?;
            if self.budget_exhausted() {
                break;
            }
        }

        self.finish(start)
    }

    /// Visit totals per root agent action, in edge order.
    pub fn action_visits(&self) -> Vec<(D::Action, u32)> {
        let Some(edges) = self.tree.root_node().edges.as_ref() else {
            return Vec::new();
        };
        edges
            .groups()
            .map(|(id, outcomes)| {
                let visits = outcomes.iter().map(|&c| self.tree.get(c).visited).sum();
                (edges.agent_action(id).clone(), visits)
            })
            .collect()
    }

    /// Visit shares per root agent action; sums to ~1.0.
    ///
    /// Uniform before any visit has been recorded.
    pub fn action_probabilities(&self) -> Vec<(D::Action, f64)> {
        let visits = self.action_visits();
        let total: u32 = visits.iter().map(|(_, v)| v).sum();

        if total == 0 {
            let uniform = 1.0 / visits.len().max(1) as f64;
            return visits.into_iter().map(|(a, _)| (a, uniform)).collect();
        }

        visits
            .into_iter()
            .map(|(a, v)| (a, v as f64 / total as f64))
            .collect()
    }

    /// Get search statistics.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the search tree.
    #[must_use]
    pub fn tree(&self) -> &MCTSTree<D::Observation, D::Action> {
        &self.tree
    }

    /// The current root node.
    #[must_use]
    pub fn root_node(&self) -> &MCTSNode<D::Observation, D::Action> {
        self.tree.root_node()
    }

    /// Get the domain reference.
    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Get the configuration.
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    /// Get the RNG. `rng().state()` is the checkpoint `with_rng` resumes from.
    pub fn rng(&self) -> &PlannerRng {
        &self.rng
    }

    /// Descend from the root; returns the path, root first.
    fn select(&mut self) -> Result<Vec<NodeId>> {
        let mut current = self.tree.root();
        let mut path = vec![current];

        loop {
            let node = self.tree.get(current);
            let Some(edges) = node.edges.as_ref() else {
                break;
            };
            if self.domain.is_terminal(&node.observation) {
                break;
            }

            let action = self
                .selection
                .select(&self.tree, current, &self.domain, &self.config)
                .ok_or_else(|| PlannerError::no_legal_action(format!("selection found no action at {current}")))?;
            let outcomes = edges.outcomes_for_agent(action);
            current = sample_child(&self.tree, outcomes, &mut self.rng, &mut self.stats)
                .ok_or_else(|| PlannerError::no_legal_action(format!("{current} has no outcomes for {action}")))?;
            path.push(current);
        }

        let depth = (path.len() - 1).min(u16::MAX as usize) as u16;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        Ok(path)
    }

    /// Roll out from `start` to a terminal state and return its reward.
    ///
    /// Follows the tree's edges while they exist, then continues on
    /// transient outcome groups that are never added to the arena.
    /// Node statistics are not touched.
    fn simulate(&mut self, start: NodeId) -> Result<f64> {
        let max_depth = self.config.max_rollout_depth;
        let mut steps: u32 = 0;
        let mut current = start;

        // In-tree part of the rollout.
        loop {
            let node = self.tree.get(current);
            if self.domain.is_terminal(&node.observation) {
                self.stats.rollout_steps += u64::from(steps);
                return Ok(self.domain.reward(&node.observation));
            }
            if max_depth > 0 && steps >= max_depth {
                self.stats.rollout_steps += u64::from(steps);
                return Ok(self.domain.reward(&node.observation));
            }
            match self.rollout_step(current)? {
                Some(child) => current = child,
                None => break,
            }
            steps += 1;
        }

        // Off-tree part: transient states only.
        let mut observation = self.tree.get(current).observation.clone();
        loop {
            if self.domain.is_terminal(&observation) {
                break;
            }
            if max_depth > 0 && steps >= max_depth {
                break;
            }

            let agent_actions = self.domain.legal_agent_actions(&observation);
            let choice = self
                .rollout
                .choose(&observation, &agent_actions, &mut self.rng)
                .ok_or_else(|| PlannerError::no_legal_action("rollout reached a non-terminal state without agent actions"))?;
            let opponent_actions = self.domain.legal_opponent_actions(&observation);
            if opponent_actions.is_empty() {
                return Err(PlannerError::no_legal_action(
                    "rollout reached a non-terminal state without opponent actions",
                ));
            }

            let mut group = outcome_group(
                &self.domain,
                NodeView::detached(&observation),
                &agent_actions[choice],
                &opponent_actions,
                0.0,
            );
            if group.degenerate {
                self.stats.degenerate_groups += 1;
            }
            let pick = pick_weighted(&group.probabilities, &mut self.rng)
                .ok_or_else(|| PlannerError::no_legal_action("rollout produced an empty outcome group"))?;
            observation = group.observations.swap_remove(pick.index);
            steps += 1;
        }

        self.stats.rollout_steps += u64::from(steps);
        Ok(self.domain.reward(&observation))
    }

    /// Pick a rollout action at an expanded node and sample one of its
    /// outcomes. `None` when the node has no edges.
    fn rollout_step(&mut self, node: NodeId) -> Result<Option<NodeId>> {
        let parent = self.tree.get(node);
        let Some(edges) = parent.edges.as_ref() else {
            return Ok(None);
        };

        let choice = self
            .rollout
            .choose(&parent.observation, edges.agent_axis().actions(), &mut self.rng)
            .ok_or_else(|| PlannerError::no_legal_action(format!("rollout found no action at {node}")))?;
        let outcomes = edges.outcomes_for_agent(AgentActionId(choice as u16));
        let child = sample_child(&self.tree, outcomes, &mut self.rng, &mut self.stats)
            .ok_or_else(|| PlannerError::no_legal_action(format!("{node} has no outcomes")))?;
        Ok(Some(child))
    }

    /// Credit `reward` to every node on `path`.
    fn backpropagate(&mut self, path: &[NodeId], reward: f64) {
        for &id in path.iter().rev() {
            let node = self.tree.get_mut(id);
            node.win += reward;
            node.visited += 1;
        }
    }

    fn root_edges(&self) -> Result<&EdgeMap<D::Action>> {
        self.tree
            .root_node()
            .edges
            .as_ref()
            .ok_or_else(|| PlannerError::no_legal_action("root has not been expanded; call plan first"))
    }

    fn best_root_action(&self) -> Result<AgentActionId> {
        let edges = self.root_edges()?;

        let mut best: Option<(AgentActionId, u64)> = None;
        for (id, outcomes) in edges.groups() {
            let visits: u64 = outcomes.iter().map(|&c| u64::from(self.tree.get(c).visited)).sum();
            match best {
                Some((_, most)) if visits <= most => {}
                _ => best = Some((id, visits)),
            }
        }

        best.map(|(id, _)| id)
            .ok_or_else(|| PlannerError::no_legal_action("root has no agent actions"))
    }

    fn ensure_root_playable(&self) -> Result<()> {
        if self.domain.is_terminal(&self.tree.root_node().observation) {
            return Err(PlannerError::no_legal_action("root state is terminal"));
        }
        Ok(())
    }

    fn budget_exhausted(&self) -> bool {
        let full = self.tree.len() >= self.config.max_nodes;
        if full {
            debug!(nodes = self.tree.len(), "node budget reached");
        }
        full
    }

    fn finish(&mut self, start: Instant) -> Result<D::Action> {
        self.stats.time_us += start.elapsed().as_micros() as u64;
        debug!(
            iterations = self.stats.iterations,
            nodes = self.tree.len(),
            max_depth = self.stats.max_depth,
            time_us = self.stats.time_us,
            per_second = self.stats.throughput(),
            "search finished"
        );
        self.decide()
    }
}

impl<D> MCTSSearch<D>
where
    D: MarkovDecisionProcess,
    D::Observation: PartialEq,
{
    /// Move the root to the state the environment actually reached.
    ///
    /// Reuses the subtree of the first root outcome whose observation equals
    /// `observation`; otherwise starts a fresh tree. Returns whether a
    /// subtree was reused.
    pub fn advance(&mut self, observation: D::Observation) -> bool {
        let reached = self.tree.root_node().edges.as_ref().and_then(|edges| {
            edges
                .children()
                .iter()
                .copied()
                .find(|&child| self.tree.get(child).observation == observation)
        });

        match reached {
            Some(child) => {
                let placeholder = MCTSTree::with_capacity(observation, 1);
                let tree = std::mem::replace(&mut self.tree, placeholder);
                self.tree = tree.into_subtree(child);
                debug!(nodes = self.tree.len(), "re-rooted on reached outcome");
                true
            }
            None => {
                self.set_root(observation);
                false
            }
        }
    }
}

/// Sample one of `outcomes` by their transition probabilities.
fn sample_child<O, A>(
    tree: &MCTSTree<O, A>,
    outcomes: &[NodeId],
    rng: &mut PlannerRng,
    stats: &mut SearchStats,
) -> Option<NodeId> {
    let weights: SmallVec<[f64; 8]> = outcomes.iter().map(|&c| tree.get(c).probability).collect();
    let pick = pick_weighted(&weights, rng)?;
    if pick.degenerate {
        stats.degenerate_samples += 1;
        warn!(outcomes = outcomes.len(), "degenerate probability mass, taking first outcome");
    }
    Some(outcomes[pick.index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rps::{RockPaperScissors, RpsAction, RpsObservation};

    fn search_from(observation: RpsObservation, seed: u64) -> MCTSSearch<RockPaperScissors> {
        MCTSSearch::new(
            RockPaperScissors::default(),
            MCTSConfig::default().with_seed(seed),
            observation,
        )
    }

    #[test]
    fn test_decide_before_plan_fails() {
        let search = search_from(RpsObservation::default(), 1);
        assert!(matches!(search.decide(), Err(PlannerError::NoLegalAction { .. })));
    }

    #[test]
    fn test_first_plan_expands_root() {
        let mut search = search_from(RpsObservation::default(), 1);

        let reward = search.plan().unwrap();

        assert!((0.0..=1.0).contains(&reward));
        assert!(search.root_node().is_expanded());
        assert_eq!(search.tree().len(), 10);
        assert_eq!(search.root_node().visited, 1);
        assert_eq!(search.root_node().win, reward);
        assert_eq!(search.stats().iterations, 1);
        assert_eq!(search.stats().nodes_expanded, 1);

        // The fresh root already credits one of its outcomes
        let visits: u32 = search.action_visits().iter().map(|(_, v)| v).sum();
        assert_eq!(visits, 1);
        assert_eq!(search.stats().max_depth, 1);
    }

    #[test]
    fn test_root_children_visits_match_iterations() {
        let mut search = search_from(RpsObservation::default(), 7);

        for _ in 0..250 {
            search.plan().unwrap();
        }

        let children = search.root_node().edges.as_ref().unwrap().children().to_vec();
        let visits: u32 = children.iter().map(|&c| search.tree().get(c).visited).sum();
        assert_eq!(visits, 250);
        assert_eq!(search.root_node().visited, 250);
    }

    #[test]
    fn test_ancestors_aggregate_descendant_rewards() {
        let mut search = search_from(RpsObservation::default(), 11);
        for _ in 0..100 {
            search.plan().unwrap();
        }

        // Every pass through an expanded node continues into exactly one child.
        for (_, node) in search.tree().iter() {
            if let Some(edges) = node.edges.as_ref() {
                let below: u32 = edges.children().iter().map(|&c| search.tree().get(c).visited).sum();
                let win_below: f64 = edges.children().iter().map(|&c| search.tree().get(c).win).sum();
                assert_eq!(node.visited, below);
                assert!((node.win - win_below).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_terminal_root() {
        let mut search = search_from(RpsObservation::new(5, 3, 2), 1);

        assert_eq!(search.plan().unwrap(), 1.0);
        assert!(!search.root_node().is_expanded());
        assert_eq!(search.root_node().visited, 1);
        assert!(matches!(search.search(10), Err(PlannerError::NoLegalAction { .. })));
    }

    #[test]
    fn test_simulation_from_last_turn_reaches_terminal() {
        let mut search = search_from(RpsObservation::new(4, 2, 2), 3);
        let root = search.tree().root();
        expand(&mut search.tree, root, &search.domain, &search.config).unwrap();

        for _ in 0..20 {
            let before: Vec<_> = search.tree().iter().map(|(_, n)| (n.visited, n.win)).collect();
            let reward = search.simulate(root).unwrap();
            assert!(reward == 0.0 || reward == 0.5 || reward == 1.0);

            // Simulation is a pure forward sample
            let after: Vec<_> = search.tree().iter().map(|(_, n)| (n.visited, n.win)).collect();
            assert_eq!(before, after);
        }
        assert_eq!(search.stats().rollout_steps, 20);
    }

    #[test]
    fn test_rollout_depth_cap() {
        let mut search = MCTSSearch::new(
            RockPaperScissors::builder().turn_limit(1_000).build(),
            MCTSConfig::default().with_seed(5).with_max_rollout_depth(3),
            RpsObservation::default(),
        );

        search.plan().unwrap();
        assert_eq!(search.stats().rollout_steps, 3);
    }

    #[test]
    fn test_node_budget_stops_growth() {
        let mut search = MCTSSearch::new(
            RockPaperScissors::default(),
            MCTSConfig::default().with_seed(5).with_max_nodes(10),
            RpsObservation::default(),
        );

        for _ in 0..50 {
            search.plan().unwrap();
        }
        assert_eq!(search.tree().len(), 10);
        assert_eq!(search.stats().iterations, 50);
    }

    #[test]
    fn test_search_stops_at_node_budget() {
        let mut search = MCTSSearch::new(
            RockPaperScissors::default(),
            MCTSConfig::default().with_seed(5).with_max_nodes(19),
            RpsObservation::default(),
        );

        search.search(1_000).unwrap();

        assert!(search.tree().len() >= 19);
        assert!(search.stats().iterations < 1_000);
    }

    #[test]
    fn test_resume_from_rng_checkpoint() {
        let mut original = search_from(RpsObservation::default(), 99);
        original.search(150).unwrap();

        // Next turn: fresh tree, same random stream
        let checkpoint = original.rng().state();
        let next_turn = RpsObservation::new(1, 1, 0);
        original.set_root(next_turn);
        let expected: Vec<f64> = (0..200).map(|_| original.plan().unwrap()).collect();

        let mut resumed = search_from(next_turn, 12345).with_rng(PlannerRng::from_state(&checkpoint));
        let actual: Vec<f64> = (0..200).map(|_| resumed.plan().unwrap()).collect();

        assert_eq!(expected, actual);
        assert_eq!(original.action_visits(), resumed.action_visits());
        assert_eq!(original.rng().state(), resumed.rng().state());
    }

    #[test]
    fn test_same_seed_same_search() {
        let mut a = search_from(RpsObservation::default(), 12345);
        let mut b = search_from(RpsObservation::default(), 12345);

        let rewards_a: Vec<f64> = (0..200).map(|_| a.plan().unwrap()).collect();
        let rewards_b: Vec<f64> = (0..200).map(|_| b.plan().unwrap()).collect();

        assert_eq!(rewards_a, rewards_b);
        assert_eq!(a.decide().unwrap(), b.decide().unwrap());
        assert_eq!(a.tree().len(), b.tree().len());
    }

    #[test]
    fn test_action_probabilities() {
        let mut search = search_from(RpsObservation::default(), 9);
        search.search(100).unwrap();

        let probs = search.action_probabilities();
        assert_eq!(probs.len(), 3);
        let sum: f64 = probs.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_advance_reuses_subtree() {
        let mut search = search_from(RpsObservation::default(), 21);
        search.search(300).unwrap();

        let reached = RockPaperScissors::default().step(&RpsObservation::default(), RpsAction::Paper, RpsAction::Rock);
        // Several joint moves lead to the same score; the first one in edge order is reused.
        let old_visits = {
            let edges = search.root_node().edges.as_ref().unwrap();
            let child = edges
                .children()
                .iter()
                .copied()
                .find(|&c| search.tree().get(c).observation == reached)
                .unwrap();
            search.tree().get(child).visited
        };

        assert!(search.advance(reached));
        assert_eq!(search.root_node().observation, reached);
        assert_eq!(search.root_node().visited, old_visits);
        assert_eq!(search.root_node().depth, 0);
    }

    #[test]
    fn test_advance_unknown_state_starts_over() {
        let mut search = search_from(RpsObservation::default(), 21);
        search.search(50).unwrap();

        assert!(!search.advance(RpsObservation::new(3, 0, 3)));
        assert_eq!(search.tree().len(), 1);
        assert!(!search.root_node().is_expanded());
    }
}
