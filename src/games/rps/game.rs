//! Rock/paper/scissors domain implementation.

use serde::{Deserialize, Serialize};

use crate::core::ActionKey;
use crate::mcts::NodeView;
use crate::mdp::{MarkovDecisionProcess, Sibling};

/// A move of either side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpsAction {
    Rock,
    Paper,
    Scissors,
}

impl RpsAction {
    /// All moves, in enumeration order.
    pub const ALL: [RpsAction; 3] = [RpsAction::Rock, RpsAction::Paper, RpsAction::Scissors];

    /// Position in `ALL`.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            RpsAction::Rock => 0,
            RpsAction::Paper => 1,
            RpsAction::Scissors => 2,
        }
    }

    /// Lowercase name, used as the action key.
    pub const fn name(self) -> &'static str {
        match self {
            RpsAction::Rock => "rock",
            RpsAction::Paper => "paper",
            RpsAction::Scissors => "scissors",
        }
    }

    /// Does `self` win against `other`?
    pub const fn beats(self, other: RpsAction) -> bool {
        matches!(
            (self, other),
            (RpsAction::Rock, RpsAction::Scissors)
                | (RpsAction::Paper, RpsAction::Rock)
                | (RpsAction::Scissors, RpsAction::Paper)
        )
    }
}

/// Rounds won by each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub agent: u32,
    pub opponent: u32,
}

/// Observable state: turns played and the running score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RpsObservation {
    /// Turns played so far.
    pub turn: u32,
    pub score: Score,
}

impl RpsObservation {
    pub fn new(turn: u32, agent: u32, opponent: u32) -> Self {
        Self {
            turn,
            score: Score { agent, opponent },
        }
    }
}

/// The rock/paper/scissors decision process.
#[derive(Clone, Debug)]
pub struct RockPaperScissors {
    turn_limit: u32,
    /// Opponent move weights, indexed by `RpsAction::index`.
    opponent_distribution: [f64; 3],
}

impl Default for RockPaperScissors {
    fn default() -> Self {
        RockPaperScissorsBuilder::default().build()
    }
}

/// Builder for creating a RockPaperScissors domain.
#[derive(Clone, Debug)]
pub struct RockPaperScissorsBuilder {
    turn_limit: u32,
    opponent_distribution: [f64; 3],
}

impl Default for RockPaperScissorsBuilder {
    fn default() -> Self {
        Self {
            turn_limit: 5,
            opponent_distribution: [0.8, 0.1, 0.1],
        }
    }
}

impl RockPaperScissorsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_limit(mut self, turns: u32) -> Self {
        self.turn_limit = turns;
        self
    }

    /// Opponent weights for rock, paper and scissors. Need not sum to 1.
    pub fn opponent_distribution(mut self, weights: [f64; 3]) -> Self {
        self.opponent_distribution = weights;
        self
    }

    pub fn build(self) -> RockPaperScissors {
        RockPaperScissors {
            turn_limit: self.turn_limit,
            opponent_distribution: self.opponent_distribution,
        }
    }
}

impl RockPaperScissors {
    pub fn builder() -> RockPaperScissorsBuilder {
        RockPaperScissorsBuilder::new()
    }

    pub fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    pub fn opponent_distribution(&self) -> [f64; 3] {
        self.opponent_distribution
    }

    /// Play one round.
    pub fn step(&self, observation: &RpsObservation, agent: RpsAction, opponent: RpsAction) -> RpsObservation {
        let mut next = *observation;
        next.turn += 1;
        if agent.beats(opponent) {
            next.score.agent += 1;
        } else if opponent.beats(agent) {
            next.score.opponent += 1;
        }
        next
    }

    fn moves(&self, observation: &RpsObservation) -> Vec<RpsAction> {
        if self.is_terminal(observation) {
            Vec::new()
        } else {
            RpsAction::ALL.to_vec()
        }
    }
}

impl MarkovDecisionProcess for RockPaperScissors {
    type Observation = RpsObservation;
    type Action = RpsAction;

    fn legal_agent_actions(&self, observation: &RpsObservation) -> Vec<RpsAction> {
        self.moves(observation)
    }

    fn legal_opponent_actions(&self, observation: &RpsObservation) -> Vec<RpsAction> {
        self.moves(observation)
    }

    fn simulate(&self, observation: &RpsObservation, agent_action: &RpsAction, opponent_action: &RpsAction) -> RpsObservation {
        self.step(observation, *agent_action, *opponent_action)
    }

    fn reward(&self, observation: &RpsObservation) -> f64 {
        let Score { agent, opponent } = observation.score;
        match agent.cmp(&opponent) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Equal => 0.5,
            std::cmp::Ordering::Less => 0.0,
        }
    }

    fn is_terminal(&self, observation: &RpsObservation) -> bool {
        observation.turn >= self.turn_limit
    }

    /// Likelihood of reaching the node times the standing it records.
    fn value(&self, node: NodeView<'_, RpsObservation>, _action: &RpsAction) -> f64 {
        node.probability * self.reward(node.observation)
    }

    fn transition_probability(
        &self,
        _parent: NodeView<'_, RpsObservation>,
        _agent_action: &RpsAction,
        opponent_action: &RpsAction,
        _siblings: &[Sibling<'_, RpsObservation, RpsAction>],
    ) -> f64 {
        self.opponent_distribution[opponent_action.index()]
    }

    fn key_from_action(&self, action: &RpsAction) -> ActionKey {
        ActionKey::from(action.name())
    }

    fn action_from_key(&self, key: &str) -> Option<RpsAction> {
        RpsAction::ALL.into_iter().find(|a| a.name() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::round_trip;

    #[test]
    fn test_beats_is_cyclic() {
        for a in RpsAction::ALL {
            assert!(!a.beats(a));
            let wins = RpsAction::ALL.iter().filter(|&&b| a.beats(b)).count();
            assert_eq!(wins, 1);
        }
    }

    #[test]
    fn test_step_scores_rounds() {
        let game = RockPaperScissors::default();
        let start = RpsObservation::default();

        assert_eq!(game.step(&start, RpsAction::Paper, RpsAction::Rock), RpsObservation::new(1, 1, 0));
        assert_eq!(game.step(&start, RpsAction::Rock, RpsAction::Paper), RpsObservation::new(1, 0, 1));
        assert_eq!(game.step(&start, RpsAction::Rock, RpsAction::Rock), RpsObservation::new(1, 0, 0));
    }

    #[test]
    fn test_terminal_and_reward() {
        let game = RockPaperScissors::default();

        assert!(!game.is_terminal(&RpsObservation::new(4, 0, 0)));
        assert!(game.is_terminal(&RpsObservation::new(5, 0, 0)));
        assert!(game.legal_agent_actions(&RpsObservation::new(5, 0, 0)).is_empty());
        assert_eq!(game.legal_opponent_actions(&RpsObservation::default()).len(), 3);

        assert_eq!(game.reward(&RpsObservation::new(5, 3, 1)), 1.0);
        assert_eq!(game.reward(&RpsObservation::new(5, 2, 2)), 0.5);
        assert_eq!(game.reward(&RpsObservation::new(5, 0, 4)), 0.0);
    }

    #[test]
    fn test_keys_round_trip() {
        let game = RockPaperScissors::default();
        for action in RpsAction::ALL {
            let key = round_trip(&game, &action).unwrap();
            assert_eq!(key.as_str(), action.name());
        }
        assert_eq!(game.action_from_key("lizard"), None);
    }

    #[test]
    fn test_builder() {
        let game = RockPaperScissors::builder()
            .turn_limit(3)
            .opponent_distribution([0.2, 0.3, 0.5])
            .build();

        assert_eq!(game.turn_limit(), 3);
        assert_eq!(game.opponent_distribution(), [0.2, 0.3, 0.5]);
        assert!(game.is_terminal(&RpsObservation::new(3, 0, 0)));
    }
}
