//! MCTS configuration parameters.

use serde::{Deserialize, Serialize};

/// MCTS configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSConfig {
    /// UCB1 exploration constant `c` (default: sqrt(2) = 1.414).
    /// Only used when the domain supplies no policy model.
    pub exploration_constant: f64,

    /// Weight of observed mean reward against the value model when blending
    /// expected rewards (0 = value model only, 1 = observed mean only).
    /// Default 0.3.
    pub discount_factor: f64,

    /// Maximum rollout length (0 = unlimited).
    /// A cut rollout is scored with the reward of the state it stopped at.
    pub max_rollout_depth: u32,

    /// Maximum nodes to allocate in the tree.
    /// Budgeted searches stop once the arena reaches this size.
    pub max_nodes: usize,

    /// Random seed. `None` draws one from the process-wide RNG.
    pub seed: Option<u64>,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            discount_factor: 0.3,
            max_rollout_depth: 0,
            max_nodes: 1_000_000,
            seed: None,
        }
    }
}

impl MCTSConfig {
    /// Create a new config with custom exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Create a new config with custom discount factor, clamped to [0, 1].
    pub fn with_discount_factor(mut self, gamma: f64) -> Self {
        self.discount_factor = gamma.clamp(0.0, 1.0);
        self
    }

    /// Create a new config with custom seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a new config with a rollout length cap.
    pub fn with_max_rollout_depth(mut self, depth: u32) -> Self {
        self.max_rollout_depth = depth;
        self
    }

    /// Create a new config with a node budget.
    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MCTSConfig::default();
        assert!((config.exploration_constant - std::f64::consts::SQRT_2).abs() < 0.001);
        assert_eq!(config.discount_factor, 0.3);
        assert_eq!(config.max_rollout_depth, 0);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MCTSConfig::default()
            .with_exploration(2.0)
            .with_seed(123)
            .with_max_rollout_depth(50)
            .with_max_nodes(10);

        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.seed, Some(123));
        assert_eq!(config.max_rollout_depth, 50);
        assert_eq!(config.max_nodes, 10);
    }

    #[test]
    fn test_discount_factor_clamped() {
        assert_eq!(MCTSConfig::default().with_discount_factor(1.5).discount_factor, 1.0);
        assert_eq!(MCTSConfig::default().with_discount_factor(-0.2).discount_factor, 0.0);
    }

    #[test]
    fn test_serialization() {
        let config = MCTSConfig::default().with_seed(9);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: MCTSConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.seed, deserialized.seed);
        assert_eq!(config.discount_factor, deserialized.discount_factor);
    }
}
