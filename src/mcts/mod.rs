//! Monte Carlo Tree Search over two-agent decision processes.
//!
//! ## Overview
//!
//! Each node holds one observed state. Expanding it builds the full grid of
//! joint moves: every legal agent action against every legal opponent reply.
//! Key features:
//!
//! - **Outcome grids**: Children stored row-major per agent action, so a
//!   sibling group is a contiguous slice
//! - **Opponent modeling**: Replies sampled from the domain's transition model
//! - **Blended values**: The domain's value model mixed with observed mean reward
//! - **Configurable policies**: Selection and rollout policies are traits
//! - **Deterministic**: A seeded config replays a search exactly
//!
//! ## Usage
//!
//! ```rust
//! use duel_mcts::games::rps::{RockPaperScissors, RpsObservation};
//! use duel_mcts::mcts::{MCTSConfig, MCTSSearch};
//!
//! let config = MCTSConfig::default().with_seed(42);
//! let mut search = MCTSSearch::new(RockPaperScissors::default(), config, RpsObservation::default());
//!
//! let action = search.search(500).expect("root is not terminal");
//! println!("Best action: {:?}", action);
//!
//! for (action, prob) in search.action_probabilities() {
//!     println!("{:?}: {:.2}%", action, prob * 100.0);
//! }
//! ```
//!
//! ## Custom Policies
//!
//! ```rust,ignore
//! let search = MCTSSearch::new(domain, config, observation)
//!     .with_rollout(MyHeuristicRollout);
//! ```

pub mod config;
pub mod edges;
pub mod node;
pub mod outcome;
pub mod policy;
pub mod sampling;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::MCTSConfig;
pub use edges::{EdgeAxis, EdgeMap};
pub use node::{MCTSNode, NodeId, NodeView};
pub use outcome::{blended_value, expand, ExpansionReport};
pub use policy::{RolloutPolicy, SelectionPolicy, UniformRollout, UCB};
pub use sampling::{pick_weighted, Pick};
pub use search::MCTSSearch;
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};
