//! # duel-mcts
//!
//! A generic Monte Carlo Tree Search planner for two-agent Markov Decision
//! Processes.
//!
//! ## Design Principles
//!
//! 1. **Domain-Agnostic**: Observations and actions are opaque. Everything
//!    the planner knows about a domain comes through `MarkovDecisionProcess`.
//!
//! 2. **Joint Moves**: The agent and an opponent move together each step.
//!    Expansion enumerates every pairing; opponent replies are sampled from
//!    the domain's transition model.
//!
//! 3. **Deterministic**: All randomness flows from one seeded RNG.
//!
//! ## Architecture
//!
//! - **Arena Tree**: Nodes live in a flat vector addressed by `NodeId`.
//!   Re-rooting compacts the kept subtree.
//!
//! - **Typed Edges**: Children are addressed by `AgentActionId` and
//!   `OpponentActionId` internally; string keys only at the boundary.
//!
//! ## Modules
//!
//! - `core`: Action ids and keys, RNG
//! - `mdp`: The domain contract and key validation
//! - `mcts`: Tree, expansion, policies and the search loop
//! - `games`: Example domains
//! - `error`: Error types

pub mod core;
pub mod error;
pub mod games;
pub mod mcts;
pub mod mdp;

// Re-export commonly used types
pub use crate::core::{ActionKey, AgentActionId, OpponentActionId, PlannerRng, PlannerRngState};

pub use crate::error::{NotExpandableReason, PlannerError, Result};

pub use crate::mdp::{MarkovDecisionProcess, Sibling};

pub use crate::mcts::{
    EdgeMap, MCTSConfig, MCTSNode, MCTSSearch, MCTSTree, NodeId, NodeView, RolloutPolicy, SearchStats,
    SelectionPolicy, TreeStats, UniformRollout, UCB,
};
