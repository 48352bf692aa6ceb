//! Domain configuration for the planner.
//!
//! A domain plugs into the planner by implementing
//! [`MarkovDecisionProcess`]: legal actions for both sides, the one-step
//! transition, reward and terminal test, value/policy models, the opponent
//! transition model and the action <-> key mapping.

pub mod keys;
pub mod process;

pub use keys::{index_actions, round_trip};
pub use process::{MarkovDecisionProcess, Sibling};
