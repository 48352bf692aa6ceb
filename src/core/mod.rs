//! Core building blocks shared by the planner: typed action handles and RNG.

pub mod action;
pub mod rng;

pub use action::{ActionKey, AgentActionId, OpponentActionId};
pub use rng::{PlannerRng, PlannerRngState};
