//! Repeated rock/paper/scissors against a biased opponent.
//!
//! A minimal domain that exercises the planner end to end:
//! - Both sides pick rock, paper or scissors simultaneously each turn
//! - The winner of a round scores a point; ties score nothing
//! - The episode ends after a fixed number of turns (default 5)
//! - The opponent's moves follow a fixed distribution (default: rock 80%)
//!
//! Against the default opponent the best reply is paper.

mod game;

pub use game::{RockPaperScissors, RockPaperScissorsBuilder, RpsAction, RpsObservation, Score};
