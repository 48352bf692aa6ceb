//! Example domains.
//!
//! Small decision processes with known best replies, used to test and benchmark the
//! planner.

pub mod rps;
