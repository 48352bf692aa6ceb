//! Error types for the planner.
//!
//! Every error here points at a programming or configuration mistake in the
//! supplied domain functions. None are transient, so nothing is retried: the
//! failing `plan`/`decide` call returns the error to the caller.

use thiserror::Error;

use crate::mcts::NodeId;

/// Why a node refused expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotExpandableReason {
    /// The node already carries an edge map.
    AlreadyExpanded,
    /// The domain reports the node's observation as terminal.
    Terminal,
}

impl std::fmt::Display for NotExpandableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotExpandableReason::AlreadyExpanded => write!(f, "already expanded"),
            NotExpandableReason::Terminal => write!(f, "terminal state"),
        }
    }
}

/// Main error type for the planner.
#[derive(Error, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum PlannerError {
    #[error("{node} is not expandable: {reason}")]
    NotExpandable {
        node: NodeId,
        reason: NotExpandableReason,
    },

    #[error("no legal action: {context}")]
    NoLegalAction { context: String },

    #[error("invalid action key '{key}': {reason}")]
    InvalidActionKey { key: String, reason: String },
}

impl PlannerError {
    pub(crate) fn no_legal_action(context: impl Into<String>) -> Self {
        PlannerError::NoLegalAction {
            context: context.into(),
        }
    }

    pub(crate) fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        PlannerError::InvalidActionKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
