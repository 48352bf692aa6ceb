//! Action handles: typed indices inside the tree, string keys at the boundary.
//!
//! Domains define their own action type. The planner never compares actions
//! structurally while searching; it addresses them by position in a node's
//! edge map:
//! - `AgentActionId` = row of the outcome grid (the agent's choice)
//! - `OpponentActionId` = column of the outcome grid (the opponent's reply)
//!
//! `ActionKey` is the string form a domain produces for an action. It is
//! only used to look actions up by name and for diagnostics.

use serde::{Deserialize, Serialize};

/// Index of an agent action within one node's edge map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentActionId(pub u16);

impl AgentActionId {
    /// Create a new agent action ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an opponent action within one node's edge map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpponentActionId(pub u16);

impl OpponentActionId {
    /// Create a new opponent action ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AgentActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AgentAction({})", self.0)
    }
}

impl std::fmt::Display for OpponentActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpponentAction({})", self.0)
    }
}

/// String key of an action, as produced by the domain.
///
/// ```
/// use duel_mcts::core::ActionKey;
///
/// let key = ActionKey::from("paper");
/// assert_eq!(key.as_str(), "paper");
/// assert_eq!(key.to_string(), "paper");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKey(String);

impl ActionKey {
    /// Wrap a domain-produced key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for ActionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::borrow::Borrow<str> for ActionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
