//! Validation of the domain's action/key mapping.

use rustc_hash::FxHashMap;

use crate::core::ActionKey;
use crate::error::{PlannerError, Result};

use super::process::MarkovDecisionProcess;

/// Key every action and check the mapping is a bijection over `actions`.
///
/// Returns the keys in action order plus a key -> position index.
pub fn index_actions<D: MarkovDecisionProcess>(
    domain: &D,
    actions: &[D::Action],
) -> Result<(Vec<ActionKey>, FxHashMap<ActionKey, u16>)> {
    if actions.len() > u16::MAX as usize {
        return Err(PlannerError::invalid_key(
            "",
            format!("{} actions exceed the per-node limit of {}", actions.len(), u16::MAX),
        ));
    }

    let mut keys = Vec::with_capacity(actions.len());
    let mut index = FxHashMap::default();
    index.reserve(actions.len());

    for (i, action) in actions.iter().enumerate() {
        let key = round_trip(domain, action)?;
        if index.insert(key.clone(), i as u16).is_some() {
            return Err(PlannerError::invalid_key(
                key.as_str(),
                "two legal actions share this key",
            ));
        }
        keys.push(key);
    }

    Ok((keys, index))
}

/// Key an action and check `action_from_key` gives it back.
pub fn round_trip<D: MarkovDecisionProcess>(domain: &D, action: &D::Action) -> Result<ActionKey> {
    let key = domain.key_from_action(action);
    match domain.action_from_key(key.as_str()) {
        Some(decoded) if &decoded == action => Ok(key),
        Some(decoded) => Err(PlannerError::invalid_key(
            key.as_str(),
            format!("decodes to {decoded:?}, expected {action:?}"),
        )),
        None => Err(PlannerError::invalid_key(key.as_str(), "key is not decodable")),
    }
}
