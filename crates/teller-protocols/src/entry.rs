//! Entry identity and lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one running workflow entry on the manager's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Allocate a fresh entry id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

/// Lifecycle state of a live entry.
///
/// A removed entry is simply absent from the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// `initialize` is running.
    Initializing,
    /// Receiving input when focused.
    Active,
    /// Paused beneath a nested child.
    Suspended,
    /// Child terminated, `resume` has not returned yet.
    Resuming,
}

impl EntryState {
    /// Whether an entry in this state may start a nested workflow.
    ///
    /// Not while `initialize` runs: the root's `start` would wait on the child.
    pub fn can_nest(&self) -> bool {
        matches!(self, EntryState::Active | EntryState::Resuming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_are_unique() {
        assert_ne!(EntryId::new(), EntryId::new());
    }

    #[test]
    fn test_entry_id_display_is_short() {
        let id = EntryId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn test_can_nest() {
        assert!(!EntryState::Initializing.can_nest());
        assert!(EntryState::Active.can_nest());
        assert!(EntryState::Resuming.can_nest());
        assert!(!EntryState::Suspended.can_nest());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&EntryState::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }
}
