//! Lifecycle events broadcast by the workflow manager.

use serde::Serialize;

use teller_protocols::entry::EntryId;
use teller_protocols::result::WorkflowResult;

/// A transition of one workflow entry.
///
/// Events are sent while the stack lock is held, so subscribers observe them in
/// exactly the order the transitions happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// An entry was pushed onto the stack.
    Started {
        entry: EntryId,
        workflow_id: String,
        parent: Option<EntryId>,
    },

    /// `initialize` returned and the entry now accepts input.
    Activated { entry: EntryId, workflow_id: String },

    /// The entry started a nested workflow and is waiting on it.
    Suspended { entry: EntryId, child: EntryId },

    /// `resume` returned on an entry whose child terminated.
    Resumed { entry: EntryId, workflow_id: String },

    /// The entry resolved its result and left the stack.
    Terminated {
        entry: EntryId,
        workflow_id: String,
        result: WorkflowResult,
    },
}

impl WorkflowEvent {
    /// The entry this event is about.
    pub fn entry(&self) -> EntryId {
        match self {
            WorkflowEvent::Started { entry, .. }
            | WorkflowEvent::Activated { entry, .. }
            | WorkflowEvent::Suspended { entry, .. }
            | WorkflowEvent::Resumed { entry, .. }
            | WorkflowEvent::Terminated { entry, .. } => *entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_entry() {
        let entry = EntryId::new();
        let event = WorkflowEvent::Suspended {
            entry,
            child: EntryId::new(),
        };
        assert_eq!(event.entry(), entry);
    }

    #[test]
    fn test_event_serialization() {
        let event = WorkflowEvent::Terminated {
            entry: EntryId::new(),
            workflow_id: "signing".to_string(),
            result: WorkflowResult::failure("Dismissed by user"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "terminated");
        assert_eq!(json["workflow_id"], "signing");
        assert_eq!(json["result"]["success"], false);
    }
}
