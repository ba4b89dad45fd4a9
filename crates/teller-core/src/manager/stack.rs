//! The workflow stack: ordering, parent links, focus and presentation buffering.
//!
//! Pure bookkeeping with no locking or I/O. The manager owns one of these behind
//! its mutex and turns the returned values into surface calls and events.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;

use teller_protocols::entry::{EntryId, EntryState};
use teller_protocols::presentation::{PresentationState, PresentationUpdate};
use teller_protocols::result::WorkflowResult;
use teller_protocols::workflow::Workflow;

/// Bookkeeping record for one running workflow.
pub(crate) struct Entry {
    pub(crate) id: EntryId,
    pub(crate) workflow_id: String,
    pub(crate) workflow: Arc<dyn Workflow>,
    pub(crate) parent: Option<EntryId>,
    pub(crate) state: EntryState,
    /// Latest state, including updates issued while unfocused.
    pub(crate) presentation: PresentationState,
    /// State at the moment focus was lost.
    restore: PresentationState,
    /// Updates issued while unfocused, in issue order.
    pending: Vec<PresentationUpdate>,
    sender: Option<oneshot::Sender<WorkflowResult>>,
}

/// Read-only view of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    pub entry: EntryId,
    pub workflow_id: String,
    pub parent: Option<EntryId>,
    pub state: EntryState,
    pub presentation: PresentationState,
    /// Presentation updates waiting for the entry to regain focus.
    pub buffered: usize,
}

impl Entry {
    pub(crate) fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            entry: self.id,
            workflow_id: self.workflow_id.clone(),
            parent: self.parent,
            state: self.state,
            presentation: self.presentation.clone(),
            buffered: self.pending.len(),
        }
    }
}

/// An entry that left the stack.
pub(crate) struct Removed {
    pub(crate) id: EntryId,
    pub(crate) workflow_id: String,
    pub(crate) parent: Option<EntryId>,
    pub(crate) result: WorkflowResult,
}

/// Outcome of relaying one presentation update.
#[derive(Debug, PartialEq)]
pub(crate) enum Relay {
    /// The entry is focused; deliver now.
    Deliver(PresentationUpdate),
    /// Held until the entry regains focus.
    Buffered,
    /// No such live entry.
    Unknown,
}

/// Focus change after a stack mutation.
#[derive(Debug, PartialEq)]
pub(crate) enum Focus {
    Unchanged,
    /// A different entry is on top; replay these to the surface.
    Changed(Vec<PresentationUpdate>),
    /// The stack became empty.
    Cleared,
}

/// LIFO stack of running workflows.
#[derive(Default)]
pub(crate) struct WorkflowStack {
    entries: Vec<Entry>,
    focused: Option<EntryId>,
}

impl WorkflowStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn top(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub(crate) fn is_top(&self, id: EntryId) -> bool {
        self.top().is_some_and(|e| e.id == id)
    }

    /// Push a new entry. A parent, if given, is suspended.
    ///
    /// The caller checks that the parent may nest; the stack only records it.
    pub(crate) fn push(
        &mut self,
        workflow_id: &str,
        workflow: Arc<dyn Workflow>,
        parent: Option<EntryId>,
    ) -> (EntryId, oneshot::Receiver<WorkflowResult>) {
        let (sender, receiver) = oneshot::channel();
        let id = EntryId::new();

        if let Some(parent_id) = parent {
            if let Some(parent_entry) = self.get_mut(parent_id) {
                parent_entry.state = EntryState::Suspended;
            }
        }

        self.entries.push(Entry {
            id,
            workflow_id: workflow_id.to_string(),
            workflow,
            parent,
            state: EntryState::Initializing,
            presentation: PresentationState::default(),
            restore: PresentationState::default(),
            pending: Vec::new(),
            sender: Some(sender),
        });

        (id, receiver)
    }

    /// The live child of `id`, if any.
    pub(crate) fn child_of(&self, id: EntryId) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|e| e.parent == Some(id))
            .map(|e| e.id)
    }

    /// All live descendants of `id`, innermost first.
    pub(crate) fn descendants(&self, id: EntryId) -> Vec<EntryId> {
        let Some(pos) = self.position(id) else {
            return Vec::new();
        };

        // Children always sit above their parents, so one upward pass finds the chain.
        let mut lineage: HashSet<EntryId> = HashSet::from([id]);
        let mut found = Vec::new();
        for entry in &self.entries[pos + 1..] {
            if let Some(parent) = entry.parent {
                if lineage.contains(&parent) {
                    lineage.insert(entry.id);
                    found.push(entry.id);
                }
            }
        }
        found.reverse();
        found
    }

    /// Ids from top to bottom.
    pub(crate) fn ids_top_down(&self) -> Vec<EntryId> {
        self.entries.iter().rev().map(|e| e.id).collect()
    }

    /// Remove an entry, resolving its result exactly once.
    ///
    /// A suspended parent moves to `Resuming`.
    pub(crate) fn remove(&mut self, id: EntryId, result: WorkflowResult) -> Option<Removed> {
        let pos = self.position(id)?;
        let mut entry = self.entries.remove(pos);

        if self.focused == Some(id) {
            self.focused = None;
        }

        if let Some(sender) = entry.sender.take() {
            // The receiver may already be gone; the result is still final.
            let _ = sender.send(result.clone());
        }

        if let Some(parent_id) = entry.parent {
            if let Some(parent) = self.get_mut(parent_id) {
                if parent.state == EntryState::Suspended {
                    parent.state = EntryState::Resuming;
                }
            }
        }

        Some(Removed {
            id,
            workflow_id: entry.workflow_id,
            parent: entry.parent,
            result,
        })
    }

    /// Record an update and decide whether it reaches the surface now.
    pub(crate) fn relay(&mut self, id: EntryId, update: PresentationUpdate) -> Relay {
        let focused = self.focused == Some(id);
        let Some(entry) = self.get_mut(id) else {
            return Relay::Unknown;
        };

        entry.presentation.apply(&update);
        if focused && entry.state != EntryState::Suspended {
            Relay::Deliver(update)
        } else {
            entry.pending.push(update);
            Relay::Buffered
        }
    }

    /// Move focus to the top entry if it changed.
    ///
    /// The entry losing focus remembers its state; the entry gaining it replays
    /// the state it had when it lost focus followed by everything it buffered.
    pub(crate) fn refocus(&mut self) -> Focus {
        let top = self.top().map(|e| e.id);
        if top == self.focused {
            return Focus::Unchanged;
        }

        if let Some(previous) = self.focused {
            if let Some(entry) = self.get_mut(previous) {
                entry.restore = entry.presentation.clone();
            }
        }
        self.focused = top;

        match top.and_then(|id| self.get_mut(id)) {
            Some(entry) => {
                let mut updates = entry.restore.to_updates();
                updates.append(&mut entry.pending);
                Focus::Changed(updates)
            }
            None => Focus::Cleared,
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<EntrySnapshot> {
        self.entries.iter().map(Entry::snapshot).collect()
    }
}

#[cfg(test)]
#[path = "stack_tests.rs"]
mod tests;
