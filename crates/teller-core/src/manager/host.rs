//! Manager internals: the locked stack and the engine side of the workflow contract.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info, warn};

use teller_protocols::entry::{EntryId, EntryState};
use teller_protocols::error::WorkflowError;
use teller_protocols::presentation::{PresentationSurface, PresentationUpdate};
use teller_protocols::result::WorkflowResult;
use teller_protocols::workflow::{Workflow, WorkflowContext, WorkflowHost};

use super::handle::WorkflowHandle;
use super::stack::{Focus, Relay, WorkflowStack};
use super::ManagerConfig;
use crate::events::WorkflowEvent;
use crate::registry::WorkflowRegistry;

/// How an entry leaves the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Termination {
    /// Refused while a child is live.
    Complete,
    /// Cancels live descendants first, innermost first.
    Cancel,
}

/// Everything guarded by the manager's single lock.
pub(crate) struct ManagerState {
    pub(crate) stack: WorkflowStack,
    pub(crate) surface: Option<Arc<dyn PresentationSurface>>,
}

impl ManagerState {
    pub(crate) fn deliver(&self, updates: &[PresentationUpdate]) {
        if let Some(surface) = &self.surface {
            for update in updates {
                update.deliver(surface.as_ref());
            }
        }
    }
}

pub(crate) struct ManagerInner {
    pub(crate) registry: Arc<WorkflowRegistry>,
    pub(crate) config: ManagerConfig,
    pub(crate) state: Mutex<ManagerState>,
    pub(crate) events: broadcast::Sender<WorkflowEvent>,
    self_ref: Weak<ManagerInner>,
}

impl ManagerInner {
    pub(crate) fn new(registry: Arc<WorkflowRegistry>, config: ManagerConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Arc::new_cyclic(|self_ref| Self {
            registry,
            config,
            state: Mutex::new(ManagerState {
                stack: WorkflowStack::new(),
                surface: None,
            }),
            events,
            self_ref: self_ref.clone(),
        })
    }

    pub(crate) fn context(&self, entry: EntryId, workflow_id: &str) -> WorkflowContext {
        let host: Weak<dyn WorkflowHost> = self.self_ref.clone();
        WorkflowContext::new(entry, workflow_id, host)
    }

    pub(crate) fn emit(&self, event: WorkflowEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn refocus_locked(&self, state: &mut ManagerState) {
        match state.stack.refocus() {
            Focus::Unchanged => {}
            Focus::Changed(updates) => state.deliver(&updates),
            Focus::Cleared => {
                if let Some(surface) = &state.surface {
                    surface.clear();
                }
            }
        }
    }

    fn ensure_can_nest(stack: &WorkflowStack, caller: EntryId) -> Result<(), WorkflowError> {
        let entry = stack.get(caller).ok_or(WorkflowError::Terminated(caller))?;
        if !stack.is_top(caller) || !entry.state.can_nest() {
            warn!(
                "Workflow {} ({}) tried to nest while {:?}",
                entry.workflow_id, caller, entry.state
            );
            return Err(WorkflowError::NotActive(caller));
        }
        Ok(())
    }

    /// Resolve, load, push and initialize a workflow.
    ///
    /// Nothing is pushed unless the id resolves and the implementation loads.
    pub(crate) async fn launch(
        &self,
        workflow_id: &str,
        params: serde_json::Value,
        parent: Option<EntryId>,
    ) -> Result<(EntryId, oneshot::Receiver<WorkflowResult>), WorkflowError> {
        let definition = self.registry.resolve(workflow_id)?;
        let factory = self.registry.load_implementation(&definition).await?;
        let workflow = factory.create();

        let (entry, receiver) = {
            let mut state = self.state.lock();
            if let Some(caller) = parent {
                Self::ensure_can_nest(&state.stack, caller)?;
            }
            let (entry, receiver) = state.stack.push(workflow_id, workflow.clone(), parent);
            self.emit(WorkflowEvent::Started {
                entry,
                workflow_id: workflow_id.to_string(),
                parent,
            });
            if let Some(caller) = parent {
                self.emit(WorkflowEvent::Suspended {
                    entry: caller,
                    child: entry,
                });
            }
            self.refocus_locked(&mut state);
            (entry, receiver)
        };

        match parent {
            Some(caller) => info!("Started nested workflow {} ({}) under {}", workflow_id, entry, caller),
            None => info!("Started workflow {} ({})", workflow_id, entry),
        }

        self.initialize(entry, workflow_id, workflow, params).await?;
        Ok((entry, receiver))
    }

    async fn initialize(
        &self,
        entry: EntryId,
        workflow_id: &str,
        workflow: Arc<dyn Workflow>,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let ctx = self.context(entry, workflow_id);
        if let Err(e) = workflow.initialize(&ctx, params).await {
            let message = e.to_string();
            error!("Workflow {} ({}) failed to initialize: {}", workflow_id, entry, message);
            // The workflow may already have terminated itself before failing.
            if let Err(e) = self.terminate(entry, WorkflowResult::failure(message.clone()), Termination::Cancel) {
                debug!("Cleanup after failed initialize: {}", e);
            }
            return Err(WorkflowError::InitializationFailed {
                id: workflow_id.to_string(),
                message,
            });
        }

        let mut state = self.state.lock();
        if let Some(record) = state.stack.get_mut(entry) {
            if record.state == EntryState::Initializing {
                record.state = EntryState::Active;
                self.emit(WorkflowEvent::Activated {
                    entry,
                    workflow_id: workflow_id.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn terminate(
        &self,
        entry: EntryId,
        result: WorkflowResult,
        mode: Termination,
    ) -> Result<(), WorkflowError> {
        let mut state = self.state.lock();
        self.terminate_locked(&mut state, entry, result, mode)
    }

    pub(crate) fn terminate_locked(
        &self,
        state: &mut ManagerState,
        entry: EntryId,
        result: WorkflowResult,
        mode: Termination,
    ) -> Result<(), WorkflowError> {
        if state.stack.get(entry).is_none() {
            warn!("Rejected second terminal call for entry {}", entry);
            return Err(WorkflowError::DoubleTermination(entry));
        }

        match mode {
            Termination::Complete => {
                if let Some(child) = state.stack.child_of(entry) {
                    warn!("Entry {} tried to complete while child {} is live", entry, child);
                    return Err(WorkflowError::OrphanedChild { entry, child });
                }
            }
            Termination::Cancel => {
                for descendant in state.stack.descendants(entry) {
                    let cascade = WorkflowResult::failure(self.config.cascade_message.clone());
                    if let Some(removed) = state.stack.remove(descendant, cascade) {
                        self.removed(removed);
                    }
                }
            }
        }

        if let Some(removed) = state.stack.remove(entry, result) {
            self.removed(removed);
        }
        self.refocus_locked(state);
        Ok(())
    }

    fn removed(&self, removed: super::stack::Removed) {
        info!(
            "Workflow {} ({}) terminated: success={}{}",
            removed.workflow_id,
            removed.id,
            removed.result.success,
            removed
                .result
                .message
                .as_deref()
                .map(|m| format!(", message={}", m))
                .unwrap_or_default()
        );
        if let Some(parent) = removed.parent {
            debug!("Entry {} resumes after child {}", parent, removed.id);
        }
        self.emit(WorkflowEvent::Terminated {
            entry: removed.id,
            workflow_id: removed.workflow_id,
            result: removed.result,
        });
    }

    /// Run `resume` on a caller whose child has terminated.
    async fn resume(&self, caller: EntryId, result: &WorkflowResult) -> Result<(), WorkflowError> {
        let (workflow, ctx) = {
            let state = self.state.lock();
            match state.stack.get(caller) {
                Some(entry) if entry.state == EntryState::Resuming => (
                    entry.workflow.clone(),
                    self.context(caller, &entry.workflow_id),
                ),
                Some(entry) => {
                    warn!(
                        "Entry {} expected to resume but is {:?}",
                        caller, entry.state
                    );
                    return Err(WorkflowError::NotActive(caller));
                }
                None => {
                    debug!("Entry {} left the stack before its child returned", caller);
                    return Err(WorkflowError::Terminated(caller));
                }
            }
        };

        if let Err(e) = workflow.resume(&ctx, result).await {
            let message = e.to_string();
            error!("Workflow {} ({}) failed to resume: {}", ctx.workflow_id(), caller, message);
            if let Err(e) = self.terminate(caller, WorkflowResult::failure(message.clone()), Termination::Cancel) {
                debug!("Cleanup after failed resume: {}", e);
            }
            return Err(WorkflowError::ResumeFailed {
                id: ctx.workflow_id().to_string(),
                message,
            });
        }

        let mut state = self.state.lock();
        if let Some(entry) = state.stack.get_mut(caller) {
            if entry.state == EntryState::Resuming {
                entry.state = EntryState::Active;
                self.emit(WorkflowEvent::Resumed {
                    entry: caller,
                    workflow_id: ctx.workflow_id().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowHost for ManagerInner {
    async fn start_nested(
        &self,
        caller: EntryId,
        workflow_id: &str,
        params: serde_json::Value,
    ) -> Result<WorkflowResult, WorkflowError> {
        // Covers every early exit: a caller left in `Resuming` goes back to `Active`.
        let _guard = ResumeGuard {
            inner: self.self_ref.clone(),
            entry: caller,
        };

        let (child, receiver) = self.launch(workflow_id, params, Some(caller)).await?;
        let result = WorkflowHandle::new(child, workflow_id, receiver).await;
        self.resume(caller, &result).await?;
        Ok(result)
    }

    fn complete(&self, entry: EntryId, result: WorkflowResult) -> Result<(), WorkflowError> {
        self.terminate(entry, result, Termination::Complete)
    }

    fn cancel(&self, entry: EntryId, message: Option<String>) -> Result<(), WorkflowError> {
        let result = WorkflowResult {
            success: false,
            data: None,
            message,
        };
        self.terminate(entry, result, Termination::Cancel)
    }

    fn relay(&self, entry: EntryId, update: PresentationUpdate) {
        let mut state = self.state.lock();
        match state.stack.relay(entry, update) {
            Relay::Deliver(update) => state.deliver(std::slice::from_ref(&update)),
            Relay::Buffered => debug!("Buffered presentation update from {}", entry),
            Relay::Unknown => warn!("Presentation update from terminated entry {}", entry),
        }
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        let live = self.state.get_mut().stack.len();
        if live > 0 {
            warn!("Workflow manager dropped with {} live workflows", live);
        }
    }
}

/// Result handed to a child whose caller stopped awaiting `start_nested`.
pub(crate) const ABANDONED_MESSAGE: &str = "Cancelled because the calling workflow stopped waiting";

/// Returns the caller to `Active` when `start_nested` exits without running
/// `resume`.
///
/// If the call future was dropped while the child is still live, the child is
/// cancelled first so the caller is not left suspended with nobody to resume it.
struct ResumeGuard {
    inner: Weak<ManagerInner>,
    entry: EntryId,
}

impl Drop for ResumeGuard {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.state.lock();
        let suspended = state
            .stack
            .get(self.entry)
            .is_some_and(|entry| entry.state == EntryState::Suspended);
        if suspended {
            if let Some(child) = state.stack.child_of(self.entry) {
                warn!(
                    "Entry {} stopped waiting for child {}, cancelling it",
                    self.entry, child
                );
                let result = WorkflowResult::failure(ABANDONED_MESSAGE);
                if let Err(e) = inner.terminate_locked(&mut state, child, result, Termination::Cancel) {
                    debug!("Cancelling abandoned child {}: {}", child, e);
                }
            }
        }
        if let Some(entry) = state.stack.get_mut(self.entry) {
            if entry.state == EntryState::Resuming {
                debug!("Entry {} reactivated without resume", self.entry);
                entry.state = EntryState::Active;
            }
        }
    }
}
