//! Workflow manager.
//!
//! Owns the stack of running workflows. Only the top entry is focused: it alone
//! reaches the presentation surface and receives primary actions and dismissals.
//! Starting a nested workflow suspends the caller until the child terminates,
//! then the caller's `resume` hook runs before its `start_nested` call returns.

mod handle;
mod host;
mod stack;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use teller_protocols::entry::{EntryId, EntryState};
use teller_protocols::error::WorkflowError;
use teller_protocols::presentation::PresentationSurface;
use teller_protocols::result::WorkflowResult;

use crate::events::WorkflowEvent;
use crate::registry::WorkflowRegistry;
use host::{ManagerInner, Termination};

pub use handle::WorkflowHandle;
pub use stack::EntrySnapshot;

/// Manager tuning and user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Capacity of the lifecycle event channel.
    pub event_capacity: usize,
    /// Result message when the shell dismisses the focused workflow.
    pub dismiss_message: String,
    /// Result message for descendants of a cancelled workflow.
    pub cascade_message: String,
    /// Result message for workflows still running at teardown.
    pub teardown_message: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            dismiss_message: "Dismissed by user".to_string(),
            cascade_message: "Cancelled because the parent workflow was cancelled".to_string(),
            teardown_message: "Workflow host shut down".to_string(),
        }
    }
}

/// Stack-based orchestrator for running workflows.
///
/// Cheap to clone; clones share the same stack.
#[derive(Clone)]
pub struct WorkflowManager {
    inner: Arc<ManagerInner>,
}

impl WorkflowManager {
    pub fn new(registry: Arc<WorkflowRegistry>, config: ManagerConfig) -> Self {
        Self {
            inner: ManagerInner::new(registry, config),
        }
    }

    /// Create a manager with default configuration.
    pub fn with_registry(registry: Arc<WorkflowRegistry>) -> Self {
        Self::new(registry, ManagerConfig::default())
    }

    pub fn registry(&self) -> &Arc<WorkflowRegistry> {
        &self.inner.registry
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// Start a top-level workflow.
    ///
    /// Returns once `initialize` has finished. The handle resolves with the
    /// workflow's result. An unknown id creates no entry.
    pub async fn start(
        &self,
        workflow_id: &str,
        params: serde_json::Value,
    ) -> Result<WorkflowHandle, WorkflowError> {
        let (entry, receiver) = self.inner.launch(workflow_id, params, None).await?;
        Ok(WorkflowHandle::new(entry, workflow_id, receiver))
    }

    /// Attach the shell and replay the focused workflow's full state to it.
    pub fn attach_surface(&self, surface: Arc<dyn PresentationSurface>) {
        let mut state = self.inner.state.lock();
        if let Some(top) = state.stack.top() {
            for update in top.presentation.to_updates() {
                update.deliver(surface.as_ref());
            }
        }
        state.surface = Some(surface);
        debug!("Presentation surface attached");
    }

    /// Detach the shell. Updates from the focused workflow are still recorded.
    pub fn detach_surface(&self) -> Option<Arc<dyn PresentationSurface>> {
        self.inner.state.lock().surface.take()
    }

    /// Forward the shell's primary action to the focused workflow.
    ///
    /// The handler runs on its own task so it may start nested workflows while the
    /// shell keeps delivering input. A handler error cancels the workflow with the
    /// error text.
    pub fn on_primary_action(&self) -> Result<JoinHandle<()>, WorkflowError> {
        let (entry, workflow, ctx) = {
            let state = self.inner.state.lock();
            let top = state.stack.top().ok_or(WorkflowError::EmptyStack)?;
            if top.state != EntryState::Active {
                debug!("Primary action ignored: {} is {:?}", top.id, top.state);
                return Err(WorkflowError::NotActive(top.id));
            }
            if !top.presentation.is_valid {
                let message = top
                    .presentation
                    .validation_message
                    .clone()
                    .unwrap_or_else(|| "current step is incomplete".to_string());
                return Err(WorkflowError::ValidationBlocked(message));
            }
            (
                top.id,
                top.workflow.clone(),
                self.inner.context(top.id, &top.workflow_id),
            )
        };

        debug!("Primary action for {} ({})", ctx.workflow_id(), entry);
        let inner = Arc::downgrade(&self.inner);
        Ok(tokio::spawn(async move {
            if let Err(e) = workflow.handle_primary_action(&ctx).await {
                error!(
                    "Primary action of {} ({}) failed: {}",
                    ctx.workflow_id(),
                    entry,
                    e
                );
                let Some(inner) = inner.upgrade() else {
                    return;
                };
                let result = WorkflowResult::failure(e.to_string());
                match inner.terminate(entry, result, Termination::Cancel) {
                    Ok(()) | Err(WorkflowError::DoubleTermination(_)) => {}
                    Err(e) => warn!("Could not cancel {} after failure: {}", entry, e),
                }
            }
        }))
    }

    /// Cancel the focused workflow as a user dismissal.
    pub fn on_dismiss(&self) -> Result<EntryId, WorkflowError> {
        let mut state = self.inner.state.lock();
        let top = state.stack.top().map(|e| e.id).ok_or(WorkflowError::EmptyStack)?;
        info!("Dismissing workflow entry {}", top);
        let result = WorkflowResult::failure(self.inner.config.dismiss_message.clone());
        self.inner
            .terminate_locked(&mut state, top, result, Termination::Cancel)?;
        Ok(top)
    }

    /// Cancel any live entry and its descendants.
    pub fn cancel(&self, entry: EntryId, message: Option<&str>) -> Result<(), WorkflowError> {
        let result = WorkflowResult {
            success: false,
            data: None,
            message: message.map(str::to_string),
        };
        self.inner.terminate(entry, result, Termination::Cancel)
    }

    /// Cancel everything still running, top-down. Returns how many entries were cancelled.
    pub fn teardown(&self) -> usize {
        let mut state = self.inner.state.lock();
        let mut cancelled = 0;
        for entry in state.stack.ids_top_down() {
            // Cascades may already have removed lower ids.
            if state.stack.get(entry).is_none() {
                continue;
            }
            let result = WorkflowResult::failure(self.inner.config.teardown_message.clone());
            if self
                .inner
                .terminate_locked(&mut state, entry, result, Termination::Cancel)
                .is_ok()
            {
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            info!("Tore down {} workflows", cancelled);
        }
        cancelled
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshots of every live entry, bottom to top.
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        self.inner.state.lock().stack.snapshots()
    }

    /// Snapshot of the focused entry.
    pub fn active_entry(&self) -> Option<EntrySnapshot> {
        self.inner.state.lock().stack.top().map(|e| e.snapshot())
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().stack.is_empty()
    }
}

impl std::fmt::Debug for WorkflowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowManager")
            .field("live", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
