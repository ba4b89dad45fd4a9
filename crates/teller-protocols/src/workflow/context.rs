//! Engine handle given to running workflows.

use std::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tracing::debug;

use crate::entry::EntryId;
use crate::error::WorkflowError;
use crate::presentation::{ModalWidth, PresentationUpdate};
use crate::result::WorkflowResult;

/// Operations a workflow can ask of the engine that runs it.
///
/// Implemented by the workflow manager; workflows reach it through
/// [`WorkflowContext`].
#[async_trait]
pub trait WorkflowHost: Send + Sync {
    /// Start `workflow_id` nested under `caller` and wait for it to terminate.
    async fn start_nested(
        &self,
        caller: EntryId,
        workflow_id: &str,
        params: serde_json::Value,
    ) -> Result<WorkflowResult, WorkflowError>;

    /// Resolve `entry` with a result and remove it from the stack.
    fn complete(&self, entry: EntryId, result: WorkflowResult) -> Result<(), WorkflowError>;

    /// Cancel `entry` and everything nested under it.
    fn cancel(&self, entry: EntryId, message: Option<String>) -> Result<(), WorkflowError>;

    /// Forward a presentation update, or buffer it while `entry` is not focused.
    fn relay(&self, entry: EntryId, update: PresentationUpdate);
}

/// Handle a workflow instance uses to talk to the engine.
///
/// Cheap to clone and safe to store: it only holds a weak reference to the host.
#[derive(Clone)]
pub struct WorkflowContext {
    entry: EntryId,
    workflow_id: Arc<str>,
    host: Weak<dyn WorkflowHost>,
}

impl WorkflowContext {
    /// Create a new context.
    pub fn new(entry: EntryId, workflow_id: &str, host: Weak<dyn WorkflowHost>) -> Self {
        Self {
            entry,
            workflow_id: Arc::from(workflow_id),
            host,
        }
    }

    /// The entry this context belongs to.
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    /// Id of the running workflow.
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    fn host(&self) -> Result<Arc<dyn WorkflowHost>, WorkflowError> {
        self.host.upgrade().ok_or(WorkflowError::HostUnavailable)
    }

    fn relay(&self, update: PresentationUpdate) {
        match self.host.upgrade() {
            Some(host) => host.relay(self.entry, update),
            None => debug!(
                "Dropping presentation update from {} ({}): host gone",
                self.workflow_id, self.entry
            ),
        }
    }

    pub fn update_title(&self, text: impl Into<String>) {
        self.relay(PresentationUpdate::Title { text: text.into() });
    }

    pub fn update_footer(&self, visible: bool, primary_label: Option<&str>) {
        self.relay(PresentationUpdate::Footer {
            visible,
            primary_label: primary_label.map(str::to_string),
        });
    }

    /// Report whether the current step may proceed.
    pub fn notify_validation(&self, is_valid: bool, message: Option<&str>) {
        self.relay(PresentationUpdate::Validation {
            is_valid,
            message: message.map(str::to_string),
        });
    }

    pub fn set_modal_width(&self, width: ModalWidth) {
        self.relay(PresentationUpdate::Width { width });
    }

    /// Terminate with an outcome.
    pub fn complete(
        &self,
        success: bool,
        data: Option<serde_json::Value>,
        message: Option<&str>,
    ) -> Result<(), WorkflowError> {
        self.complete_with(WorkflowResult {
            success,
            data,
            message: message.map(str::to_string),
        })
    }

    /// Terminate with a prepared result.
    pub fn complete_with(&self, result: WorkflowResult) -> Result<(), WorkflowError> {
        self.host()?.complete(self.entry, result)
    }

    /// Terminate unsuccessfully, cascading to any nested workflow still running.
    pub fn cancel(&self, message: Option<&str>) -> Result<(), WorkflowError> {
        self.host()?
            .cancel(self.entry, message.map(str::to_string))
    }

    /// Suspend this workflow, run `workflow_id` on top of it, and return its result.
    ///
    /// By the time this returns, [`crate::Workflow::resume`] has already run on this
    /// workflow with the same result.
    pub async fn start_nested(
        &self,
        workflow_id: &str,
        params: serde_json::Value,
    ) -> Result<WorkflowResult, WorkflowError> {
        self.host()?
            .start_nested(self.entry, workflow_id, params)
            .await
    }
}

impl fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("entry", &self.entry)
            .field("workflow_id", &self.workflow_id)
            .finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
