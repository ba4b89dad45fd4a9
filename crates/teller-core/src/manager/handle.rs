//! Result future returned by [`super::WorkflowManager::start`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::error;

use teller_protocols::entry::EntryId;
use teller_protocols::result::WorkflowResult;

/// Message used when an entry disappears without a terminal call.
pub(crate) const DISCARDED_MESSAGE: &str = "Workflow was discarded without completing";

/// Pending result of a started workflow.
///
/// Resolves once the workflow calls `complete` or `cancel`, or is cancelled by a
/// dismiss, cascade or teardown.
#[derive(Debug)]
pub struct WorkflowHandle {
    entry: EntryId,
    workflow_id: String,
    receiver: oneshot::Receiver<WorkflowResult>,
}

impl WorkflowHandle {
    pub(crate) fn new(
        entry: EntryId,
        workflow_id: &str,
        receiver: oneshot::Receiver<WorkflowResult>,
    ) -> Self {
        Self {
            entry,
            workflow_id: workflow_id.to_string(),
            receiver,
        }
    }

    /// Entry of the started workflow, usable with [`super::WorkflowManager::cancel`].
    pub fn entry(&self) -> EntryId {
        self.entry
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }
}

impl Future for WorkflowHandle {
    type Output = WorkflowResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => {
                error!(
                    "Workflow {} ({}) dropped without a terminal call",
                    self.workflow_id, self.entry
                );
                Poll::Ready(WorkflowResult::failure(DISCARDED_MESSAGE))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
