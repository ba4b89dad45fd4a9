//! Registry definition of a workflow.

use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{ReadyLoader, WorkflowFactory, WorkflowLoader};
use crate::error::WorkflowError;

/// Display metadata plus a lazily loaded implementation.
///
/// Clones share the implementation cache, so the loader runs at most once per
/// registered definition no matter how many times the workflow is started.
#[derive(Clone)]
pub struct WorkflowDefinition {
    /// Stable identifier used to start the workflow.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// What the procedure does.
    pub description: String,

    loader: Arc<dyn WorkflowLoader>,
    implementation: Arc<OnceCell<Arc<dyn WorkflowFactory>>>,
}

impl WorkflowDefinition {
    /// Create a definition with a custom loader.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        loader: impl WorkflowLoader + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            loader: Arc::new(loader),
            implementation: Arc::new(OnceCell::new()),
        }
    }

    /// Create a definition whose implementation is already available.
    pub fn with_factory(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        factory: impl WorkflowFactory + 'static,
    ) -> Self {
        Self::new(id, name, description, ReadyLoader::new(factory))
    }

    /// Load the implementation, reusing the cached one after the first success.
    ///
    /// Concurrent first loads wait on a single loader call. A failed load is not
    /// cached and will be retried on the next start.
    pub async fn load(&self) -> Result<Arc<dyn WorkflowFactory>, WorkflowError> {
        let factory = self
            .implementation
            .get_or_try_init(|| self.loader.load())
            .await?;
        Ok(factory.clone())
    }

    /// Whether the implementation has been materialized.
    pub fn is_loaded(&self) -> bool {
        self.implementation.initialized()
    }
}

impl fmt::Debug for WorkflowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
