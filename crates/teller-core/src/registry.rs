//! Workflow registry.
//!
//! Maps stable workflow ids to definitions. Registration is last-write-wins so a
//! duplicate bootstrap or a hot reload can safely register the catalog again.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use teller_protocols::error::WorkflowError;
use teller_protocols::workflow::{WorkflowDefinition, WorkflowFactory};

/// Registry of known workflows.
pub struct WorkflowRegistry {
    definitions: DashMap<String, WorkflowDefinition>,
    registration_complete: watch::Sender<bool>,
}

impl WorkflowRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let (registration_complete, _) = watch::channel(false);
        Self {
            definitions: DashMap::new(),
            registration_complete,
        }
    }

    /// Insert or replace the definition for `definition.id`.
    pub fn register(&self, definition: WorkflowDefinition) {
        let id = definition.id.clone();
        if self.definitions.insert(id.clone(), definition).is_some() {
            warn!("Replaced workflow definition: {}", id);
        } else {
            debug!("Registered workflow: {}", id);
        }
    }

    /// Remove a definition.
    pub fn unregister(&self, id: &str) -> Result<(), WorkflowError> {
        self.definitions
            .remove(id)
            .ok_or_else(|| WorkflowError::NotRegistered(id.to_string()))?;
        Ok(())
    }

    /// Look up a definition by id.
    pub fn resolve(&self, id: &str) -> Result<WorkflowDefinition, WorkflowError> {
        self.definitions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                warn!("Workflow not registered: {}", id);
                WorkflowError::NotRegistered(id.to_string())
            })
    }

    /// Materialize the implementation behind a definition, loading it on first use.
    pub async fn load_implementation(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<Arc<dyn WorkflowFactory>, WorkflowError> {
        if !definition.is_loaded() {
            debug!("Loading workflow implementation: {}", definition.id);
        }
        definition.load().await.map_err(|e| match e {
            WorkflowError::LoadFailed { .. } => e,
            other => WorkflowError::LoadFailed {
                id: definition.id.clone(),
                message: other.to_string(),
            },
        })
    }

    /// Check whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// All definitions, sorted by id.
    pub fn list(&self) -> Vec<WorkflowDefinition> {
        let mut definitions: Vec<_> = self
            .definitions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Signal that the catalog is stable.
    ///
    /// One-shot: returns `false` if the signal had already been emitted.
    pub fn emit_registration_complete(&self) -> bool {
        let already = self.registration_complete.send_replace(true);
        if !already {
            info!("Workflow registration complete ({} workflows)", self.len());
        }
        !already
    }

    pub fn is_registration_complete(&self) -> bool {
        *self.registration_complete.borrow()
    }

    /// Wait until [`Self::emit_registration_complete`] has been called.
    pub async fn registration_complete(&self) {
        let mut rx = self.registration_complete.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
