//! Workflow trait definitions.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::WorkflowContext;
use crate::error::WorkflowError;
use crate::result::WorkflowResult;

/// A guided, resumable user procedure.
///
/// One instance is created per start. Hooks take `&self`, so implementations keep
/// their step state behind interior mutability. Every instance must eventually
/// call exactly one of [`WorkflowContext::complete`] or [`WorkflowContext::cancel`].
#[async_trait]
pub trait Workflow: Send + Sync + 'static {
    /// One-time setup. The manager awaits this before handing the result future
    /// back to whoever started the workflow.
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError>;

    /// The user triggered the default affirmative action.
    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError>;

    /// A nested workflow started by this one has terminated.
    ///
    /// Runs before the corresponding [`WorkflowContext::start_nested`] call returns.
    /// Leaf workflows never nest and can keep the default.
    async fn resume(
        &self,
        _ctx: &WorkflowContext,
        _result: &WorkflowResult,
    ) -> Result<(), WorkflowError> {
        Ok(())
    }
}

/// Creates workflow instances.
pub trait WorkflowFactory: Send + Sync {
    fn create(&self) -> Arc<dyn Workflow>;
}

impl<F, W> WorkflowFactory for F
where
    F: Fn() -> W + Send + Sync,
    W: Workflow,
{
    fn create(&self) -> Arc<dyn Workflow> {
        Arc::new(self())
    }
}

/// Materializes a workflow implementation on first use.
#[async_trait]
pub trait WorkflowLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn WorkflowFactory>, WorkflowError>;
}

/// Loader for an implementation that is already linked in.
pub struct ReadyLoader {
    factory: Arc<dyn WorkflowFactory>,
}

impl ReadyLoader {
    pub fn new(factory: impl WorkflowFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }
}

#[async_trait]
impl WorkflowLoader for ReadyLoader {
    async fn load(&self) -> Result<Arc<dyn WorkflowFactory>, WorkflowError> {
        Ok(self.factory.clone())
    }
}

/// Loader backed by an async closure, for implementations that are expensive to
/// bring up and should only load when first started.
pub struct LazyLoader<F> {
    load: F,
}

impl<F> LazyLoader<F> {
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

#[async_trait]
impl<F, Fut> WorkflowLoader for LazyLoader<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn WorkflowFactory>, WorkflowError>> + Send + 'static,
{
    async fn load(&self) -> Result<Arc<dyn WorkflowFactory>, WorkflowError> {
        (self.load)().await
    }
}
