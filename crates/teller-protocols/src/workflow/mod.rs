//! Workflow contract: lifecycle hooks, engine handle and registry definitions.

mod context;
mod definition;
mod traits;

pub use context::{WorkflowContext, WorkflowHost};
pub use definition::WorkflowDefinition;
pub use traits::{LazyLoader, ReadyLoader, Workflow, WorkflowFactory, WorkflowLoader};
