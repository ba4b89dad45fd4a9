//! # Teller Protocols
//!
//! Contract definitions for the Teller workflow orchestration engine.
//! Contains only interfaces and value types - the orchestrator lives in `teller-core`.
//!
//! ## Core Types
//!
//! - [`Workflow`] - Lifecycle hooks every guided procedure implements
//! - [`WorkflowContext`] - The handle a running workflow uses to talk to the engine
//! - [`WorkflowDefinition`] - Registry entry with a lazily loaded implementation
//! - [`WorkflowResult`] - Terminal value of a workflow
//! - [`PresentationSurface`] - The shell that renders the focused workflow

pub mod entry;
pub mod error;
pub mod presentation;
pub mod result;
pub mod workflow;

pub use entry::{EntryId, EntryState};
pub use error::WorkflowError;
pub use presentation::{ModalWidth, PresentationState, PresentationSurface, PresentationUpdate};
pub use result::WorkflowResult;
pub use workflow::{
    LazyLoader, ReadyLoader, Workflow, WorkflowContext, WorkflowDefinition, WorkflowFactory,
    WorkflowHost, WorkflowLoader,
};
