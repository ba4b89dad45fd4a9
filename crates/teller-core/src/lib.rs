//! # Teller Core
//!
//! The workflow orchestration engine.
//!
//! ## Components
//!
//! - [`WorkflowRegistry`] - Workflow id to definition table with lazy loading
//! - [`WorkflowManager`] - Stack of running workflows with nested start, suspend and resume
//! - [`WorkflowEvent`] - Lifecycle notifications broadcast by the manager
//!
//! Both services are constructed explicitly and shared by `Arc`; tests create
//! isolated instances per case.

pub mod events;
pub mod manager;
pub mod registry;

pub use events::WorkflowEvent;
pub use manager::{EntrySnapshot, ManagerConfig, WorkflowHandle, WorkflowManager};
pub use registry::WorkflowRegistry;
