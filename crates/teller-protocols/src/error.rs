//! Workflow engine errors.

use thiserror::Error;

use crate::entry::EntryId;

/// Errors raised by the workflow engine.
///
/// Every variant is a contract or configuration violation. Business failures of a
/// workflow travel through [`crate::WorkflowResult`] with `success = false` instead.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow not registered: {0}")]
    NotRegistered(String),

    #[error("Workflow entry {0} already terminated")]
    DoubleTermination(EntryId),

    #[error("Workflow entry {entry} cannot terminate while child {child} is still live")]
    OrphanedChild { entry: EntryId, child: EntryId },

    #[error("Workflow entry {0} is not active")]
    NotActive(EntryId),

    #[error("Workflow entry {0} was terminated while waiting on a nested workflow")]
    Terminated(EntryId),

    #[error("Primary action blocked by validation: {0}")]
    ValidationBlocked(String),

    #[error("No workflow is running")]
    EmptyStack,

    #[error("Failed to load workflow {id}: {message}")]
    LoadFailed { id: String, message: String },

    #[error("Workflow {id} failed to initialize: {message}")]
    InitializationFailed { id: String, message: String },

    #[error("Workflow {id} failed to resume: {message}")]
    ResumeFailed { id: String, message: String },

    #[error("Workflow host is no longer available")]
    HostUnavailable,

    #[error("Invalid workflow parameters: {0}")]
    InvalidParams(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_error() {
        let err = WorkflowError::NotRegistered("loan".to_string());
        let display = err.to_string();
        assert!(display.contains("not registered"));
        assert!(display.contains("loan"));
    }

    #[test]
    fn test_orphaned_child_error() {
        let entry = EntryId::new();
        let child = EntryId::new();
        let err = WorkflowError::OrphanedChild { entry, child };
        let display = err.to_string();
        assert!(display.contains(&entry.to_string()));
        assert!(display.contains(&child.to_string()));
    }

    #[test]
    fn test_double_termination_error() {
        let entry = EntryId::new();
        let err = WorkflowError::DoubleTermination(entry);
        assert!(err.to_string().contains("already terminated"));
    }

    #[test]
    fn test_serialization_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = WorkflowError::from(json_err);
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_custom_error() {
        let err = WorkflowError::Custom("something odd".to_string());
        assert_eq!(err.to_string(), "something odd");
    }

    #[test]
    fn test_all_error_variants() {
        let entry = EntryId::new();
        let errors: Vec<WorkflowError> = vec![
            WorkflowError::NotRegistered("a".to_string()),
            WorkflowError::DoubleTermination(entry),
            WorkflowError::OrphanedChild { entry, child: EntryId::new() },
            WorkflowError::NotActive(entry),
            WorkflowError::Terminated(entry),
            WorkflowError::ValidationBlocked("b".to_string()),
            WorkflowError::EmptyStack,
            WorkflowError::LoadFailed {
                id: "c".to_string(),
                message: "d".to_string(),
            },
            WorkflowError::InitializationFailed {
                id: "e".to_string(),
                message: "f".to_string(),
            },
            WorkflowError::ResumeFailed {
                id: "g".to_string(),
                message: "h".to_string(),
            },
            WorkflowError::HostUnavailable,
            WorkflowError::InvalidParams("i".to_string()),
            WorkflowError::Custom("j".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
