//! Workflow result type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Terminal value of a workflow.
///
/// The engine transports this between a nested workflow and its caller without
/// looking inside `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResult {
    /// Whether the workflow reached its goal.
    pub success: bool,

    /// Payload produced for the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Human-readable outcome or failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WorkflowResult {
    /// Create a successful result without payload.
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
        }
    }

    /// Create a successful result carrying a payload.
    pub fn success_with(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Create a failed result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Decode the payload into a concrete type.
    ///
    /// Returns `Ok(None)` when the result carries no payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, WorkflowError> {
        match &self.data {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}
