//! Banking workflow implementations.

pub mod account_opening;
pub mod kyc;
pub mod kyc_verification;
pub mod loan;
pub mod product_activation;
pub mod signing;

pub use account_opening::AccountOpeningWorkflow;
pub use kyc::KycWorkflow;
pub use kyc_verification::KycVerificationWorkflow;
pub use loan::LoanWorkflow;
pub use product_activation::ProductActivationWorkflow;
pub use signing::SigningWorkflow;

use serde::de::DeserializeOwned;

use teller_protocols::error::WorkflowError;

/// Parse start parameters, mapping failures to [`WorkflowError::InvalidParams`].
pub(crate) fn parse_params<T: DeserializeOwned>(
    workflow_id: &str,
    params: serde_json::Value,
) -> Result<T, WorkflowError> {
    serde_json::from_value(params)
        .map_err(|e| WorkflowError::InvalidParams(format!("{}: {}", workflow_id, e)))
}
