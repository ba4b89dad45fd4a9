//! Typed results of the banking workflows.
//!
//! The engine carries results as opaque JSON. Banking workflows put a
//! [`BankingOutcome`] in `WorkflowResult::data`, tagged with the id of the workflow
//! that produced it, so a caller can check it got the outcome it asked for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teller_protocols::error::WorkflowError;
use teller_protocols::result::WorkflowResult;

use crate::services::KycLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "workflow", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum BankingOutcome {
    Signing {
        signature: String,
        signed_at: DateTime<Utc>,
    },
    Loan {
        loan_id: String,
        amount: u64,
    },
    Kyc {
        level: KycLevel,
    },
    KycVerification {
        level: KycLevel,
    },
    AccountOpening {
        account_id: String,
    },
    ProductActivation {
        account_id: String,
        product: String,
    },
}

impl BankingOutcome {
    /// Id of the workflow that produces this outcome.
    pub fn workflow_id(&self) -> &'static str {
        match self {
            BankingOutcome::Signing { .. } => "signing",
            BankingOutcome::Loan { .. } => "loan",
            BankingOutcome::Kyc { .. } => "kyc",
            BankingOutcome::KycVerification { .. } => "kyc-verification",
            BankingOutcome::AccountOpening { .. } => "account-opening",
            BankingOutcome::ProductActivation { .. } => "product-activation",
        }
    }

    /// Wrap into a successful result.
    pub fn into_result(self) -> Result<WorkflowResult, WorkflowError> {
        Ok(WorkflowResult::success_with(serde_json::to_value(self)?))
    }

    /// Decode the outcome of a nested `workflow_id` run.
    ///
    /// Returns `Ok(None)` for results without payload, such as cancellations.
    pub fn decode(workflow_id: &str, result: &WorkflowResult) -> Result<Option<Self>, WorkflowError> {
        let Some(outcome) = result.decode::<BankingOutcome>()? else {
            return Ok(None);
        };
        if outcome.workflow_id() != workflow_id {
            return Err(WorkflowError::Custom(format!(
                "Expected an outcome of {} but got one of {}",
                workflow_id,
                outcome.workflow_id()
            )));
        }
        Ok(Some(outcome))
    }
}
