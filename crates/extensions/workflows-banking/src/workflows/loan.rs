//! Loan application.
//!
//! Review the requested amount, then sign the agreement in a nested `signing`
//! workflow. The loan is booked when signing returns a signature.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use teller_protocols::error::WorkflowError;
use teller_protocols::presentation::ModalWidth;
use teller_protocols::result::WorkflowResult;
use teller_protocols::workflow::{Workflow, WorkflowContext, WorkflowDefinition};

use super::{parse_params, signing};
use crate::outcome::BankingOutcome;
use crate::services::BankingServices;

pub const ID: &str = "loan";

const SIGN_LABEL: &str = "Sign agreement";

#[derive(Debug, Deserialize)]
struct LoanParams {
    amount: u64,
    #[serde(default = "default_term")]
    term_months: u32,
}

fn default_term() -> u32 {
    12
}

#[derive(Debug, Clone, Copy)]
struct Application {
    amount: u64,
    term_months: u32,
}

pub struct LoanWorkflow {
    services: Arc<BankingServices>,
    application: Mutex<Option<Application>>,
}

impl LoanWorkflow {
    pub fn new(services: Arc<BankingServices>) -> Self {
        Self {
            services,
            application: Mutex::new(None),
        }
    }

    fn application(&self) -> Result<Application, WorkflowError> {
        let application = *self.application.lock();
        application.ok_or_else(|| WorkflowError::Custom("loan application not initialized".to_string()))
    }
}

#[async_trait]
impl Workflow for LoanWorkflow {
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let params: LoanParams = parse_params(ID, params)?;

        ctx.set_modal_width(ModalWidth::Medium);
        ctx.update_title(format!(
            "Loan application: {} over {} months",
            params.amount, params.term_months
        ));
        ctx.update_footer(true, Some(SIGN_LABEL));
        if params.amount == 0 {
            ctx.notify_validation(false, Some("Loan amount must be positive"));
        }

        *self.application.lock() = Some(Application {
            amount: params.amount,
            term_months: params.term_months,
        });
        Ok(())
    }

    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let application = self.application()?;
        let document = format!("Loan agreement for {}", application.amount);
        // The outcome is handled in `resume`.
        ctx.start_nested(signing::ID, json!({ "document": document }))
            .await?;
        Ok(())
    }

    async fn resume(
        &self,
        ctx: &WorkflowContext,
        result: &WorkflowResult,
    ) -> Result<(), WorkflowError> {
        match BankingOutcome::decode(signing::ID, result)? {
            Some(BankingOutcome::Signing { signature, .. }) if result.success => {
                let application = self.application()?;
                let loan = self.services.loans.book(
                    application.amount,
                    application.term_months,
                    &signature,
                );
                info!("Loan application {} approved as {}", ctx.entry(), loan.id);

                let outcome = BankingOutcome::Loan {
                    loan_id: loan.id.clone(),
                    amount: loan.amount,
                };
                ctx.complete_with(
                    outcome
                        .into_result()?
                        .with_message(format!("Loan {} booked", loan.id)),
                )
            }
            _ => {
                warn!(
                    "Loan agreement not signed: {}",
                    result.message.as_deref().unwrap_or("no reason given")
                );
                ctx.update_footer(true, Some(SIGN_LABEL));
                ctx.notify_validation(true, Some("The agreement was not signed"));
                Ok(())
            }
        }
    }
}

pub fn definition(services: Arc<BankingServices>) -> WorkflowDefinition {
    WorkflowDefinition::with_factory(
        ID,
        "Apply for a loan",
        "Request a loan and sign the loan agreement",
        move || LoanWorkflow::new(services.clone()),
    )
}
