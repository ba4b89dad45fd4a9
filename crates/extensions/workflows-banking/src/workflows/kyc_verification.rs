//! Verification of a single KYC level.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use teller_protocols::error::WorkflowError;
use teller_protocols::presentation::ModalWidth;
use teller_protocols::workflow::{Workflow, WorkflowContext, WorkflowDefinition};

use super::parse_params;
use crate::outcome::BankingOutcome;
use crate::services::{BankingServices, KycLevel};

pub const ID: &str = "kyc-verification";

#[derive(Debug, Deserialize)]
struct VerificationParams {
    level: KycLevel,
}

pub struct KycVerificationWorkflow {
    services: Arc<BankingServices>,
    level: Mutex<KycLevel>,
}

impl KycVerificationWorkflow {
    pub fn new(services: Arc<BankingServices>) -> Self {
        Self {
            services,
            level: Mutex::new(KycLevel::None),
        }
    }
}

#[async_trait]
impl Workflow for KycVerificationWorkflow {
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let params: VerificationParams = parse_params(ID, params)?;
        if params.level == KycLevel::None {
            return Err(WorkflowError::InvalidParams(
                "kyc-verification: level none needs no verification".to_string(),
            ));
        }

        let width = match params.level {
            KycLevel::Enhanced => ModalWidth::Large,
            _ => ModalWidth::Medium,
        };
        ctx.set_modal_width(width);
        ctx.update_title(format!("Verify {} identity", params.level));
        ctx.update_footer(true, Some("Submit documents"));
        *self.level.lock() = params.level;
        Ok(())
    }

    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let level = *self.level.lock();
        self.services.kyc.raise_to(level);
        ctx.complete_with(BankingOutcome::KycVerification { level }.into_result()?)
    }
}

pub fn definition(services: Arc<BankingServices>) -> WorkflowDefinition {
    WorkflowDefinition::with_factory(
        ID,
        "Verify KYC level",
        "Collect and check the documents for one KYC level",
        move || KycVerificationWorkflow::new(services.clone()),
    )
}
