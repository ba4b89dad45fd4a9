//! KYC upgrade.
//!
//! Computes the levels between the customer's current level and the target once,
//! at initialize, and verifies them in order, one nested `kyc-verification` run
//! per level.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use teller_protocols::error::WorkflowError;
use teller_protocols::result::WorkflowResult;
use teller_protocols::workflow::{Workflow, WorkflowContext, WorkflowDefinition};

use super::{kyc_verification, parse_params};
use crate::outcome::BankingOutcome;
use crate::services::{BankingServices, KycLevel};

pub const ID: &str = "kyc";

#[derive(Debug, Deserialize)]
struct KycParams {
    target_level: KycLevel,
}

/// Remaining verification steps.
#[derive(Debug, Clone)]
struct KycPlan {
    steps: Vec<KycLevel>,
    cursor: usize,
}

impl KycPlan {
    fn current(&self) -> Option<KycLevel> {
        self.steps.get(self.cursor).copied()
    }
}

pub struct KycWorkflow {
    services: Arc<BankingServices>,
    plan: Mutex<KycPlan>,
}

impl KycWorkflow {
    pub fn new(services: Arc<BankingServices>) -> Self {
        Self {
            services,
            plan: Mutex::new(KycPlan {
                steps: Vec::new(),
                cursor: 0,
            }),
        }
    }

    fn present(&self, ctx: &WorkflowContext, plan: &KycPlan) {
        if let Some(step) = plan.current() {
            ctx.update_title(format!(
                "Identity verification ({} of {}): {} level",
                plan.cursor + 1,
                plan.steps.len(),
                step
            ));
            ctx.update_footer(true, Some(&format!("Verify {} level", step)));
        }
    }

    fn finish(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let level = self.services.kyc.level();
        info!("KYC upgrade {} finished at level {}", ctx.entry(), level);
        ctx.complete_with(
            BankingOutcome::Kyc { level }
                .into_result()?
                .with_message(format!("Verified to {} level", level)),
        )
    }
}

#[async_trait]
impl Workflow for KycWorkflow {
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let params: KycParams = parse_params(ID, params)?;
        let current = self.services.kyc.level();
        let steps = current.steps_to(params.target_level);

        if steps.is_empty() {
            info!(
                "KYC already at {} (target {}), nothing to verify",
                current, params.target_level
            );
            return self.finish(ctx);
        }

        let plan = KycPlan { steps, cursor: 0 };
        self.present(ctx, &plan);
        *self.plan.lock() = plan;
        Ok(())
    }

    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let step = self
            .plan
            .lock()
            .current()
            .ok_or_else(|| WorkflowError::Custom("no KYC step pending".to_string()))?;
        ctx.start_nested(kyc_verification::ID, json!({ "level": step }))
            .await?;
        Ok(())
    }

    async fn resume(
        &self,
        ctx: &WorkflowContext,
        result: &WorkflowResult,
    ) -> Result<(), WorkflowError> {
        if !result.success {
            // The same step is offered again.
            let plan = self.plan.lock();
            ctx.notify_validation(
                true,
                Some(result.message.as_deref().unwrap_or("Verification was not completed")),
            );
            self.present(ctx, &plan);
            return Ok(());
        }

        if let Some(BankingOutcome::KycVerification { level }) =
            BankingOutcome::decode(kyc_verification::ID, result)?
        {
            info!("KYC level {} verified for {}", level, ctx.entry());
        }

        let done = {
            let mut plan = self.plan.lock();
            plan.cursor += 1;

            // Skip steps satisfied in the meantime instead of recomputing the plan.
            let level = self.services.kyc.level();
            while let Some(step) = plan.current() {
                if level < step {
                    break;
                }
                warn!(
                    "KYC level drifted to {} while verifying; skipping {} step",
                    level, step
                );
                plan.cursor += 1;
            }

            if plan.current().is_some() {
                ctx.notify_validation(true, None);
                self.present(ctx, &plan);
                false
            } else {
                true
            }
        };

        if done {
            self.finish(ctx)?;
        }
        Ok(())
    }
}

pub fn definition(services: Arc<BankingServices>) -> WorkflowDefinition {
    WorkflowDefinition::with_factory(
        ID,
        "Verify identity",
        "Raise the customer's KYC level step by step",
        move || KycWorkflow::new(services.clone()),
    )
}
