//! Account opening.
//!
//! Opening requires a `standard` KYC level. Customers below it go through a
//! nested `kyc` upgrade first, which itself nests `kyc-verification`.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use teller_protocols::error::WorkflowError;
use teller_protocols::result::WorkflowResult;
use teller_protocols::workflow::{Workflow, WorkflowContext, WorkflowDefinition};

use super::{kyc, parse_params};
use crate::outcome::BankingOutcome;
use crate::services::{BankingServices, KycLevel};

pub const ID: &str = "account-opening";

/// Minimum KYC level for opening an account.
pub const REQUIRED_LEVEL: KycLevel = KycLevel::Standard;

#[derive(Debug, Clone, Deserialize)]
struct AccountRequest {
    #[serde(default)]
    holder: String,
    #[serde(default = "default_kind")]
    kind: String,
}

fn default_kind() -> String {
    "checking".to_string()
}

pub struct AccountOpeningWorkflow {
    services: Arc<BankingServices>,
    request: Mutex<Option<AccountRequest>>,
}

impl AccountOpeningWorkflow {
    pub fn new(services: Arc<BankingServices>) -> Self {
        Self {
            services,
            request: Mutex::new(None),
        }
    }

    fn verified(&self) -> bool {
        self.services.kyc.level() >= REQUIRED_LEVEL
    }

    fn footer(&self, ctx: &WorkflowContext) {
        let label = if self.verified() {
            "Open account"
        } else {
            "Verify identity"
        };
        ctx.update_footer(true, Some(label));
    }

    fn open(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let request = self
            .request
            .lock()
            .clone()
            .ok_or_else(|| WorkflowError::Custom("account request not initialized".to_string()))?;
        let account = self.services.accounts.open(&request.holder, &request.kind);
        ctx.complete_with(
            BankingOutcome::AccountOpening {
                account_id: account.id.clone(),
            }
            .into_result()?
            .with_message(format!("Account {} opened", account.id)),
        )
    }
}

#[async_trait]
impl Workflow for AccountOpeningWorkflow {
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let request: AccountRequest = parse_params(ID, params)?;

        ctx.update_title(format!("Open a {} account", request.kind));
        if request.holder.trim().is_empty() {
            ctx.notify_validation(false, Some("Account holder name is required"));
        }
        self.footer(ctx);
        *self.request.lock() = Some(request);
        Ok(())
    }

    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        if self.verified() {
            return self.open(ctx);
        }

        info!("Account opening {} needs KYC {} first", ctx.entry(), REQUIRED_LEVEL);
        ctx.start_nested(kyc::ID, json!({ "target_level": REQUIRED_LEVEL }))
            .await?;
        Ok(())
    }

    async fn resume(
        &self,
        ctx: &WorkflowContext,
        result: &WorkflowResult,
    ) -> Result<(), WorkflowError> {
        let outcome = BankingOutcome::decode(kyc::ID, result)?;
        match outcome {
            Some(BankingOutcome::Kyc { level }) if result.success && level >= REQUIRED_LEVEL => {
                self.open(ctx)
            }
            _ => {
                warn!(
                    "Identity verification for {} did not reach {}",
                    ctx.entry(),
                    REQUIRED_LEVEL
                );
                ctx.notify_validation(
                    true,
                    Some("Identity verification is required to open an account"),
                );
                self.footer(ctx);
                Ok(())
            }
        }
    }
}

pub fn definition(services: Arc<BankingServices>) -> WorkflowDefinition {
    WorkflowDefinition::with_factory(
        ID,
        "Open an account",
        "Open a checking or savings account, verifying identity when needed",
        move || AccountOpeningWorkflow::new(services.clone()),
    )
}
