//! Payment product activation.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use teller_protocols::error::WorkflowError;
use teller_protocols::result::WorkflowResult;
use teller_protocols::workflow::{
    LazyLoader, Workflow, WorkflowContext, WorkflowDefinition, WorkflowFactory,
};

use super::{parse_params, signing};
use crate::outcome::BankingOutcome;
use crate::services::BankingServices;

pub const ID: &str = "product-activation";

#[derive(Debug, Clone, Deserialize)]
struct ActivationRequest {
    account_id: String,
    product: String,
}

/// Activates a product on an existing account once its terms are signed.
/// Unsigned terms cancel the activation.
pub struct ProductActivationWorkflow {
    services: Arc<BankingServices>,
    request: Mutex<Option<ActivationRequest>>,
}

impl ProductActivationWorkflow {
    pub fn new(services: Arc<BankingServices>) -> Self {
        Self {
            services,
            request: Mutex::new(None),
        }
    }

    fn request(&self) -> Result<ActivationRequest, WorkflowError> {
        self.request
            .lock()
            .clone()
            .ok_or_else(|| WorkflowError::Custom("activation request not initialized".to_string()))
    }
}

#[async_trait]
impl Workflow for ProductActivationWorkflow {
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let request: ActivationRequest = parse_params(ID, params)?;
        if self.services.accounts.get(&request.account_id).is_none() {
            return Err(WorkflowError::InvalidParams(format!(
                "Unknown account: {}",
                request.account_id
            )));
        }

        ctx.update_title(format!(
            "Activate {} on account {}",
            request.product, request.account_id
        ));
        ctx.update_footer(true, Some("Review terms"));
        *self.request.lock() = Some(request);
        Ok(())
    }

    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let request = self.request()?;
        ctx.start_nested(
            signing::ID,
            json!({ "document": format!("{} terms", request.product) }),
        )
        .await?;
        Ok(())
    }

    async fn resume(
        &self,
        ctx: &WorkflowContext,
        result: &WorkflowResult,
    ) -> Result<(), WorkflowError> {
        let signed = result.success
            && matches!(
                BankingOutcome::decode(signing::ID, result)?,
                Some(BankingOutcome::Signing { .. })
            );
        if !signed {
            return ctx.cancel(Some("Activation terms were not signed"));
        }

        let request = self.request()?;
        self.services
            .accounts
            .activate(&request.account_id, &request.product)?;
        ctx.complete_with(
            BankingOutcome::ProductActivation {
                account_id: request.account_id,
                product: request.product,
            }
            .into_result()?,
        )
    }
}

/// Product terms are loaded on first use.
pub fn definition(services: Arc<BankingServices>) -> WorkflowDefinition {
    WorkflowDefinition::new(
        ID,
        "Activate a product",
        "Activate a card or payment product on an existing account",
        LazyLoader::new(move || {
            let services = services.clone();
            async move {
                debug!("Loading product activation workflow");
                let factory: Arc<dyn WorkflowFactory> =
                    Arc::new(move || ProductActivationWorkflow::new(services.clone()));
                Ok::<_, WorkflowError>(factory)
            }
        }),
    )
}
