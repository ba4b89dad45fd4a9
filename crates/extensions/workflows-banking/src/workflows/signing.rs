//! Document signing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use teller_protocols::error::WorkflowError;
use teller_protocols::presentation::ModalWidth;
use teller_protocols::workflow::{Workflow, WorkflowContext, WorkflowDefinition};

use super::parse_params;
use crate::outcome::BankingOutcome;
use crate::services::BankingServices;

pub const ID: &str = "signing";

#[derive(Debug, Deserialize)]
struct SigningParams {
    #[serde(default = "default_document")]
    document: String,
}

fn default_document() -> String {
    "Agreement".to_string()
}

/// Presents a document and signs it on the primary action.
#[derive(Default)]
pub struct SigningWorkflow {
    document: Mutex<String>,
}

impl SigningWorkflow {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Workflow for SigningWorkflow {
    async fn initialize(
        &self,
        ctx: &WorkflowContext,
        params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let params: SigningParams = parse_params(ID, params)?;
        ctx.set_modal_width(ModalWidth::Small);
        ctx.update_title(format!("Sign {}", params.document));
        ctx.update_footer(true, Some("Sign"));
        *self.document.lock() = params.document;
        Ok(())
    }

    async fn handle_primary_action(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let document = self.document.lock().clone();
        let signature = format!("SIG-{}", Uuid::new_v4().simple());
        info!("Signed {} ({})", document, ctx.entry());

        let outcome = BankingOutcome::Signing {
            signature,
            signed_at: Utc::now(),
        };
        ctx.complete_with(outcome.into_result()?.with_message(format!("{} signed", document)))
    }
}

pub fn definition(_services: Arc<BankingServices>) -> WorkflowDefinition {
    WorkflowDefinition::with_factory(
        ID,
        "Sign document",
        "Review a document and sign it electronically",
        SigningWorkflow::new,
    )
}
