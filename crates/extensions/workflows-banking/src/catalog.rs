//! Registration of the banking workflows.

use std::sync::Arc;

use tracing::info;

use teller_core::WorkflowRegistry;
use teller_protocols::workflow::WorkflowDefinition;

use crate::services::BankingServices;
use crate::workflows::{
    account_opening, kyc, kyc_verification, loan, product_activation, signing,
};

type DefinitionBuilder = fn(Arc<BankingServices>) -> WorkflowDefinition;

/// Every banking workflow id with its definition builder.
pub const CATALOG: [(&str, DefinitionBuilder); 6] = [
    (signing::ID, signing::definition),
    (loan::ID, loan::definition),
    (kyc::ID, kyc::definition),
    (kyc_verification::ID, kyc_verification::definition),
    (account_opening::ID, account_opening::definition),
    (product_activation::ID, product_activation::definition),
];

/// Ids of every banking workflow.
pub fn workflow_ids() -> Vec<&'static str> {
    CATALOG.iter().map(|(id, _)| *id).collect()
}

/// Register every banking workflow not listed in `disabled`.
///
/// Returns the registered ids.
pub fn register_banking_workflows(
    registry: &WorkflowRegistry,
    services: Arc<BankingServices>,
    disabled: &[String],
) -> Vec<&'static str> {
    let mut registered = Vec::new();
    for (id, build) in CATALOG {
        if disabled.iter().any(|d| d == id) {
            info!("Skipping disabled workflow: {}", id);
            continue;
        }
        registry.register(build(services.clone()));
        registered.push(id);
    }
    info!("Registered {} banking workflows", registered.len());
    registered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let registry = WorkflowRegistry::new();
        let registered =
            register_banking_workflows(&registry, Arc::new(BankingServices::new()), &[]);
        assert_eq!(registered.len(), 6);
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.resolve("kyc-verification").unwrap().name, "Verify KYC level");
    }

    #[test]
    fn test_register_skips_disabled() {
        let registry = WorkflowRegistry::new();
        let disabled = vec!["product-activation".to_string()];
        let registered =
            register_banking_workflows(&registry, Arc::new(BankingServices::new()), &disabled);
        assert_eq!(registered.len(), 5);
        assert!(!registry.contains("product-activation"));
    }

    #[test]
    fn test_definition_ids_match_catalog() {
        let services = Arc::new(BankingServices::new());
        for (id, build) in CATALOG {
            assert_eq!(build(services.clone()).id, id);
        }
        assert_eq!(workflow_ids().len(), CATALOG.len());
    }

    #[test]
    fn test_product_activation_loads_lazily() {
        let definition = product_activation::definition(Arc::new(BankingServices::new()));
        assert!(!definition.is_loaded());
    }
}
