//! # Teller Banking Workflows
//!
//! Guided procedures of the banking dashboard, written against the Teller
//! workflow contract.
//!
//! ## Workflows
//!
//! - `signing`: Sign a document and return the signature
//! - `loan`: Loan application, nests `signing` for the agreement
//! - `kyc`: Raise the customer's KYC level one step at a time via `kyc-verification`
//! - `kyc-verification`: Verify a single KYC level
//! - `account-opening`: Open an account, nesting `kyc` when the customer is not verified
//! - `product-activation`: Activate a payment product after signing its terms

pub mod catalog;
pub mod outcome;
pub mod services;
pub mod workflows;

pub use catalog::{CATALOG, register_banking_workflows, workflow_ids};
pub use outcome::BankingOutcome;
pub use services::{Account, AccountBook, BankingServices, KycLevel, KycProfile, Loan, LoanBook};
