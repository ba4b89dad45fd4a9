//! In-memory domain services backing the banking workflows.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::info;

use teller_protocols::error::WorkflowError;

/// Customer due diligence level, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum KycLevel {
    #[default]
    None,
    Basic,
    Standard,
    Enhanced,
}

impl KycLevel {
    pub const ALL: [KycLevel; 4] = [
        KycLevel::None,
        KycLevel::Basic,
        KycLevel::Standard,
        KycLevel::Enhanced,
    ];

    /// Levels strictly above `self` up to and including `target`.
    pub fn steps_to(self, target: KycLevel) -> Vec<KycLevel> {
        Self::ALL
            .into_iter()
            .filter(|level| *level > self && *level <= target)
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KycLevel::None => "none",
            KycLevel::Basic => "basic",
            KycLevel::Standard => "standard",
            KycLevel::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for KycLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in customer's verification state.
#[derive(Debug, Default)]
pub struct KycProfile {
    level: RwLock<KycLevel>,
}

impl KycProfile {
    pub fn new(level: KycLevel) -> Self {
        Self {
            level: RwLock::new(level),
        }
    }

    pub fn level(&self) -> KycLevel {
        *self.level.read()
    }

    /// Raise the level. Never lowers it; returns the resulting level.
    pub fn raise_to(&self, level: KycLevel) -> KycLevel {
        let mut current = self.level.write();
        if level > *current {
            info!("KYC level raised from {} to {}", *current, level);
            *current = level;
        }
        *current
    }
}

/// A booked loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub amount: u64,
    pub term_months: u32,
    pub signature: String,
    pub booked_at: DateTime<Utc>,
}

/// Loan ledger issuing sequential ids `L1`, `L2`, ...
#[derive(Debug)]
pub struct LoanBook {
    next_id: AtomicU64,
    loans: Mutex<Vec<Loan>>,
}

impl Default for LoanBook {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            loans: Mutex::new(Vec::new()),
        }
    }
}

impl LoanBook {
    pub fn book(&self, amount: u64, term_months: u32, signature: &str) -> Loan {
        let id = format!("L{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let loan = Loan {
            id,
            amount,
            term_months,
            signature: signature.to_string(),
            booked_at: Utc::now(),
        };
        info!("Booked loan {} for {} over {} months", loan.id, amount, term_months);
        self.loans.lock().push(loan.clone());
        loan
    }

    pub fn loans(&self) -> Vec<Loan> {
        self.loans.lock().clone()
    }
}

/// An opened account and the products active on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub holder: String,
    pub kind: String,
    pub products: Vec<String>,
}

/// Account ledger issuing sequential ids `A1`, `A2`, ...
#[derive(Debug)]
pub struct AccountBook {
    next_id: AtomicU64,
    accounts: Mutex<Vec<Account>>,
}

impl Default for AccountBook {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            accounts: Mutex::new(Vec::new()),
        }
    }
}

impl AccountBook {
    pub fn open(&self, holder: &str, kind: &str) -> Account {
        let account = Account {
            id: format!("A{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            holder: holder.to_string(),
            kind: kind.to_string(),
            products: Vec::new(),
        };
        info!("Opened {} account {} for {}", kind, account.id, holder);
        self.accounts.lock().push(account.clone());
        account
    }

    pub fn get(&self, id: &str) -> Option<Account> {
        self.accounts.lock().iter().find(|a| a.id == id).cloned()
    }

    /// Activate `product` on an account. Activating twice is a no-op.
    pub fn activate(&self, id: &str, product: &str) -> Result<(), WorkflowError> {
        let mut accounts = self.accounts.lock();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| WorkflowError::InvalidParams(format!("Unknown account: {}", id)))?;
        if !account.products.iter().any(|p| p == product) {
            account.products.push(product.to_string());
            info!("Activated {} on account {}", product, id);
        }
        Ok(())
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.lock().clone()
    }
}

/// Services shared by every banking workflow instance.
#[derive(Debug, Default)]
pub struct BankingServices {
    pub kyc: KycProfile,
    pub loans: LoanBook,
    pub accounts: AccountBook,
}

impl BankingServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services for a customer already verified to `level`.
    pub fn with_kyc_level(level: KycLevel) -> Self {
        Self {
            kyc: KycProfile::new(level),
            ..Self::default()
        }
    }
}
