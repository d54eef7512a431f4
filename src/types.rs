use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// loan status derived from the payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// installments remain outstanding
    Active,
    /// every installment satisfied, balance at zero
    Settled,
}

/// how a single payment landed on one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentCoverage {
    pub installment: u32,
    pub due_date: NaiveDate,
    pub to_interest: Money,
    pub to_principal: Money,
    /// amount still due on this installment after the payment
    pub outstanding_after: Money,
    pub satisfied: bool,
}

impl InstallmentCoverage {
    pub fn total_applied(&self) -> Money {
        self.to_interest + self.to_principal
    }
}
