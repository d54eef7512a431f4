use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{InstallmentCoverage, LoanId};

use super::Payment;

/// printable record of one applied payment: a read-only projection produced
/// for the presentation collaborator, not stored as primary state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: Uuid,
    pub loan_id: LoanId,
    /// ordinal of this payment within the record
    pub payment_number: u32,
    pub payment: Payment,
    /// per-installment split of the amount, in schedule order
    pub coverage: Vec<InstallmentCoverage>,
    pub applied_to_interest: Money,
    pub applied_to_principal: Money,
    pub balance_after: Money,
    /// days past the due date of the first installment touched; 0 if on time
    pub days_late: i64,
    /// informational fee, never part of the balance
    pub late_fee: Option<Money>,
    pub settles_loan: bool,
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn summarize(
        loan_id: LoanId,
        payment_number: u32,
        payment: Payment,
        coverage: Vec<InstallmentCoverage>,
        balance_after: Money,
        days_late: i64,
        late_fee: Option<Money>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let applied_to_interest = coverage
            .iter()
            .map(|c| c.to_interest)
            .fold(Money::ZERO, |acc, x| acc + x);

        let applied_to_principal = coverage
            .iter()
            .map(|c| c.to_principal)
            .fold(Money::ZERO, |acc, x| acc + x);

        Self {
            receipt_id: Uuid::new_v4(),
            loan_id,
            payment_number,
            payment,
            coverage,
            applied_to_interest,
            applied_to_principal,
            balance_after,
            days_late,
            late_fee,
            settles_loan: balance_after.is_zero(),
            issued_at,
        }
    }

    /// total applied across interest and principal
    pub fn amount_applied(&self) -> Money {
        self.applied_to_interest + self.applied_to_principal
    }

    /// numbers of the installments this payment fully satisfied
    pub fn installments_advanced(&self) -> Vec<u32> {
        self.coverage
            .iter()
            .filter(|c| c.satisfied)
            .map(|c| c.installment)
            .collect()
    }

    /// number of the first installment the payment touched
    pub fn first_installment(&self) -> u32 {
        self.coverage.first().map(|c| c.installment).unwrap_or(0)
    }
}
