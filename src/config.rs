use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::LoanId;

/// terms of a single amortizing loan, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub origin_date: NaiveDate,
    /// 1-indexed month at which the full remaining balance falls due
    pub balloon_month: Option<u32>,
}

impl LoanTerms {
    /// create terms for a fully amortizing loan
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        origin_date: NaiveDate,
    ) -> Result<Self> {
        let terms = Self {
            loan_id: Uuid::new_v4(),
            principal,
            annual_rate,
            term_months,
            origin_date,
            balloon_month: None,
        };
        terms.validate()?;
        Ok(terms)
    }

    /// create terms with a balloon payoff at `balloon_month`
    pub fn with_balloon(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        origin_date: NaiveDate,
        balloon_month: u32,
    ) -> Result<Self> {
        let terms = Self {
            loan_id: Uuid::new_v4(),
            principal,
            annual_rate,
            term_months,
            origin_date,
            balloon_month: Some(balloon_month),
        };
        terms.validate()?;
        Ok(terms)
    }

    /// check every invariant, returning `InvalidTerms` on the first violation
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() || self.principal.is_zero() {
            return Err(LedgerError::InvalidTerms {
                message: format!("principal must be positive, got {}", self.principal),
            });
        }

        if self.annual_rate.is_negative() {
            return Err(LedgerError::InvalidTerms {
                message: format!("annual rate cannot be negative, got {}", self.annual_rate),
            });
        }

        if self.term_months == 0 {
            return Err(LedgerError::InvalidTerms {
                message: "term must be at least one month".to_string(),
            });
        }

        if let Some(month) = self.balloon_month {
            if month == 0 || month > self.term_months {
                return Err(LedgerError::InvalidTerms {
                    message: format!(
                        "balloon month {} outside 1..={}",
                        month, self.term_months
                    ),
                });
            }
        }

        Ok(())
    }

    /// monthly periodic rate
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate.monthly_rate()
    }
}

/// ledger behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LedgerConfig {
    /// annual rate for informational late fees on receipts; `None` disables them.
    /// late fees never feed back into the running balance
    pub late_fee_annual_rate: Option<Rate>,
}

impl LedgerConfig {
    /// late-fee accrual at 18% APR, the conventional servicing rate
    pub fn with_standard_late_fees() -> Self {
        Self {
            late_fee_annual_rate: Some(Rate::from_percentage(18)),
        }
    }
}
