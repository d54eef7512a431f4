use chrono::NaiveDate;
use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::LoanTerms;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::types::LoanId;

use super::months_after;

/// one scheduled monthly obligation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub beginning_balance: Money,
    pub amount_due: Money,
    pub interest_due: Money,
    pub principal_due: Money,
    pub ending_balance: Money,
}

/// amortization table for a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub origin_date: NaiveDate,
    pub balloon_month: Option<u32>,
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_due: Money,
}

impl AmortizationSchedule {
    /// build the schedule for the given terms
    ///
    /// every monetary field is rounded to cents at the point it is computed,
    /// never accumulated at full precision and rounded once
    pub fn build(terms: &LoanTerms) -> Result<Self> {
        terms.validate()?;

        let monthly_rate = terms.annual_rate.as_decimal() / dec!(12);
        let level_payment = level_payment_amount(terms.principal, monthly_rate, terms.term_months);
        let months = terms.balloon_month.unwrap_or(terms.term_months);

        debug!(
            "amortizing {} over {} months at {}, level payment {}",
            terms.principal, terms.term_months, terms.annual_rate, level_payment
        );

        let mut installments = Vec::with_capacity(months as usize);
        let mut balance = terms.principal;

        for number in 1..=months {
            let due_date = months_after(terms.origin_date, number)?;
            let interest_due = Money::from_decimal(balance.as_decimal() * monthly_rate);

            // the last generated installment pays the balance off in full:
            // the balloon when one is scheduled, otherwise the final month
            // absorbing accumulated rounding drift
            let principal_due = if number == months {
                balance
            } else {
                level_payment - interest_due
            };

            let amount_due = interest_due + principal_due;
            let ending_balance = balance - principal_due;

            trace!(
                "installment {}: due {}, interest {}, principal {}, balance {}",
                number, due_date, interest_due, principal_due, ending_balance
            );

            installments.push(Installment {
                number,
                due_date,
                beginning_balance: balance,
                amount_due,
                interest_due,
                principal_due,
                ending_balance,
            });

            balance = ending_balance;
        }

        let total_interest = installments
            .iter()
            .map(|p| p.interest_due)
            .fold(Money::ZERO, |acc, x| acc + x);

        let total_due = installments
            .iter()
            .map(|p| p.amount_due)
            .fold(Money::ZERO, |acc, x| acc + x);

        Ok(Self {
            loan_id: terms.loan_id,
            principal: terms.principal,
            annual_rate: terms.annual_rate,
            term_months: terms.term_months,
            origin_date: terms.origin_date,
            balloon_month: terms.balloon_month,
            installments,
            total_interest,
            total_due,
        })
    }

    /// get installment by 1-based number
    pub fn installment(&self, number: u32) -> Option<&Installment> {
        number
            .checked_sub(1)
            .and_then(|i| self.installments.get(i as usize))
    }

    /// number of installments generated (term_months, or balloon_month)
    pub fn installment_count(&self) -> u32 {
        self.installments.len() as u32
    }

    /// level monthly payment for the non-balloon months
    pub fn level_payment(&self) -> Money {
        level_payment_amount(
            self.principal,
            self.annual_rate.as_decimal() / dec!(12),
            self.term_months,
        )
    }
}

/// fixed monthly payment from the standard annuity formula,
/// P * r * (1 + r)^n / ((1 + r)^n - 1)
fn level_payment_amount(principal: Money, monthly_rate: Decimal, term_months: u32) -> Money {
    if monthly_rate.is_zero() {
        return Money::from_decimal(principal.as_decimal() / Decimal::from(term_months));
    }

    let mut compound = Decimal::ONE;
    let base = Decimal::ONE + monthly_rate;
    for _ in 0..term_months {
        compound *= base;
    }

    let numerator = principal.as_decimal() * monthly_rate * compound;
    let denominator = compound - Decimal::ONE;

    Money::from_decimal(numerator / denominator)
}
