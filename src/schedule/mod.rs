pub mod amortization;

pub use amortization::{AmortizationSchedule, Installment};

use chrono::{Months, NaiveDate};

use crate::errors::{LedgerError, Result};

/// calendar date `count` months after `origin`, day-of-month clamped to
/// month end (Jan 31 + 1 month = Feb 28)
pub(crate) fn months_after(origin: NaiveDate, count: u32) -> Result<NaiveDate> {
    origin
        .checked_add_months(Months::new(count))
        .ok_or_else(|| LedgerError::InvalidTerms {
            message: format!("due date out of calendar range: {} + {} months", origin, count),
        })
}
