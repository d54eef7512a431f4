use hourglass_rs::SafeTimeProvider;
use log::info;

use crate::config::{LedgerConfig, LoanTerms};
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::ledger::{apply_payment, Payment, PaymentRecord, Receipt};
use crate::schedule::AmortizationSchedule;
use crate::types::{LoanId, LoanStatus};

/// a loan under servicing: terms, schedule, and payment record in one place.
/// convenience wrapper over the engine and ledger, which remain usable on
/// their own
pub struct Loan {
    pub id: LoanId,
    pub terms: LoanTerms,
    pub config: LedgerConfig,
    pub schedule: AmortizationSchedule,
    pub record: PaymentRecord,
    pub events: EventStore,
}

impl Loan {
    /// build the schedule and open an empty payment record
    pub fn originate(terms: LoanTerms, config: LedgerConfig) -> Result<Self> {
        let schedule = AmortizationSchedule::build(&terms)?;
        let record = PaymentRecord::open(&schedule);

        info!(
            "originated loan {} for {} over {} months",
            terms.loan_id, terms.principal, terms.term_months
        );

        let mut events = EventStore::new();
        events.emit(Event::ScheduleBuilt {
            loan_id: terms.loan_id,
            term_months: terms.term_months,
            installment_count: schedule.installment_count(),
            total_interest: schedule.total_interest,
            total_due: schedule.total_due,
        });

        Ok(Self {
            id: terms.loan_id,
            terms,
            config,
            schedule,
            record,
            events,
        })
    }

    /// resume servicing from a previously persisted record
    pub fn resume(terms: LoanTerms, config: LedgerConfig, record: PaymentRecord) -> Result<Self> {
        let schedule = AmortizationSchedule::build(&terms)?;
        Ok(Self {
            id: terms.loan_id,
            terms,
            config,
            schedule,
            record,
            events: EventStore::new(),
        })
    }

    /// apply a payment; the record is replaced only when application succeeds
    pub fn apply_payment(&mut self, payment: Payment, time: &SafeTimeProvider) -> Result<Receipt> {
        let (updated, receipt) = apply_payment(
            &self.schedule,
            &self.record,
            payment,
            &self.config,
            time,
            &mut self.events,
        )?;
        self.record = updated;
        Ok(receipt)
    }

    pub fn status(&self) -> LoanStatus {
        if self.record.is_settled() {
            LoanStatus::Settled
        } else {
            LoanStatus::Active
        }
    }

    pub fn balance_remaining(&self) -> Money {
        self.record.balance_remaining
    }
}
