use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::LoanId;

/// all events that can be emitted while servicing a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // schedule events
    ScheduleBuilt {
        loan_id: LoanId,
        term_months: u32,
        installment_count: u32,
        total_interest: Money,
        total_due: Money,
    },

    // payment events
    PaymentReceived {
        loan_id: LoanId,
        payment_number: u32,
        amount: Money,
        applied_to_interest: Money,
        applied_to_principal: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentSatisfied {
        loan_id: LoanId,
        installment: u32,
        due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    LateFeeAssessed {
        loan_id: LoanId,
        installment: u32,
        days_late: i64,
        fee: Money,
        timestamp: DateTime<Utc>,
    },
    LoanSettled {
        loan_id: LoanId,
        total_paid: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
