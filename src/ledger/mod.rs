pub mod receipt;
pub mod views;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::schedule::AmortizationSchedule;
use crate::types::{InstallmentCoverage, LoanId};

pub use receipt::Receipt;
pub use views::{ReceiptView, ScheduleView};

/// a single payment received against the loan, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Money,
    pub date: NaiveDate,
    /// check number or payment type ("1042", "ACH", "Cash")
    pub check_number: String,
    pub notes: Option<String>,
}

impl Payment {
    pub fn new(amount: Money, date: NaiveDate, check_number: impl Into<String>) -> Self {
        Self {
            amount,
            date,
            check_number: check_number.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// running record of payments applied against a schedule
///
/// the record is a plain value: `apply_payment` consumes the current state
/// and returns the advanced one, and the storage collaborator is responsible
/// for loading and persisting it atomically between invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub loan_id: LoanId,
    pub payments: Vec<Payment>,
    /// total still owed across all unsatisfied installments
    pub balance_remaining: Money,
    /// 1-based index of the first unsatisfied installment
    pub next_installment: u32,
    /// partial amount already paid toward `next_installment`
    pub paid_toward_next: Money,
    pub total_paid: Money,
}

impl PaymentRecord {
    /// empty record for a freshly built schedule
    pub fn open(schedule: &AmortizationSchedule) -> Self {
        Self {
            loan_id: schedule.loan_id,
            payments: Vec::new(),
            balance_remaining: schedule.total_due,
            next_installment: 1,
            paid_toward_next: Money::ZERO,
            total_paid: Money::ZERO,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.balance_remaining.is_zero()
    }

    pub fn payment_count(&self) -> u32 {
        self.payments.len() as u32
    }

    /// installments fully satisfied so far
    pub fn installments_satisfied(&self) -> u32 {
        self.next_installment - 1
    }

    /// storage contract: serialize for the persistence collaborator
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// storage contract: reload a persisted record
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// apply one payment against the schedule, returning the advanced record
/// and a receipt
///
/// the input `history` is never mutated: on error nothing has changed, and
/// the caller must not persist a rejected attempt. the caller must also hold
/// exclusive access to the stored record for the duration of its
/// read-modify-write cycle
pub fn apply_payment(
    schedule: &AmortizationSchedule,
    history: &PaymentRecord,
    payment: Payment,
    config: &LedgerConfig,
    time: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<(PaymentRecord, Receipt)> {
    if payment.amount.is_zero() || payment.amount.is_negative() {
        return Err(LedgerError::InvalidPayment {
            amount: payment.amount,
        });
    }

    if history.loan_id != schedule.loan_id {
        return Err(LedgerError::RecordMismatch {
            expected: schedule.loan_id,
            found: history.loan_id,
        });
    }

    if payment.amount > history.balance_remaining {
        return Err(LedgerError::OverpaymentExceedsBalance {
            requested: payment.amount,
            max_acceptable: history.balance_remaining,
        });
    }

    info!(
        "processing payment of {} received {}",
        payment.amount, payment.date
    );

    // consume the amount against installments strictly in schedule order,
    // interest before principal within each installment
    let mut remaining = payment.amount;
    let mut coverage: Vec<InstallmentCoverage> = Vec::new();
    let mut cursor = history.next_installment;
    let mut paid_toward_cursor = history.paid_toward_next;

    while remaining > Money::ZERO {
        let installment = match schedule.installment(cursor) {
            Some(p) => p,
            None => break,
        };

        let outstanding = installment.amount_due - paid_toward_cursor;
        let applied = remaining.min(outstanding);

        let interest_already = paid_toward_cursor.min(installment.interest_due);
        let interest_open = installment.interest_due - interest_already;
        let to_interest = applied.min(interest_open);
        let to_principal = applied - to_interest;

        let outstanding_after = outstanding - applied;
        let satisfied = outstanding_after.is_zero();

        debug!(
            "installment {}: applied {} ({} interest, {} principal), {} still due",
            installment.number, applied, to_interest, to_principal, outstanding_after
        );

        coverage.push(InstallmentCoverage {
            installment: installment.number,
            due_date: installment.due_date,
            to_interest,
            to_principal,
            outstanding_after,
            satisfied,
        });

        remaining -= applied;
        if satisfied {
            cursor += 1;
            paid_toward_cursor = Money::ZERO;
        } else {
            paid_toward_cursor += applied;
        }
    }

    let mut updated = history.clone();
    updated.payments.push(payment.clone());
    updated.total_paid += payment.amount;
    updated.balance_remaining = history.balance_remaining - payment.amount;
    updated.next_installment = cursor;
    updated.paid_toward_next = paid_toward_cursor;

    let (days_late, late_fee) = assess_late_fee(&payment, &coverage, schedule, config);

    let now = time.now();
    let receipt = Receipt::summarize(
        schedule.loan_id,
        updated.payment_count(),
        payment,
        coverage,
        updated.balance_remaining,
        days_late,
        late_fee,
        now,
    );

    events.emit(Event::PaymentReceived {
        loan_id: schedule.loan_id,
        payment_number: receipt.payment_number,
        amount: receipt.payment.amount,
        applied_to_interest: receipt.applied_to_interest,
        applied_to_principal: receipt.applied_to_principal,
        timestamp: now,
    });

    for entry in receipt.coverage.iter().filter(|c| c.satisfied) {
        events.emit(Event::InstallmentSatisfied {
            loan_id: schedule.loan_id,
            installment: entry.installment,
            due_date: entry.due_date,
            timestamp: now,
        });
    }

    if let Some(fee) = receipt.late_fee {
        events.emit(Event::LateFeeAssessed {
            loan_id: schedule.loan_id,
            installment: receipt.first_installment(),
            days_late: receipt.days_late,
            fee,
            timestamp: now,
        });
    }

    if updated.is_settled() {
        info!("loan {} settled in full", schedule.loan_id);
        events.emit(Event::LoanSettled {
            loan_id: schedule.loan_id,
            total_paid: updated.total_paid,
            timestamp: now,
        });
    }

    Ok((updated, receipt))
}

/// informational late fee against the first installment the payment touches.
/// recorded on the receipt only, never added to the balance
fn assess_late_fee(
    payment: &Payment,
    coverage: &[InstallmentCoverage],
    schedule: &AmortizationSchedule,
    config: &LedgerConfig,
) -> (i64, Option<Money>) {
    let first = match coverage.first() {
        Some(entry) => entry,
        None => return (0, None),
    };

    let days_late = (payment.date - first.due_date).num_days();
    if days_late <= 0 {
        return (0, None);
    }

    let fee = config.late_fee_annual_rate.and_then(|rate| {
        schedule.installment(first.installment).map(|installment| {
            Money::from_decimal(
                installment.principal_due.as_decimal()
                    * rate.daily_rate().as_decimal()
                    * rust_decimal::Decimal::from(days_late),
            )
        })
    });

    (days_late, fee)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanTerms;
    use crate::decimal::Rate;
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use test_log::test;

    fn frozen_clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn origin() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    /// 1200 at 0% over 12 months: twelve installments of 100.00 even
    fn flat_loan() -> (AmortizationSchedule, PaymentRecord) {
        let terms = LoanTerms::new(Money::from_major(1200), Rate::ZERO, 12, origin()).unwrap();
        let schedule = AmortizationSchedule::build(&terms).unwrap();
        let record = PaymentRecord::open(&schedule);
        (schedule, record)
    }

    fn pay(amount: i64, day: u32) -> Payment {
        Payment::new(
            Money::from_major(amount),
            NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            "1001",
        )
    }

    #[test]
    fn test_exact_payment_satisfies_one_installment() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        let (updated, receipt) = apply_payment(
            &schedule,
            &record,
            pay(100, 15),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        assert_eq!(updated.balance_remaining, Money::from_major(1100));
        assert_eq!(updated.next_installment, 2);
        assert_eq!(updated.paid_toward_next, Money::ZERO);
        assert_eq!(updated.payment_count(), 1);

        assert_eq!(receipt.coverage.len(), 1);
        assert!(receipt.coverage[0].satisfied);
        assert_eq!(receipt.installments_advanced(), vec![1]);
        assert_eq!(receipt.balance_after, Money::from_major(1100));
        assert!(!receipt.settles_loan);
    }

    #[test]
    fn test_surplus_rolls_into_later_installments() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        let (updated, receipt) = apply_payment(
            &schedule,
            &record,
            pay(250, 15),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        // 250 = installments 1 and 2 in full, half of installment 3
        assert_eq!(updated.next_installment, 3);
        assert_eq!(updated.paid_toward_next, Money::from_major(50));
        assert_eq!(updated.balance_remaining, Money::from_major(950));

        assert_eq!(receipt.installments_advanced(), vec![1, 2]);
        assert_eq!(receipt.coverage.len(), 3);
        assert!(!receipt.coverage[2].satisfied);
        assert_eq!(receipt.coverage[2].outstanding_after, Money::from_major(50));
    }

    #[test]
    fn test_underpayment_leaves_residual_on_installment() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        let (after_partial, receipt) = apply_payment(
            &schedule,
            &record,
            pay(40, 15),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        assert_eq!(after_partial.next_installment, 1);
        assert_eq!(after_partial.paid_toward_next, Money::from_major(40));
        assert!(receipt.installments_advanced().is_empty());
        assert_eq!(receipt.coverage[0].outstanding_after, Money::from_major(60));

        // the residual 60 plus the next installment clears with 160
        let (after_catchup, receipt) = apply_payment(
            &schedule,
            &after_partial,
            pay(160, 20),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        assert_eq!(after_catchup.next_installment, 3);
        assert_eq!(after_catchup.paid_toward_next, Money::ZERO);
        assert_eq!(receipt.installments_advanced(), vec![1, 2]);
    }

    #[test]
    fn test_interest_portion_paid_before_principal() {
        let terms = LoanTerms::new(
            Money::from_major(10_000),
            Rate::from_percentage(6),
            1,
            origin(),
        )
        .unwrap();
        let schedule = AmortizationSchedule::build(&terms).unwrap();
        let record = PaymentRecord::open(&schedule);
        let mut events = EventStore::new();

        // 30 covers interest only (50 due)
        let (partial, receipt) = apply_payment(
            &schedule,
            &record,
            pay(30, 15),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();
        assert_eq!(receipt.applied_to_interest, Money::from_major(30));
        assert_eq!(receipt.applied_to_principal, Money::ZERO);

        // the rest: 20 of interest, then all principal
        let (settled, receipt) = apply_payment(
            &schedule,
            &partial,
            pay(10_020, 20),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();
        assert_eq!(receipt.applied_to_interest, Money::from_major(20));
        assert_eq!(receipt.applied_to_principal, Money::from_major(10_000));
        assert!(settled.is_settled());
        assert!(receipt.settles_loan);
    }

    #[test]
    fn test_payments_summing_to_total_settle_the_loan() {
        let (schedule, mut record) = flat_loan();
        let mut events = EventStore::new();

        for amount in [500, 400, 300] {
            let (updated, _) = apply_payment(
                &schedule,
                &record,
                pay(amount, 15),
                &LedgerConfig::default(),
                &frozen_clock(),
                &mut events,
            )
            .unwrap();
            record = updated;
        }

        assert!(record.is_settled());
        assert_eq!(record.balance_remaining, Money::ZERO);
        assert_eq!(record.installments_satisfied(), 12);
        assert_eq!(record.total_paid, Money::from_major(1200));

        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::LoanSettled { .. })));
        let satisfied = events
            .events()
            .iter()
            .filter(|e| matches!(e, Event::InstallmentSatisfied { .. }))
            .count();
        assert_eq!(satisfied, 12);
    }

    #[test]
    fn test_overpayment_beyond_balance_rejected_without_mutation() {
        let (schedule, record) = flat_loan();
        let snapshot = record.clone();
        let mut events = EventStore::new();

        let err = apply_payment(
            &schedule,
            &record,
            pay(1300, 15),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap_err();

        match err {
            LedgerError::OverpaymentExceedsBalance {
                requested,
                max_acceptable,
            } => {
                assert_eq!(requested, Money::from_major(1300));
                assert_eq!(max_acceptable, Money::from_major(1200));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(record, snapshot);
        assert!(events.events().is_empty());
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        for amount in [Money::ZERO, Money::from_major(-50)] {
            let payment = Payment::new(amount, origin(), "1001");
            let err = apply_payment(
                &schedule,
                &record,
                payment,
                &LedgerConfig::default(),
                &frozen_clock(),
                &mut events,
            )
            .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidPayment { .. }));
        }
    }

    #[test]
    fn test_record_for_wrong_loan_rejected() {
        let (schedule, _) = flat_loan();
        let (_, foreign_record) = flat_loan();
        let mut events = EventStore::new();

        let err = apply_payment(
            &schedule,
            &foreign_record,
            pay(100, 15),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::RecordMismatch { .. }));
    }

    #[test]
    fn test_payment_date_does_not_affect_balance() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        // paid months ahead of the due date: still lands on installment 1
        let early = Payment::new(
            Money::from_major(100),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            "ACH",
        );
        let (updated, receipt) = apply_payment(
            &schedule,
            &record,
            early,
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        assert_eq!(receipt.installments_advanced(), vec![1]);
        assert_eq!(updated.balance_remaining, Money::from_major(1100));
        assert_eq!(receipt.days_late, 0);
        assert_eq!(receipt.late_fee, None);
    }

    #[test]
    fn test_late_fee_assessed_on_receipt_only() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        // first installment due 2026-02-15, paid 10 days later
        let (updated, receipt) = apply_payment(
            &schedule,
            &record,
            pay(100, 25),
            &LedgerConfig::with_standard_late_fees(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        assert_eq!(receipt.days_late, 10);
        // 100.00 principal * 0.18 / 365 * 10 days
        assert_eq!(receipt.late_fee, Some(Money::from_cents(49)));

        // the fee never feeds back into the balance
        assert_eq!(updated.balance_remaining, Money::from_major(1100));
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::LateFeeAssessed { days_late: 10, .. })));
    }

    #[test]
    fn test_record_json_round_trip() {
        let (schedule, record) = flat_loan();
        let mut events = EventStore::new();

        let (updated, _) = apply_payment(
            &schedule,
            &record,
            pay(250, 15).with_notes("february and march"),
            &LedgerConfig::default(),
            &frozen_clock(),
            &mut events,
        )
        .unwrap();

        let json = updated.to_json_pretty().unwrap();
        let reloaded = PaymentRecord::from_json(&json).unwrap();
        assert_eq!(reloaded, updated);
    }
}
