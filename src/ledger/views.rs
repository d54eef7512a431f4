/// render projections for the presentation collaborator: formatted strings,
/// no layout
use serde::Serialize;
use uuid::Uuid;

use crate::decimal::Money;
use crate::schedule::AmortizationSchedule;
use crate::types::LoanId;

use super::Receipt;

/// table projection of a schedule, one row per installment
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub loan_id: LoanId,
    pub principal: String,
    /// column header carrying the APR, e.g. "Interest (6% APR)"
    pub interest_column: String,
    pub rows: Vec<ScheduleRow>,
    pub total_interest: String,
    pub total_due: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRow {
    pub number: u32,
    pub due_date: String,
    pub beginning_balance: String,
    pub amount_due: String,
    pub principal: String,
    pub interest: String,
    pub ending_balance: String,
}

impl ScheduleView {
    pub fn from_schedule(schedule: &AmortizationSchedule) -> Self {
        let rows = schedule
            .installments
            .iter()
            .map(|installment| ScheduleRow {
                number: installment.number,
                due_date: installment.due_date.format("%B %d, %Y").to_string(),
                beginning_balance: format_usd(installment.beginning_balance),
                amount_due: format_usd(installment.amount_due),
                principal: format_usd(installment.principal_due),
                interest: format_usd(installment.interest_due),
                ending_balance: format_usd(installment.ending_balance),
            })
            .collect();

        Self {
            loan_id: schedule.loan_id,
            principal: format_usd(schedule.principal),
            interest_column: format!(
                "Interest ({}% APR)",
                schedule.annual_rate.as_percentage().normalize()
            ),
            rows,
            total_interest: format_usd(schedule.total_interest),
            total_due: format_usd(schedule.total_due),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// flattened receipt for rendering as a printable document
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptView {
    pub receipt_id: Uuid,
    pub payment_number: u32,
    pub received_date: String,
    pub check_number: String,
    pub received_amount: String,
    pub principal: String,
    pub interest: String,
    pub balance_after: String,
    pub installments_covered: Vec<u32>,
    pub days_late: i64,
    pub late_fee: Option<String>,
    pub notes: String,
    pub settles_loan: bool,
    pub issued_at: String,
}

impl ReceiptView {
    pub fn from_receipt(receipt: &Receipt) -> Self {
        Self {
            receipt_id: receipt.receipt_id,
            payment_number: receipt.payment_number,
            received_date: receipt.payment.date.format("%B %d, %Y").to_string(),
            check_number: receipt.payment.check_number.clone(),
            received_amount: format_usd(receipt.payment.amount),
            principal: format_usd(receipt.applied_to_principal),
            interest: format_usd(receipt.applied_to_interest),
            balance_after: format_usd(receipt.balance_after),
            installments_covered: receipt.installments_advanced(),
            days_late: receipt.days_late,
            late_fee: receipt.late_fee.map(format_usd),
            notes: receipt.payment.notes.clone().unwrap_or_default(),
            settles_loan: receipt.settles_loan,
            issued_at: receipt.issued_at.format("%B %d, %Y").to_string(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// format as a dollar amount with thousands separators, "$1,234.56"
pub fn format_usd(amount: Money) -> String {
    let raw = format!("{:.2}", amount.as_decimal().abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some(parts) => parts,
        None => (raw.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}
