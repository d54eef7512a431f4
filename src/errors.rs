use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid loan terms: {message}")]
    InvalidTerms {
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPayment {
        amount: Money,
    },

    #[error("payment exceeds remaining balance: requested {requested}, maximum acceptable {max_acceptable}")]
    OverpaymentExceedsBalance {
        requested: Money,
        max_acceptable: Money,
    },

    #[error("payment record belongs to a different loan: expected {expected}, found {found}")]
    RecordMismatch {
        expected: Uuid,
        found: Uuid,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
