pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod loan;
pub mod schedule;
pub mod types;

// re-export key types
pub use config::{LedgerConfig, LoanTerms};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{apply_payment, Payment, PaymentRecord, Receipt, ReceiptView, ScheduleView};
pub use loan::Loan;
pub use schedule::{AmortizationSchedule, Installment};
pub use types::{InstallmentCoverage, LoanId, LoanStatus};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
