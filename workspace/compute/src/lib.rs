//! Pure financial computations: recurrence expansion, loan amortization,
//! loan payment state and debt transfers. Nothing in this crate touches the
//! database; services load models, call into these functions and persist the
//! results.

pub mod amortization;
pub mod dates;
pub mod error;
pub mod loan;
pub mod recurrence;
pub mod transfer;

pub use amortization::{build_schedule, schedule_for_dates, LoanTerms, ScheduledPayment};
pub use error::{ComputeError, Result};
pub use loan::{EarlyRepaymentMode, EarlyRepaymentPlan, LoanSummary};
pub use recurrence::{EndRule, RecurrenceSpec, WeekdaySet};
pub use transfer::TransferPlan;
