//! Loan payment state: overdue detection, execution, status and early repayment.

use chrono::NaiveDate;
use model::entities::loan::{self, LoanStatus, PaymentScheme};
use model::entities::loan_payment::{self, PaymentStatus};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::amortization::{
    max_periods, monthly_rate, round_money, schedule_for_dates, ScheduledPayment,
};
use crate::dates::add_months;
use crate::error::{ComputeError, Result};

fn refused(message: impl Into<String>) -> ComputeError {
    ComputeError::Loan(message.into())
}

/// Status an open payment should carry on `today`.
///
/// Settled and cancelled payments keep their status.
pub fn refresh_status(status: PaymentStatus, scheduled: NaiveDate, today: NaiveDate) -> PaymentStatus {
    match status {
        PaymentStatus::Pending if scheduled < today => PaymentStatus::Overdue,
        PaymentStatus::Overdue if scheduled >= today => PaymentStatus::Pending,
        other => other,
    }
}

/// Status of a payment executed on `executed_on`.
pub fn execution_status(scheduled: NaiveDate, executed_on: NaiveDate) -> PaymentStatus {
    if executed_on <= scheduled {
        PaymentStatus::Executed
    } else {
        PaymentStatus::ExecutedLate
    }
}

/// Status of a loan derived from its balance and payments.
pub fn loan_status(remaining_balance: Decimal, payments: &[loan_payment::Model]) -> LoanStatus {
    let mut open = payments.iter().filter(|p| p.status.is_open()).peekable();
    if remaining_balance <= Decimal::ZERO || open.peek().is_none() {
        return LoanStatus::PaidOff;
    }
    if open.any(|p| p.status == PaymentStatus::Overdue) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

/// Aggregated figures of one loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanSummary {
    pub total_paid: Decimal,
    pub principal_paid: Decimal,
    pub interest_paid: Decimal,
    pub remaining_balance: Decimal,
    pub open_payments: usize,
    pub overdue_payments: usize,
    pub next_payment_date: Option<NaiveDate>,
    pub next_payment_amount: Option<Decimal>,
}

pub fn summarize(loan: &loan::Model, payments: &[loan_payment::Model]) -> LoanSummary {
    let settled = payments.iter().filter(|p| p.status.is_settled());
    let principal_paid: Decimal = settled.clone().map(|p| p.principal_amount).sum();
    let interest_paid: Decimal = settled.map(|p| p.interest_amount).sum();

    let open: Vec<_> = payments.iter().filter(|p| p.status.is_open()).collect();
    let next = open.iter().min_by_key(|p| (p.scheduled_date, p.sequence));

    LoanSummary {
        total_paid: principal_paid + interest_paid,
        principal_paid,
        interest_paid,
        remaining_balance: loan.remaining_balance,
        open_payments: open.len(),
        overdue_payments: open
            .iter()
            .filter(|p| p.status == PaymentStatus::Overdue)
            .count(),
        next_payment_date: next.map(|p| p.scheduled_date),
        next_payment_amount: next.map(|p| p.total_amount),
    }
}

/// How the schedule shrinks after a partial early repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyRepaymentMode {
    /// Keep the number of payments and lower each of them.
    ReducePayment,
    /// Keep the periodic payment and drop trailing payments.
    ReduceTerm,
}

/// Outcome of an early repayment, applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarlyRepaymentPlan {
    /// Part of the amount applied to principal.
    pub principal_paid: Decimal,
    pub new_balance: Decimal,
    /// New amounts for the first `schedule.len()` open payments, in date order.
    pub schedule: Vec<ScheduledPayment>,
    /// Open payments past the new schedule, to be cancelled.
    pub cancelled: usize,
    pub paid_off: bool,
}

/// Plans an early repayment of `amount` on `date`.
///
/// `open` holds the loan's pending and overdue payments.
#[instrument(level = "debug", skip(loan, open), fields(loan_id = loan.id))]
pub fn plan_early_repayment(
    loan: &loan::Model,
    open: &[loan_payment::Model],
    amount: Decimal,
    date: NaiveDate,
    mode: EarlyRepaymentMode,
) -> Result<EarlyRepaymentPlan> {
    if amount <= Decimal::ZERO {
        return Err(refused(format!("repayment amount must be positive, got {}", amount)));
    }
    if loan.status == LoanStatus::PaidOff || loan.remaining_balance <= Decimal::ZERO {
        return Err(refused(format!("loan {} is already paid off", loan.id)));
    }
    if open
        .iter()
        .any(|p| p.status == PaymentStatus::Overdue || p.scheduled_date < date)
    {
        return Err(refused(format!(
            "loan {} has overdue payments, settle them before repaying early",
            loan.id
        )));
    }

    let mut dates: Vec<NaiveDate> = open.iter().map(|p| p.scheduled_date).collect();
    dates.sort();
    let total_open = dates.len();

    if amount >= loan.remaining_balance {
        debug!("Early repayment covers the remaining balance");
        return Ok(EarlyRepaymentPlan {
            principal_paid: loan.remaining_balance,
            new_balance: Decimal::ZERO,
            schedule: Vec::new(),
            cancelled: total_open,
            paid_off: true,
        });
    }

    let new_balance = loan.remaining_balance - amount;
    if dates.is_empty() {
        dates.push(add_months(date, 1)?);
    }

    let keep = match mode {
        EarlyRepaymentMode::ReducePayment => dates.len(),
        EarlyRepaymentMode::ReduceTerm => {
            let mut ordered: Vec<_> = open.iter().collect();
            ordered.sort_by_key(|p| (p.scheduled_date, p.sequence));
            let reference = ordered.first().map(|p| match loan.payment_scheme {
                PaymentScheme::Annuity => p.total_amount,
                PaymentScheme::Differentiated => p.principal_amount,
            });
            match reference {
                Some(payment) => periods_needed(new_balance, loan.annual_rate, loan.payment_scheme, payment)
                    .min(dates.len()),
                None => dates.len(),
            }
        }
    };
    let keep = keep.min(max_periods(new_balance)).max(1);

    let schedule = schedule_for_dates(new_balance, loan.annual_rate, loan.payment_scheme, &dates[..keep])?;
    debug!(
        new_balance = %new_balance,
        kept = keep,
        cancelled = total_open.saturating_sub(keep),
        "Planned early repayment"
    );
    Ok(EarlyRepaymentPlan {
        principal_paid: amount,
        new_balance,
        schedule,
        cancelled: total_open.saturating_sub(keep),
        paid_off: false,
    })
}

/// Payments needed to clear `balance` when paying `payment` each period.
///
/// For differentiated schemes `payment` is the principal portion.
fn periods_needed(balance: Decimal, annual_rate: Decimal, scheme: PaymentScheme, payment: Decimal) -> usize {
    let rate = monthly_rate(annual_rate);
    let mut remaining = balance;
    let mut periods = 0usize;
    while remaining > Decimal::ZERO {
        let principal = match scheme {
            PaymentScheme::Annuity => payment - round_money(remaining * rate),
            PaymentScheme::Differentiated => payment,
        };
        if principal <= Decimal::ZERO {
            return usize::MAX;
        }
        remaining -= principal;
        periods += 1;
        if periods >= max_periods(balance) {
            break;
        }
    }
    periods.max(1)
}
