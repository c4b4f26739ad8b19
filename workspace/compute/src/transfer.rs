//! Debt transfers between lenders.

use chrono::NaiveDate;
use model::entities::loan::{self, LoanStatus};
use model::entities::loan_payment;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::amortization::{max_periods, schedule_for_dates, ScheduledPayment};
use crate::dates::add_months;
use crate::error::{ComputeError, Result};

fn refused(message: impl Into<String>) -> ComputeError {
    ComputeError::Transfer(message.into())
}

/// Outcome of transferring a loan to another lender, applied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub previous_balance: Decimal,
    pub transfer_amount: Decimal,
    /// `transfer_amount - previous_balance`; positive when the new lender paid more.
    pub amount_difference: Decimal,
    pub annual_rate: Decimal,
    /// New amounts for the first `schedule.len()` open payments in date order,
    /// or a single fresh payment when the loan had none.
    pub schedule: Vec<ScheduledPayment>,
    /// Open payments past the new schedule, to be cancelled.
    pub cancelled: usize,
    /// True when `schedule` reuses the dates of existing open payments.
    pub reuses_open_payments: bool,
}

/// Plans the transfer of `loan` to `to_lender_id`.
///
/// `open` holds the loan's pending and overdue payments; settled payments are
/// never touched.
#[instrument(level = "debug", skip(loan, open), fields(loan_id = loan.id))]
pub fn plan_transfer(
    loan: &loan::Model,
    open: &[loan_payment::Model],
    to_lender_id: i32,
    transfer_amount: Decimal,
    transfer_date: NaiveDate,
    new_annual_rate: Option<Decimal>,
) -> Result<TransferPlan> {
    if to_lender_id == loan.lender_id {
        return Err(refused(format!(
            "loan {} is already held by lender {}",
            loan.id, to_lender_id
        )));
    }
    if transfer_amount <= Decimal::ZERO {
        return Err(refused(format!(
            "transfer amount must be positive, got {}",
            transfer_amount
        )));
    }
    if loan.status == LoanStatus::PaidOff {
        return Err(refused(format!("loan {} is paid off", loan.id)));
    }
    let annual_rate = new_annual_rate.unwrap_or(loan.annual_rate);
    if annual_rate < Decimal::ZERO {
        return Err(refused(format!("annual rate must not be negative, got {}", annual_rate)));
    }

    let mut dates: Vec<NaiveDate> = open.iter().map(|p| p.scheduled_date).collect();
    dates.sort();
    let total_open = dates.len();
    let reuses_open_payments = !dates.is_empty();
    if !reuses_open_payments {
        dates.push(add_months(transfer_date, 1)?);
    }
    let keep = dates.len().min(max_periods(transfer_amount)).max(1);

    let schedule = schedule_for_dates(transfer_amount, annual_rate, loan.payment_scheme, &dates[..keep])?;
    let amount_difference = transfer_amount - loan.remaining_balance;
    debug!(
        from = loan.lender_id,
        to = to_lender_id,
        %amount_difference,
        payments = schedule.len(),
        "Planned debt transfer"
    );

    Ok(TransferPlan {
        previous_balance: loan.remaining_balance,
        transfer_amount,
        amount_difference,
        annual_rate,
        schedule,
        cancelled: if reuses_open_payments { total_open - keep } else { 0 },
        reuses_open_payments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::loan::{LoanType, PaymentScheme};
    use model::entities::loan_payment::{PaymentKind, PaymentStatus};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn collector_loan() -> loan::Model {
        loan::Model {
            id: 3,
            original_lender_id: 1,
            lender_id: 1,
            name: "Microloan".to_string(),
            loan_type: LoanType::Microloan,
            principal: dec!(1000),
            annual_rate: dec!(24),
            term_months: 4,
            issue_date: d(2024, 1, 10),
            payment_scheme: PaymentScheme::Differentiated,
            remaining_balance: dec!(500),
            status: LoanStatus::Overdue,
            description: None,
        }
    }

    fn open_payment(sequence: i32, date: NaiveDate, status: PaymentStatus) -> loan_payment::Model {
        loan_payment::Model {
            id: sequence,
            loan_id: 3,
            lender_id: 1,
            sequence,
            scheduled_date: date,
            principal_amount: dec!(250),
            interest_amount: dec!(5),
            total_amount: dec!(255),
            status,
            kind: PaymentKind::Scheduled,
            executed_date: None,
            transaction_id: None,
        }
    }

    #[test]
    fn test_transfer_reamortizes_open_payments() {
        let loan = collector_loan();
        let open = vec![
            open_payment(4, d(2024, 5, 10), PaymentStatus::Pending),
            open_payment(3, d(2024, 4, 10), PaymentStatus::Overdue),
        ];
        let plan = plan_transfer(&loan, &open, 2, dec!(650), d(2024, 4, 20), None).unwrap();

        assert_eq!(plan.previous_balance, dec!(500));
        assert_eq!(plan.transfer_amount, dec!(650));
        assert_eq!(plan.amount_difference, dec!(150));
        assert_eq!(plan.annual_rate, dec!(24));
        assert!(plan.reuses_open_payments);
        assert_eq!(plan.cancelled, 0);
        assert_eq!(
            plan.schedule.iter().map(|p| p.date).collect::<Vec<_>>(),
            vec![d(2024, 4, 10), d(2024, 5, 10)]
        );
        let principal: Decimal = plan.schedule.iter().map(|p| p.principal).sum();
        assert_eq!(principal, dec!(650));
    }

    #[test]
    fn test_transfer_at_discount_with_new_rate() {
        let loan = collector_loan();
        let open = vec![open_payment(4, d(2024, 5, 10), PaymentStatus::Pending)];
        let plan = plan_transfer(&loan, &open, 2, dec!(400), d(2024, 4, 20), Some(Decimal::ZERO)).unwrap();
        assert_eq!(plan.amount_difference, dec!(-100));
        assert_eq!(plan.schedule.len(), 1);
        assert_eq!(plan.schedule[0].total, dec!(400));
        assert!(plan.schedule[0].interest.is_zero());
    }

    #[test]
    fn test_transfer_without_open_payments_schedules_one() {
        let loan = collector_loan();
        let plan = plan_transfer(&loan, &[], 2, dec!(500), d(2024, 1, 31), None).unwrap();
        assert!(!plan.reuses_open_payments);
        assert_eq!(plan.schedule.len(), 1);
        assert_eq!(plan.schedule[0].date, d(2024, 2, 29));
        assert_eq!(plan.schedule[0].principal, dec!(500));
    }

    #[test]
    fn test_transfer_rejections() {
        let loan = collector_loan();
        assert!(plan_transfer(&loan, &[], 1, dec!(500), d(2024, 4, 20), None).is_err());
        assert!(plan_transfer(&loan, &[], 2, dec!(0), d(2024, 4, 20), None).is_err());
        assert!(plan_transfer(&loan, &[], 2, dec!(500), d(2024, 4, 20), Some(dec!(-1))).is_err());

        let mut paid_off = loan.clone();
        paid_off.status = LoanStatus::PaidOff;
        assert!(plan_transfer(&paid_off, &[], 2, dec!(500), d(2024, 4, 20), None).is_err());
    }
}
