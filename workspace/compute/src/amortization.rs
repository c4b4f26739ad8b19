//! Loan amortization schedules.
//!
//! Amounts are rounded to cents with midpoint-away-from-zero rounding. The last
//! payment of every schedule absorbs the rounding remainder, so principal
//! portions always sum to the amortized balance.

use chrono::NaiveDate;
use model::entities::loan::{self, PaymentScheme};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, instrument};

use crate::dates::add_months;
use crate::error::{ComputeError, Result};

/// Smallest amount a single payment may carry.
pub const MIN_PAYMENT: Decimal = dec!(0.01);

fn invalid(message: impl Into<String>) -> ComputeError {
    ComputeError::Amortization(message.into())
}

/// One row of an amortization table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPayment {
    /// 1-based position in the schedule.
    pub sequence: u32,
    pub date: NaiveDate,
    pub principal: Decimal,
    pub interest: Decimal,
    pub total: Decimal,
    /// Outstanding principal once this payment is made.
    pub balance_after: Decimal,
}

/// Parameters of a loan's original schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanTerms {
    pub principal: Decimal,
    /// Yearly rate in percent, e.g. `12` for 12 %.
    pub annual_rate: Decimal,
    pub term_months: u32,
    pub issue_date: NaiveDate,
    pub scheme: PaymentScheme,
}

impl LoanTerms {
    pub fn from_loan(loan: &loan::Model) -> Result<Self> {
        let term_months = u32::try_from(loan.term_months)
            .map_err(|_| invalid(format!("term must be positive, got {}", loan.term_months)))?;
        Ok(Self {
            principal: loan.principal,
            annual_rate: loan.annual_rate,
            term_months,
            issue_date: loan.issue_date,
            scheme: loan.payment_scheme,
        })
    }
}

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly rate as a fraction: `annual / 100 / 12`.
pub fn monthly_rate(annual_rate: Decimal) -> Decimal {
    annual_rate / dec!(100) / dec!(12)
}

/// Unrounded level payment `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P/n` when `r = 0`.
pub fn annuity_payment(balance: Decimal, monthly_rate: Decimal, periods: u32) -> Result<Decimal> {
    if periods == 0 {
        return Err(invalid("number of periods must be at least 1"));
    }
    if monthly_rate.is_zero() {
        return Ok(balance / Decimal::from(periods));
    }

    let overflow = || ComputeError::Decimal("annuity factor overflow".to_string());
    let growth = (Decimal::ONE + monthly_rate)
        .checked_powu(periods as u64)
        .ok_or_else(overflow)?;
    balance
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
        .ok_or_else(overflow)
}

/// Payment dates `issue_date + k months` for `k` in `1..=count`.
pub fn payment_dates(issue_date: NaiveDate, count: u32) -> Result<Vec<NaiveDate>> {
    (1..=count).map(|k| add_months(issue_date, k)).collect()
}

/// Full schedule of a new loan.
#[instrument(level = "debug")]
pub fn build_schedule(terms: &LoanTerms) -> Result<Vec<ScheduledPayment>> {
    if terms.term_months == 0 {
        return Err(invalid("term must be at least one month"));
    }
    let dates = payment_dates(terms.issue_date, terms.term_months)?;
    schedule_for_dates(terms.principal, terms.annual_rate, terms.scheme, &dates)
}

/// Largest number of payments `balance` can be spread over.
pub fn max_periods(balance: Decimal) -> usize {
    (balance / MIN_PAYMENT)
        .floor()
        .to_u64()
        .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX))
}

/// Amortizes `balance` over an explicit, strictly increasing list of dates.
pub fn schedule_for_dates(
    balance: Decimal,
    annual_rate: Decimal,
    scheme: PaymentScheme,
    dates: &[NaiveDate],
) -> Result<Vec<ScheduledPayment>> {
    if balance <= Decimal::ZERO {
        return Err(invalid(format!("principal must be positive, got {}", balance)));
    }
    if annual_rate < Decimal::ZERO {
        return Err(invalid(format!("annual rate must not be negative, got {}", annual_rate)));
    }
    if dates.is_empty() {
        return Err(invalid("at least one payment date is required"));
    }
    if dates.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("payment dates must be strictly increasing"));
    }
    let periods = dates.len();
    if periods > max_periods(balance) {
        return Err(invalid(format!(
            "principal {} is too small for {} payments",
            balance, periods
        )));
    }

    let rate = monthly_rate(annual_rate);
    let count = Decimal::from(periods as u64);
    let even_split = {
        let rounded = round_money(balance / count);
        if rounded * (count - Decimal::ONE) > balance {
            (balance / count).round_dp_with_strategy(2, RoundingStrategy::ToZero)
        } else {
            rounded
        }
    };
    let level = match scheme {
        PaymentScheme::Annuity if !rate.is_zero() => {
            round_money(annuity_payment(balance, rate, periods as u32)?)
        }
        _ => even_split,
    };

    let mut remaining = balance;
    let mut schedule = Vec::with_capacity(periods);
    for (index, date) in dates.iter().enumerate() {
        let interest = round_money(remaining * rate);
        let rows_after = Decimal::from((periods - index - 1) as u64);
        let principal = if index + 1 == periods {
            remaining
        } else {
            let portion = match scheme {
                PaymentScheme::Annuity => level - interest,
                PaymentScheme::Differentiated => even_split,
            };
            let floor = if interest.is_zero() { MIN_PAYMENT } else { Decimal::ZERO };
            // Every later row keeps at least one cent of principal.
            portion.max(floor).min(remaining - MIN_PAYMENT * rows_after)
        };
        remaining -= principal;

        let total = principal + interest;
        if total <= Decimal::ZERO {
            return Err(invalid(format!(
                "payment {} on {} would be empty",
                index + 1,
                date
            )));
        }
        schedule.push(ScheduledPayment {
            sequence: index as u32 + 1,
            date: *date,
            principal,
            interest,
            total,
            balance_after: remaining,
        });
    }

    debug!(
        balance = %balance,
        periods,
        ?scheme,
        "Computed amortization schedule"
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn terms(principal: Decimal, rate: Decimal, months: u32, scheme: PaymentScheme) -> LoanTerms {
        LoanTerms {
            principal,
            annual_rate: rate,
            term_months: months,
            issue_date: d(2024, 1, 15),
            scheme,
        }
    }

    fn principal_sum(schedule: &[ScheduledPayment]) -> Decimal {
        schedule.iter().map(|p| p.principal).sum()
    }

    #[test]
    fn test_rounding_is_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
        assert_eq!(round_money(dec!(0.124)), dec!(0.12));
    }

    #[test]
    fn test_annuity_payment_formula() {
        let payment = annuity_payment(dec!(12000), dec!(0.01), 12).unwrap();
        assert_eq!(round_money(payment), dec!(1066.19));
        assert_eq!(annuity_payment(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(100));
        assert!(annuity_payment(dec!(1200), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_annuity_schedule() {
        let schedule =
            build_schedule(&terms(dec!(12000), dec!(12), 12, PaymentScheme::Annuity)).unwrap();
        assert_eq!(schedule.len(), 12);

        let first = &schedule[0];
        assert_eq!(first.sequence, 1);
        assert_eq!(first.date, d(2024, 2, 15));
        assert_eq!(first.interest, dec!(120.00));
        assert_eq!(first.principal, dec!(946.19));
        assert_eq!(first.total, dec!(1066.19));

        for payment in &schedule[..11] {
            assert_eq!(payment.total, dec!(1066.19));
        }
        let last = &schedule[11];
        assert_eq!(last.date, d(2025, 1, 15));
        assert_eq!(last.balance_after, Decimal::ZERO);
        assert!((last.total - dec!(1066.19)).abs() <= dec!(0.05));

        assert_eq!(principal_sum(&schedule), dec!(12000));
        assert!(schedule.iter().all(|p| p.total > Decimal::ZERO));
    }

    #[test]
    fn test_zero_rate_annuity() {
        let schedule =
            build_schedule(&terms(dec!(1200), Decimal::ZERO, 12, PaymentScheme::Annuity)).unwrap();
        assert!(schedule
            .iter()
            .all(|p| p.principal == dec!(100) && p.interest.is_zero()));
    }

    #[test]
    fn test_differentiated_schedule() {
        let schedule =
            build_schedule(&terms(dec!(1200), dec!(12), 12, PaymentScheme::Differentiated)).unwrap();
        assert!(schedule.iter().all(|p| p.principal == dec!(100)));
        assert_eq!(schedule[0].interest, dec!(12.00));
        assert_eq!(schedule[0].total, dec!(112.00));
        assert_eq!(schedule[11].interest, dec!(1.00));
        assert_eq!(principal_sum(&schedule), dec!(1200));
    }

    #[test]
    fn test_uneven_principal_sums_exactly() {
        let schedule =
            build_schedule(&terms(dec!(10000), dec!(7.5), 36, PaymentScheme::Annuity)).unwrap();
        assert_eq!(principal_sum(&schedule), dec!(10000));
        assert!(schedule.iter().all(|p| p.total > Decimal::ZERO));

        let schedule =
            build_schedule(&terms(dec!(1000), dec!(9.99), 7, PaymentScheme::Differentiated)).unwrap();
        assert_eq!(principal_sum(&schedule), dec!(1000));
        assert_eq!(schedule[0].principal, dec!(142.86));
    }

    #[test]
    fn test_tiny_annuity_keeps_every_payment_positive() {
        let schedule =
            build_schedule(&terms(dec!(0.18), dec!(12), 12, PaymentScheme::Annuity)).unwrap();
        assert_eq!(schedule.len(), 12);
        assert!(schedule.iter().all(|p| p.principal >= MIN_PAYMENT && p.total > Decimal::ZERO));
        assert_eq!(principal_sum(&schedule), dec!(0.18));
        assert_eq!(schedule[11].balance_after, Decimal::ZERO);

        let schedule =
            build_schedule(&terms(dec!(0.12), dec!(12), 12, PaymentScheme::Annuity)).unwrap();
        assert!(schedule.iter().all(|p| p.principal == dec!(0.01)));
    }

    #[test]
    fn test_payment_dates_clamp_month_end() {
        let dates = payment_dates(d(2024, 1, 31), 3).unwrap();
        assert_eq!(dates, vec![d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]);
    }

    #[test]
    fn test_invalid_terms_are_rejected() {
        assert!(build_schedule(&terms(Decimal::ZERO, dec!(5), 12, PaymentScheme::Annuity)).is_err());
        assert!(build_schedule(&terms(dec!(-10), dec!(5), 12, PaymentScheme::Annuity)).is_err());
        assert!(build_schedule(&terms(dec!(1000), dec!(-1), 12, PaymentScheme::Annuity)).is_err());
        assert!(build_schedule(&terms(dec!(1000), dec!(5), 0, PaymentScheme::Annuity)).is_err());
        assert!(build_schedule(&terms(dec!(0.05), dec!(5), 12, PaymentScheme::Annuity)).is_err());
        assert!(build_schedule(&terms(dec!(0.12), Decimal::ZERO, 12, PaymentScheme::Annuity)).is_ok());
    }

    #[test]
    fn test_schedule_for_explicit_dates() {
        let dates = [d(2024, 6, 10), d(2024, 7, 10), d(2024, 8, 10)];
        let schedule = schedule_for_dates(dec!(5000), dec!(12), PaymentScheme::Annuity, &dates).unwrap();
        assert_eq!(schedule.iter().map(|p| p.sequence).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(schedule.iter().map(|p| p.date).collect::<Vec<_>>(), dates.to_vec());
        assert_eq!(principal_sum(&schedule), dec!(5000));

        let unordered = [d(2024, 7, 10), d(2024, 6, 10)];
        assert!(schedule_for_dates(dec!(5000), dec!(12), PaymentScheme::Annuity, &unordered).is_err());
        assert!(schedule_for_dates(dec!(5000), dec!(12), PaymentScheme::Annuity, &[]).is_err());
    }
}
