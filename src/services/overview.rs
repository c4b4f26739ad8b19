use chrono::{Days, NaiveDate};
use common::{LoanPaymentDueDto, OverviewDto, PendingPaymentDto};
use compute::dates::month_start;
use model::entities::{
    loan,
    loan_payment::{self, PaymentStatus},
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{debug, instrument};

use super::pending::active_pending;
use super::planned::upcoming_in;
use super::transactions::summarize;
use super::{ServiceError, ServiceResult};

/// Snapshot of what is coming up between `today` and `today + days`.
///
/// Loan payments already overdue are included whatever their date.
#[instrument(skip(db))]
pub async fn overview(db: &DatabaseConnection, today: NaiveDate, days: u32) -> ServiceResult<OverviewDto> {
    let window_end = today
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| ServiceError::Validation(format!("{} days from {} is out of range", days, today)))?;

    let upcoming = upcoming_in(db, today, window_end).await?;

    let due = loan_payment::Entity::find()
        .filter(loan_payment::Column::Status.is_in([PaymentStatus::Pending, PaymentStatus::Overdue]))
        .filter(loan_payment::Column::ScheduledDate.lte(window_end))
        .order_by_asc(loan_payment::Column::ScheduledDate)
        .order_by_asc(loan_payment::Column::Id)
        .find_also_related(loan::Entity)
        .all(db)
        .await?;
    let loan_payments: Vec<LoanPaymentDueDto> = due
        .into_iter()
        .filter_map(|(payment, loan)| loan.map(|loan| (payment, loan)))
        .map(|(payment, loan)| LoanPaymentDueDto {
            payment_id: payment.id,
            loan_id: loan.id,
            loan_name: loan.name,
            scheduled_date: payment.scheduled_date,
            total_amount: payment.total_amount,
            status: payment.status,
        })
        .collect();

    let pending_payments: Vec<PendingPaymentDto> = active_pending(db)
        .await?
        .into_iter()
        .map(PendingPaymentDto::from)
        .collect();
    let pending_total: Decimal = pending_payments.iter().map(|p| p.amount).sum();

    let month = summarize(db, month_start(today), today).await?;

    debug!(
        upcoming = upcoming.len(),
        loan_payments = loan_payments.len(),
        pending = pending_payments.len(),
        "Built overview for {}",
        today
    );
    Ok(OverviewDto {
        today,
        window_end,
        upcoming,
        loan_payments,
        pending_payments,
        pending_total,
        month_income: month.income,
        month_expense: month.expense,
        month_net: month.net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::loans::{create_lender, create_loan};
    use crate::services::pending::create_pending;
    use crate::services::planned::create_planned;
    use crate::services::transactions::create_transaction;
    use crate::test_utils::test_utils::setup_test_db;
    use common::{
        CreateLenderRequest, CreateLoanRequest, CreatePendingRequest, CreatePlannedRequest,
        CreateTransactionRequest, RecurrenceRuleRequest,
    };
    use model::entities::lender::LenderType;
    use model::entities::loan::{LoanType, PaymentScheme};
    use model::entities::recurrence_rule::Frequency;
    use model::entities::transaction::TransactionType;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_overview_collects_everything_in_window() {
        let db = setup_test_db().await;
        let today = d(2024, 3, 15);

        create_planned(
            &db,
            CreatePlannedRequest {
                name: "Salary".to_string(),
                amount: dec!(3000),
                transaction_type: TransactionType::Income,
                category_id: None,
                start_date: d(2024, 1, 25),
                description: None,
                recurrence: Some(RecurrenceRuleRequest {
                    frequency: Frequency::Monthly,
                    interval: None,
                    interval_unit: None,
                    weekdays: None,
                    only_workdays: None,
                    end_condition: None,
                    end_date: None,
                    occurrence_count: None,
                }),
            },
            d(2024, 6, 30),
        )
        .await
        .unwrap();

        let lender = create_lender(
            &db,
            CreateLenderRequest {
                name: "First Bank".to_string(),
                lender_type: LenderType::Bank,
                description: None,
                contact_info: None,
            },
        )
        .await
        .unwrap();
        create_loan(
            &db,
            CreateLoanRequest {
                lender_id: lender.id,
                name: "Car".to_string(),
                loan_type: LoanType::Car,
                principal: dec!(1200),
                annual_rate: dec!(0),
                term_months: 12,
                issue_date: d(2024, 1, 10),
                payment_scheme: PaymentScheme::Differentiated,
                description: None,
            },
            today,
        )
        .await
        .unwrap();

        create_pending(
            &db,
            CreatePendingRequest {
                name: "Glasses".to_string(),
                amount: dec!(300),
                category_id: None,
                priority: None,
                target_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        for (date, amount, transaction_type) in [
            (d(2024, 3, 1), dec!(3000), TransactionType::Income),
            (d(2024, 3, 5), dec!(120), TransactionType::Expense),
            (d(2024, 2, 28), dec!(999), TransactionType::Expense),
        ] {
            create_transaction(
                &db,
                CreateTransactionRequest {
                    date,
                    amount,
                    transaction_type,
                    category_id: None,
                    description: None,
                },
            )
            .await
            .unwrap();
        }

        let overview = overview(&db, today, 30).await.unwrap();
        assert_eq!(overview.window_end, d(2024, 4, 14));

        let upcoming: Vec<NaiveDate> = overview.upcoming.iter().map(|o| o.occurrence_date).collect();
        assert_eq!(upcoming, vec![d(2024, 3, 25)]);

        // Feb 10 and Mar 10 were already overdue at creation, Apr 10 is inside the window
        let due: Vec<(NaiveDate, PaymentStatus)> = overview
            .loan_payments
            .iter()
            .map(|p| (p.scheduled_date, p.status))
            .collect();
        assert_eq!(
            due,
            vec![
                (d(2024, 2, 10), PaymentStatus::Overdue),
                (d(2024, 3, 10), PaymentStatus::Overdue),
                (d(2024, 4, 10), PaymentStatus::Pending),
            ]
        );
        assert_eq!(overview.loan_payments[0].loan_name, "Car");

        assert_eq!(overview.pending_total, dec!(300));
        assert_eq!(overview.month_income, dec!(3000));
        assert_eq!(overview.month_expense, dec!(120));
        assert_eq!(overview.month_net, dec!(2880));
    }
}
