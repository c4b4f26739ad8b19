use chrono::NaiveDate;
use common::{DebtTransferDto, LoanDto, LoanPaymentDto, TransferLoanRequest, TransferResultDto};
use compute::loan::refresh_status;
use compute::transfer::plan_transfer;
use model::entities::{debt_transfer, loan, loan_payment, loan_payment::PaymentStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use super::loans::{find_lender, find_loan, insert_scheduled, loan_payments, open_payments, sync_loan_status};
use super::ServiceResult;

/// Moves a loan to another lender.
///
/// Open payments are re-amortized over the transferred amount and reassigned
/// to the new holder; executed payments keep their lender and amounts.
#[instrument(skip(db))]
pub async fn transfer_loan(
    db: &DatabaseConnection,
    loan_id: i32,
    request: TransferLoanRequest,
    today: NaiveDate,
) -> ServiceResult<TransferResultDto> {
    trace!("Entering transfer_loan function");
    let txn = db.begin().await?;
    let loan = find_loan(&txn, loan_id).await?;
    let holder = find_lender(&txn, request.to_lender_id).await?;
    let open = open_payments(&txn, loan_id).await?;
    let transfer_date = request.transfer_date.unwrap_or(today);

    let plan = plan_transfer(
        &loan,
        &open,
        holder.id,
        request.transfer_amount,
        transfer_date,
        request.new_annual_rate,
    )?;

    if plan.reuses_open_payments {
        let mut rows = open.into_iter();
        for scheduled in &plan.schedule {
            let Some(row) = rows.next() else { break };
            let status = refresh_status(row.status, row.scheduled_date, today);
            let mut active: loan_payment::ActiveModel = row.into();
            active.lender_id = Set(holder.id);
            active.principal_amount = Set(scheduled.principal);
            active.interest_amount = Set(scheduled.interest);
            active.total_amount = Set(scheduled.total);
            active.status = Set(status);
            active.update(&txn).await?;
        }
        for row in rows {
            debug!("Cancelling payment {} past the transferred schedule", row.id);
            let mut active: loan_payment::ActiveModel = row.into();
            active.status = Set(PaymentStatus::Cancelled);
            active.update(&txn).await?;
        }
    } else {
        let mut sequence = loan_payments(&txn, loan.id)
            .await?
            .iter()
            .map(|payment| payment.sequence)
            .max()
            .unwrap_or(0);
        for scheduled in &plan.schedule {
            sequence += 1;
            insert_scheduled(&txn, loan.id, holder.id, sequence, scheduled, today).await?;
        }
    }

    let transfer = debt_transfer::ActiveModel {
        loan_id: Set(loan.id),
        from_lender_id: Set(loan.lender_id),
        to_lender_id: Set(holder.id),
        transfer_date: Set(transfer_date),
        previous_balance: Set(plan.previous_balance),
        transfer_amount: Set(plan.transfer_amount),
        amount_difference: Set(plan.amount_difference),
        reason: Set(request.reason),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active: loan::ActiveModel = loan.into();
    active.lender_id = Set(holder.id);
    active.remaining_balance = Set(plan.transfer_amount);
    active.annual_rate = Set(plan.annual_rate);
    let loan = active.update(&txn).await?;
    let loan = sync_loan_status(&txn, loan).await?;
    let payments = open_payments(&txn, loan.id).await?;
    txn.commit().await?;

    info!(
        "Loan {} transferred from lender {} to {} ({} difference)",
        loan.id, transfer.from_lender_id, transfer.to_lender_id, transfer.amount_difference
    );
    Ok(TransferResultDto {
        transfer: DebtTransferDto::from(transfer),
        loan: LoanDto::from(loan),
        payments: payments.into_iter().map(LoanPaymentDto::from).collect(),
    })
}

#[instrument(skip(db))]
pub async fn list_transfers(db: &DatabaseConnection, loan_id: i32) -> ServiceResult<Vec<DebtTransferDto>> {
    find_loan(db, loan_id).await?;
    let transfers = debt_transfer::Entity::find()
        .filter(debt_transfer::Column::LoanId.eq(loan_id))
        .order_by_asc(debt_transfer::Column::TransferDate)
        .order_by_asc(debt_transfer::Column::Id)
        .all(db)
        .await?;
    Ok(transfers.into_iter().map(DebtTransferDto::from).collect())
}
