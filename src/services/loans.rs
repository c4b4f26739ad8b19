use chrono::NaiveDate;
use common::{
    CreateLenderRequest, CreateLoanRequest, EarlyRepaymentRequest, EarlyRepaymentResultDto,
    ExecutePaymentRequest, LenderDto, LoanDto, LoanPaymentDto, LoanQuery, LoanSummaryDto,
    LoanWithScheduleDto, RefreshResultDto, RepaymentMode, ScheduledPaymentDto,
    SchedulePreviewRequest, UpdateLenderRequest,
};
use compute::loan::{execution_status, loan_status, plan_early_repayment, refresh_status, summarize};
use compute::{build_schedule, EarlyRepaymentMode, LoanTerms, ScheduledPayment};
use model::entities::{
    debt_transfer, lender,
    loan::{self, LoanStatus},
    loan_payment::{self, PaymentKind, PaymentStatus},
    transaction::TransactionType,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::transactions::record;
use super::{ServiceError, ServiceResult};

// ===================== Lenders =====================

pub(crate) async fn find_lender<C: ConnectionTrait>(conn: &C, lender_id: i32) -> ServiceResult<lender::Model> {
    lender::Entity::find_by_id(lender_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Lender", lender_id))
}

async fn ensure_unique_lender<C: ConnectionTrait>(conn: &C, name: &str, except: Option<i32>) -> ServiceResult<()> {
    let mut select = lender::Entity::find().filter(lender::Column::Name.eq(name));
    if let Some(id) = except {
        select = select.filter(lender::Column::Id.ne(id));
    }
    if select.count(conn).await? > 0 {
        return Err(ServiceError::Conflict(format!("Lender '{}' already exists", name)));
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn create_lender(db: &DatabaseConnection, request: CreateLenderRequest) -> ServiceResult<LenderDto> {
    trace!("Entering create_lender function");
    ensure_unique_lender(db, &request.name, None).await?;
    let model = lender::ActiveModel {
        name: Set(request.name),
        lender_type: Set(request.lender_type),
        description: Set(request.description),
        contact_info: Set(request.contact_info),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Lender created with ID: {}", model.id);
    Ok(LenderDto::from(model))
}

#[instrument(skip(db))]
pub async fn get_lender(db: &DatabaseConnection, lender_id: i32) -> ServiceResult<LenderDto> {
    Ok(LenderDto::from(find_lender(db, lender_id).await?))
}

#[instrument(skip(db))]
pub async fn list_lenders(db: &DatabaseConnection) -> ServiceResult<Vec<LenderDto>> {
    let lenders = lender::Entity::find()
        .order_by_asc(lender::Column::Name)
        .all(db)
        .await?;
    Ok(lenders.into_iter().map(LenderDto::from).collect())
}

#[instrument(skip(db))]
pub async fn update_lender(
    db: &DatabaseConnection,
    lender_id: i32,
    request: UpdateLenderRequest,
) -> ServiceResult<LenderDto> {
    let existing = find_lender(db, lender_id).await?;
    if let Some(name) = &request.name {
        ensure_unique_lender(db, name, Some(lender_id)).await?;
    }

    let mut active: lender::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(lender_type) = request.lender_type {
        active.lender_type = Set(lender_type);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(contact_info) = request.contact_info {
        active.contact_info = Set(Some(contact_info));
    }
    let updated = active.update(db).await?;
    info!("Lender {} updated", updated.id);
    Ok(LenderDto::from(updated))
}

/// Deletes a lender that no loan, payment or transfer refers to.
#[instrument(skip(db))]
pub async fn delete_lender(db: &DatabaseConnection, lender_id: i32) -> ServiceResult<()> {
    find_lender(db, lender_id).await?;

    let loans = loan::Entity::find()
        .filter(
            Condition::any()
                .add(loan::Column::LenderId.eq(lender_id))
                .add(loan::Column::OriginalLenderId.eq(lender_id)),
        )
        .count(db)
        .await?;
    let transfers = debt_transfer::Entity::find()
        .filter(
            Condition::any()
                .add(debt_transfer::Column::FromLenderId.eq(lender_id))
                .add(debt_transfer::Column::ToLenderId.eq(lender_id)),
        )
        .count(db)
        .await?;
    let payments = loan_payment::Entity::find()
        .filter(loan_payment::Column::LenderId.eq(lender_id))
        .count(db)
        .await?;
    if loans + transfers + payments > 0 {
        warn!("Refusing to delete lender {} still referenced", lender_id);
        return Err(ServiceError::Conflict(format!(
            "Lender {} is referenced by {} loans, {} payments and {} transfers",
            lender_id, loans, payments, transfers
        )));
    }

    lender::Entity::delete_by_id(lender_id).exec(db).await?;
    info!("Lender {} deleted", lender_id);
    Ok(())
}

// ===================== Loans =====================

pub(crate) async fn find_loan<C: ConnectionTrait>(conn: &C, loan_id: i32) -> ServiceResult<loan::Model> {
    loan::Entity::find_by_id(loan_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Loan", loan_id))
}

/// All payments of a loan ordered by date, then sequence.
pub(crate) async fn loan_payments<C: ConnectionTrait>(conn: &C, loan_id: i32) -> ServiceResult<Vec<loan_payment::Model>> {
    Ok(loan_payment::Entity::find()
        .filter(loan_payment::Column::LoanId.eq(loan_id))
        .order_by_asc(loan_payment::Column::ScheduledDate)
        .order_by_asc(loan_payment::Column::Sequence)
        .all(conn)
        .await?)
}

/// Pending and overdue payments of a loan, in schedule order.
pub(crate) async fn open_payments<C: ConnectionTrait>(conn: &C, loan_id: i32) -> ServiceResult<Vec<loan_payment::Model>> {
    Ok(loan_payments(conn, loan_id)
        .await?
        .into_iter()
        .filter(|payment| payment.status.is_open())
        .collect())
}

fn sequence_number(sequence: u32) -> ServiceResult<i32> {
    i32::try_from(sequence).map_err(|_| ServiceError::Validation(format!("sequence {} out of range", sequence)))
}

pub(crate) fn scheduled_dto(payment: ScheduledPayment) -> ScheduledPaymentDto {
    ScheduledPaymentDto {
        sequence: payment.sequence,
        date: payment.date,
        principal: payment.principal,
        interest: payment.interest,
        total: payment.total,
        balance_after: payment.balance_after,
    }
}

/// Inserts a scheduled payment row held by `lender_id`.
pub(crate) async fn insert_scheduled<C: ConnectionTrait>(
    conn: &C,
    loan_id: i32,
    lender_id: i32,
    sequence: i32,
    payment: &ScheduledPayment,
    today: NaiveDate,
) -> ServiceResult<loan_payment::Model> {
    Ok(loan_payment::ActiveModel {
        loan_id: Set(loan_id),
        lender_id: Set(lender_id),
        sequence: Set(sequence),
        scheduled_date: Set(payment.date),
        principal_amount: Set(payment.principal),
        interest_amount: Set(payment.interest),
        total_amount: Set(payment.total),
        status: Set(refresh_status(PaymentStatus::Pending, payment.date, today)),
        kind: Set(PaymentKind::Scheduled),
        executed_date: Set(None),
        transaction_id: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

/// Writes the status derived from the loan's balance and payments.
pub(crate) async fn sync_loan_status<C: ConnectionTrait>(conn: &C, loan: loan::Model) -> ServiceResult<loan::Model> {
    let payments = loan_payments(conn, loan.id).await?;
    let status = loan_status(loan.remaining_balance, &payments);
    if status == loan.status {
        return Ok(loan);
    }
    debug!("Loan {} status {:?} -> {:?}", loan.id, loan.status, status);
    let mut active: loan::ActiveModel = loan.into();
    active.status = Set(status);
    Ok(active.update(conn).await?)
}

/// Registers a loan and stores its full amortization schedule.
#[instrument(skip(db))]
pub async fn create_loan(
    db: &DatabaseConnection,
    request: CreateLoanRequest,
    today: NaiveDate,
) -> ServiceResult<LoanWithScheduleDto> {
    trace!("Entering create_loan function");
    let term_months = u32::try_from(request.term_months)
        .map_err(|_| ServiceError::Validation(format!("term must be positive, got {}", request.term_months)))?;
    let schedule = build_schedule(&LoanTerms {
        principal: request.principal,
        annual_rate: request.annual_rate,
        term_months,
        issue_date: request.issue_date,
        scheme: request.payment_scheme,
    })?;

    let txn = db.begin().await?;
    let holder = find_lender(&txn, request.lender_id).await?;

    let created = loan::ActiveModel {
        original_lender_id: Set(holder.id),
        lender_id: Set(holder.id),
        name: Set(request.name),
        loan_type: Set(request.loan_type),
        principal: Set(request.principal),
        annual_rate: Set(request.annual_rate),
        term_months: Set(request.term_months),
        issue_date: Set(request.issue_date),
        payment_scheme: Set(request.payment_scheme),
        remaining_balance: Set(request.principal),
        status: Set(LoanStatus::Active),
        description: Set(request.description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for payment in &schedule {
        insert_scheduled(&txn, created.id, holder.id, sequence_number(payment.sequence)?, payment, today).await?;
    }
    let created = sync_loan_status(&txn, created).await?;
    let payments = loan_payments(&txn, created.id).await?;
    txn.commit().await?;

    info!("Loan {} created with {} scheduled payments", created.id, payments.len());
    Ok(LoanWithScheduleDto {
        loan: LoanDto::from(created),
        payments: payments.into_iter().map(LoanPaymentDto::from).collect(),
    })
}

#[instrument(skip(db))]
pub async fn get_loan(db: &DatabaseConnection, loan_id: i32) -> ServiceResult<LoanDto> {
    Ok(LoanDto::from(find_loan(db, loan_id).await?))
}

#[instrument(skip(db))]
pub async fn list_loans(db: &DatabaseConnection, query: LoanQuery) -> ServiceResult<Vec<LoanDto>> {
    let mut select = loan::Entity::find();
    if let Some(lender_id) = query.lender_id {
        select = select.filter(loan::Column::LenderId.eq(lender_id));
    }
    if let Some(status) = query.status {
        select = select.filter(loan::Column::Status.eq(status));
    }
    let loans = select
        .order_by_asc(loan::Column::IssueDate)
        .order_by_asc(loan::Column::Id)
        .all(db)
        .await?;
    debug!("Retrieved {} loans", loans.len());
    Ok(loans.into_iter().map(LoanDto::from).collect())
}

/// Deletes a loan with its payments and transfers. Recorded transactions stay.
#[instrument(skip(db))]
pub async fn delete_loan(db: &DatabaseConnection, loan_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;
    find_loan(&txn, loan_id).await?;
    loan_payment::Entity::delete_many()
        .filter(loan_payment::Column::LoanId.eq(loan_id))
        .exec(&txn)
        .await?;
    debt_transfer::Entity::delete_many()
        .filter(debt_transfer::Column::LoanId.eq(loan_id))
        .exec(&txn)
        .await?;
    loan::Entity::delete_by_id(loan_id).exec(&txn).await?;
    txn.commit().await?;
    info!("Loan {} deleted", loan_id);
    Ok(())
}

#[instrument(skip(db))]
pub async fn list_payments(db: &DatabaseConnection, loan_id: i32) -> ServiceResult<Vec<LoanPaymentDto>> {
    find_loan(db, loan_id).await?;
    Ok(loan_payments(db, loan_id)
        .await?
        .into_iter()
        .map(LoanPaymentDto::from)
        .collect())
}

/// Pays an open installment: records an expense and lowers the balance by the
/// principal portion.
#[instrument(skip(db))]
pub async fn execute_payment(
    db: &DatabaseConnection,
    payment_id: i32,
    request: ExecutePaymentRequest,
    today: NaiveDate,
) -> ServiceResult<LoanPaymentDto> {
    let txn = db.begin().await?;
    let payment = loan_payment::Entity::find_by_id(payment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Loan payment", payment_id))?;
    if !payment.status.is_open() {
        return Err(ServiceError::Conflict(format!(
            "Loan payment {} is {:?} and cannot be executed",
            payment_id, payment.status
        )));
    }
    let loan = find_loan(&txn, payment.loan_id).await?;

    let executed_on = request.executed_date.unwrap_or(today);
    let transaction = record(
        &txn,
        executed_on,
        payment.total_amount,
        TransactionType::Expense,
        request.category_id,
        Some(format!("Loan payment: {} #{}", loan.name, payment.sequence)),
    )
    .await?;

    let principal = payment.principal_amount;
    let status = execution_status(payment.scheduled_date, executed_on);
    let mut active: loan_payment::ActiveModel = payment.into();
    active.status = Set(status);
    active.executed_date = Set(Some(executed_on));
    active.transaction_id = Set(Some(transaction.id));
    let payment = active.update(&txn).await?;

    let balance = (loan.remaining_balance - principal).max(Decimal::ZERO);
    let mut active: loan::ActiveModel = loan.into();
    active.remaining_balance = Set(balance);
    let loan = active.update(&txn).await?;
    let loan = sync_loan_status(&txn, loan).await?;
    txn.commit().await?;

    info!(
        "Loan payment {} executed ({:?}), loan {} balance now {}",
        payment.id, payment.status, loan.id, loan.remaining_balance
    );
    Ok(LoanPaymentDto::from(payment))
}

/// Flags open payments dated before `today` as overdue (and un-flags the rest),
/// then refreshes the affected loans' statuses.
#[instrument(skip(db))]
pub async fn refresh_overdue(db: &DatabaseConnection, today: NaiveDate) -> ServiceResult<RefreshResultDto> {
    let txn = db.begin().await?;
    let open = loan_payment::Entity::find()
        .filter(loan_payment::Column::Status.is_in([PaymentStatus::Pending, PaymentStatus::Overdue]))
        .all(&txn)
        .await?;

    let mut updated = 0;
    for payment in open {
        let status = refresh_status(payment.status, payment.scheduled_date, today);
        if status == payment.status {
            continue;
        }
        let mut active: loan_payment::ActiveModel = payment.into();
        active.status = Set(status);
        active.update(&txn).await?;
        updated += 1;
    }

    let loans = loan::Entity::find()
        .filter(loan::Column::Status.ne(LoanStatus::PaidOff))
        .all(&txn)
        .await?;
    for loan in loans {
        sync_loan_status(&txn, loan).await?;
    }
    txn.commit().await?;

    info!("Refreshed overdue statuses, {} payments changed", updated);
    Ok(RefreshResultDto { updated })
}

/// Repays part or all of the remaining balance ahead of schedule.
///
/// The repayment is stored as an executed `EarlyRepayment` entry and the open
/// schedule is re-amortized over the new balance.
#[instrument(skip(db))]
pub async fn early_repayment(
    db: &DatabaseConnection,
    loan_id: i32,
    request: EarlyRepaymentRequest,
    today: NaiveDate,
) -> ServiceResult<EarlyRepaymentResultDto> {
    let txn = db.begin().await?;
    let loan = find_loan(&txn, loan_id).await?;
    let open = open_payments(&txn, loan_id).await?;
    let date = request.date.unwrap_or(today);
    let mode = match request.mode {
        RepaymentMode::ReducePayment => EarlyRepaymentMode::ReducePayment,
        RepaymentMode::ReduceTerm => EarlyRepaymentMode::ReduceTerm,
    };
    let plan = plan_early_repayment(&loan, &open, request.amount, date, mode)?;

    let transaction = record(
        &txn,
        date,
        plan.principal_paid,
        TransactionType::Expense,
        request.category_id,
        Some(format!("Early repayment: {}", loan.name)),
    )
    .await?;

    let repayment = loan_payment::ActiveModel {
        loan_id: Set(loan.id),
        lender_id: Set(loan.lender_id),
        sequence: Set(0),
        scheduled_date: Set(date),
        principal_amount: Set(plan.principal_paid),
        interest_amount: Set(Decimal::ZERO),
        total_amount: Set(plan.principal_paid),
        status: Set(PaymentStatus::Executed),
        kind: Set(PaymentKind::EarlyRepayment),
        executed_date: Set(Some(date)),
        transaction_id: Set(Some(transaction.id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut next_sequence = loan_payments(&txn, loan.id)
        .await?
        .iter()
        .map(|payment| payment.sequence)
        .max()
        .unwrap_or(0);
    let mut rows = open.into_iter();
    for scheduled in &plan.schedule {
        match rows.next() {
            Some(row) => {
                let status = refresh_status(row.status, row.scheduled_date, today);
                let mut active: loan_payment::ActiveModel = row.into();
                active.principal_amount = Set(scheduled.principal);
                active.interest_amount = Set(scheduled.interest);
                active.total_amount = Set(scheduled.total);
                active.status = Set(status);
                active.update(&txn).await?;
            }
            None => {
                next_sequence += 1;
                insert_scheduled(&txn, loan.id, loan.lender_id, next_sequence, scheduled, today).await?;
            }
        }
    }
    let mut cancelled = 0;
    for row in rows {
        let mut active: loan_payment::ActiveModel = row.into();
        active.status = Set(PaymentStatus::Cancelled);
        active.update(&txn).await?;
        cancelled += 1;
    }

    let mut active: loan::ActiveModel = loan.into();
    active.remaining_balance = Set(plan.new_balance);
    let loan = active.update(&txn).await?;
    let loan = sync_loan_status(&txn, loan).await?;
    let payments = open_payments(&txn, loan.id).await?;
    txn.commit().await?;

    info!(
        "Early repayment of {} on loan {}, {} payments cancelled, balance {}",
        plan.principal_paid, loan.id, cancelled, loan.remaining_balance
    );
    Ok(EarlyRepaymentResultDto {
        loan: LoanDto::from(loan),
        repayment: LoanPaymentDto::from(repayment),
        cancelled_payments: cancelled,
        payments: payments.into_iter().map(LoanPaymentDto::from).collect(),
    })
}

#[instrument(skip(db))]
pub async fn loan_summary(db: &DatabaseConnection, loan_id: i32) -> ServiceResult<LoanSummaryDto> {
    let loan = find_loan(db, loan_id).await?;
    let payments = loan_payments(db, loan_id).await?;
    let summary = summarize(&loan, &payments);
    Ok(LoanSummaryDto {
        loan_id,
        total_paid: summary.total_paid,
        principal_paid: summary.principal_paid,
        interest_paid: summary.interest_paid,
        remaining_balance: summary.remaining_balance,
        open_payments: summary.open_payments as u64,
        overdue_payments: summary.overdue_payments as u64,
        next_payment_date: summary.next_payment_date,
        next_payment_amount: summary.next_payment_amount,
    })
}

/// Computes an amortization table without storing anything.
pub fn preview_schedule(request: &SchedulePreviewRequest) -> ServiceResult<Vec<ScheduledPaymentDto>> {
    let term_months = u32::try_from(request.term_months)
        .map_err(|_| ServiceError::Validation(format!("term must be positive, got {}", request.term_months)))?;
    let schedule = build_schedule(&LoanTerms {
        principal: request.principal,
        annual_rate: request.annual_rate,
        term_months,
        issue_date: request.issue_date,
        scheme: request.payment_scheme,
    })?;
    Ok(schedule.into_iter().map(scheduled_dto).collect())
}
