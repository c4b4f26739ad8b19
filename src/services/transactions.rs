use chrono::NaiveDate;
use common::{
    CreateTransactionRequest, PeriodSummaryDto, TransactionDto, TransactionQuery,
    UpdateTransactionRequest,
};
use model::entities::{
    loan_payment, pending_payment, planned_occurrence, transaction,
    pending_payment::PendingStatus, planned_occurrence::OccurrenceStatus,
    transaction::TransactionType,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::categories::ensure_category;
use super::{ServiceError, ServiceResult};

pub(crate) async fn find_transaction<C: ConnectionTrait>(
    conn: &C,
    transaction_id: i32,
) -> ServiceResult<transaction::Model> {
    transaction::Entity::find_by_id(transaction_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Transaction", transaction_id))
}

/// Inserts a transaction inside an ongoing database transaction.
pub(crate) async fn record<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    amount: Decimal,
    transaction_type: TransactionType,
    category_id: Option<i32>,
    description: Option<String>,
) -> ServiceResult<transaction::Model> {
    ensure_category(conn, category_id).await?;
    let model = transaction::ActiveModel {
        date: Set(date),
        amount: Set(amount),
        transaction_type: Set(transaction_type),
        category_id: Set(category_id),
        description: Set(description),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    debug!(
        "Recorded {:?} transaction {} of {} on {}",
        model.transaction_type, model.id, model.amount, model.date
    );
    Ok(model)
}

async fn settles_loan_payment<C: ConnectionTrait>(conn: &C, transaction_id: i32) -> ServiceResult<bool> {
    let count = loan_payment::Entity::find()
        .filter(loan_payment::Column::TransactionId.eq(transaction_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

#[instrument(skip(db))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    request: CreateTransactionRequest,
) -> ServiceResult<TransactionDto> {
    trace!("Entering create_transaction function");
    let model = record(
        db,
        request.date,
        request.amount,
        request.transaction_type,
        request.category_id,
        request.description,
    )
    .await?;
    info!("Transaction created with ID: {}", model.id);
    Ok(TransactionDto::from(model))
}

#[instrument(skip(db))]
pub async fn get_transaction(db: &DatabaseConnection, transaction_id: i32) -> ServiceResult<TransactionDto> {
    Ok(TransactionDto::from(find_transaction(db, transaction_id).await?))
}

/// Transactions matching the filters, newest first.
#[instrument(skip(db))]
pub async fn list_transactions(
    db: &DatabaseConnection,
    query: TransactionQuery,
) -> ServiceResult<Vec<TransactionDto>> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ServiceError::Validation(format!(
                "Date range is inverted: {} > {}",
                from, to
            )));
        }
    }

    let mut select = transaction::Entity::find();
    if let Some(from) = query.from {
        select = select.filter(transaction::Column::Date.gte(from));
    }
    if let Some(to) = query.to {
        select = select.filter(transaction::Column::Date.lte(to));
    }
    if let Some(transaction_type) = query.transaction_type {
        select = select.filter(transaction::Column::TransactionType.eq(transaction_type));
    }
    if let Some(category_id) = query.category_id {
        select = select.filter(transaction::Column::CategoryId.eq(category_id));
    }

    let transactions = select
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await?;
    debug!("Retrieved {} transactions", transactions.len());
    Ok(transactions.into_iter().map(TransactionDto::from).collect())
}

/// Updates a transaction. Amount and type are frozen once it settles a loan payment.
#[instrument(skip(db))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i32,
    request: UpdateTransactionRequest,
) -> ServiceResult<TransactionDto> {
    let existing = find_transaction(db, transaction_id).await?;
    ensure_category(db, request.category_id).await?;

    let changes_money = request.amount.is_some_and(|amount| amount != existing.amount)
        || request
            .transaction_type
            .is_some_and(|transaction_type| transaction_type != existing.transaction_type);
    if changes_money && settles_loan_payment(db, transaction_id).await? {
        return Err(ServiceError::Conflict(format!(
            "Transaction {} settles a loan payment, its amount and type cannot change",
            transaction_id
        )));
    }

    let mut active: transaction::ActiveModel = existing.into();
    if let Some(date) = request.date {
        active.date = Set(date);
    }
    if let Some(amount) = request.amount {
        active.amount = Set(amount);
    }
    if let Some(transaction_type) = request.transaction_type {
        active.transaction_type = Set(transaction_type);
    }
    if let Some(category_id) = request.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }

    let updated = active.update(db).await?;
    info!("Transaction {} updated", updated.id);
    Ok(TransactionDto::from(updated))
}

/// Deletes a transaction and reopens whatever it settled.
///
/// An executed planned occurrence goes back to `Pending`, an executed pending
/// payment back to `Active`. Transactions settling loan payments are kept.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;
    let existing = find_transaction(&txn, transaction_id).await?;

    if settles_loan_payment(&txn, transaction_id).await? {
        return Err(ServiceError::Conflict(format!(
            "Transaction {} settles a loan payment and cannot be deleted",
            transaction_id
        )));
    }

    let occurrences = planned_occurrence::Entity::find()
        .filter(planned_occurrence::Column::TransactionId.eq(transaction_id))
        .all(&txn)
        .await?;
    for occurrence in occurrences {
        debug!("Reopening planned occurrence {}", occurrence.id);
        let mut active: planned_occurrence::ActiveModel = occurrence.into();
        active.status = Set(OccurrenceStatus::Pending);
        active.executed_date = Set(None);
        active.transaction_id = Set(None);
        active.update(&txn).await?;
    }

    let pending = pending_payment::Entity::find()
        .filter(pending_payment::Column::TransactionId.eq(transaction_id))
        .all(&txn)
        .await?;
    for payment in pending {
        debug!("Reopening pending payment {}", payment.id);
        let mut active: pending_payment::ActiveModel = payment.into();
        active.status = Set(PendingStatus::Active);
        active.executed_date = Set(None);
        active.transaction_id = Set(None);
        active.update(&txn).await?;
    }

    transaction::Entity::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    info!("Transaction {} deleted", transaction_id);
    Ok(())
}

/// Income, expense and net over an inclusive period.
pub(crate) async fn summarize<C: ConnectionTrait>(
    conn: &C,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<PeriodSummaryDto> {
    let transactions = transaction::Entity::find()
        .filter(transaction::Column::Date.gte(from))
        .filter(transaction::Column::Date.lte(to))
        .all(conn)
        .await?;

    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for transaction in &transactions {
        match transaction.transaction_type {
            TransactionType::Income => income += transaction.amount,
            TransactionType::Expense => expense += transaction.amount,
        }
    }

    Ok(PeriodSummaryDto {
        from,
        to,
        income,
        expense,
        net: income - expense,
        transaction_count: transactions.len() as u64,
    })
}

#[instrument(skip(db))]
pub async fn period_summary(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<PeriodSummaryDto> {
    if from > to {
        warn!("Inverted summary period {} > {}", from, to);
        return Err(ServiceError::Validation(format!(
            "Date range is inverted: {} > {}",
            from, to
        )));
    }
    summarize(db, from, to).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::setup_test_db;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn request(date: NaiveDate, amount: Decimal, transaction_type: TransactionType) -> CreateTransactionRequest {
        CreateTransactionRequest {
            date,
            amount,
            transaction_type,
            category_id: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_list_filters_and_order() {
        let db = setup_test_db().await;
        create_transaction(&db, request(d(2024, 5, 1), dec!(3000), TransactionType::Income))
            .await
            .unwrap();
        create_transaction(&db, request(d(2024, 5, 3), dec!(45.5), TransactionType::Expense))
            .await
            .unwrap();
        create_transaction(&db, request(d(2024, 6, 1), dec!(12), TransactionType::Expense))
            .await
            .unwrap();

        let all = list_transactions(&db, TransactionQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, d(2024, 6, 1));

        let may_expenses = list_transactions(
            &db,
            TransactionQuery {
                from: Some(d(2024, 5, 1)),
                to: Some(d(2024, 5, 31)),
                transaction_type: Some(TransactionType::Expense),
                category_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(may_expenses.len(), 1);
        assert_eq!(may_expenses[0].amount, dec!(45.5));

        let inverted = list_transactions(
            &db,
            TransactionQuery {
                from: Some(d(2024, 6, 1)),
                to: Some(d(2024, 5, 1)),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(inverted, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_period_summary() {
        let db = setup_test_db().await;
        create_transaction(&db, request(d(2024, 5, 1), dec!(3000), TransactionType::Income))
            .await
            .unwrap();
        create_transaction(&db, request(d(2024, 5, 3), dec!(45.5), TransactionType::Expense))
            .await
            .unwrap();
        create_transaction(&db, request(d(2024, 4, 30), dec!(99), TransactionType::Expense))
            .await
            .unwrap();

        let summary = period_summary(&db, d(2024, 5, 1), d(2024, 5, 31)).await.unwrap();
        assert_eq!(summary.income, dec!(3000));
        assert_eq!(summary.expense, dec!(45.5));
        assert_eq!(summary.net, dec!(2954.5));
        assert_eq!(summary.transaction_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let db = setup_test_db().await;
        let mut bad = request(d(2024, 5, 1), dec!(10), TransactionType::Expense);
        bad.category_id = Some(999);
        assert!(matches!(
            create_transaction(&db, bad).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = setup_test_db().await;
        let created = create_transaction(&db, request(d(2024, 5, 1), dec!(10), TransactionType::Expense))
            .await
            .unwrap();

        let updated = update_transaction(
            &db,
            created.id,
            UpdateTransactionRequest {
                amount: Some(dec!(12.75)),
                description: Some("Lunch".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.amount, dec!(12.75));
        assert_eq!(updated.description.as_deref(), Some("Lunch"));

        delete_transaction(&db, created.id).await.unwrap();
        assert!(matches!(
            get_transaction(&db, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
