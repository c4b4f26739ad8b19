use std::cmp::{Ordering, Reverse};

use chrono::NaiveDate;
use common::{
    CreatePendingRequest, ExecutePendingRequest, PendingPaymentDto, PendingQuery,
    UpdatePendingRequest,
};
use model::entities::{
    pending_payment::{self, PendingStatus, Priority},
    transaction::TransactionType,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use super::categories::ensure_category;
use super::transactions::record;
use super::{ServiceError, ServiceResult};

async fn find_pending<C: ConnectionTrait>(conn: &C, pending_id: i32) -> ServiceResult<pending_payment::Model> {
    pending_payment::Entity::find_by_id(pending_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Pending payment", pending_id))
}

fn ensure_active(payment: &pending_payment::Model, action: &str) -> ServiceResult<()> {
    if payment.status != PendingStatus::Active {
        return Err(ServiceError::Conflict(format!(
            "Pending payment {} is {:?} and cannot be {}",
            payment.id, payment.status, action
        )));
    }
    Ok(())
}

/// Active first, most pressing first, then by target date with undated last.
fn display_order(a: &pending_payment::Model, b: &pending_payment::Model) -> Ordering {
    let key = |p: &pending_payment::Model| {
        (
            p.status != PendingStatus::Active,
            Reverse(p.priority),
            p.target_date.is_none(),
            p.target_date,
            p.id,
        )
    };
    key(a).cmp(&key(b))
}

/// Active pending payments in display order.
pub(crate) async fn active_pending<C: ConnectionTrait>(conn: &C) -> ServiceResult<Vec<pending_payment::Model>> {
    let mut payments = pending_payment::Entity::find()
        .filter(pending_payment::Column::Status.eq(PendingStatus::Active))
        .all(conn)
        .await?;
    payments.sort_by(display_order);
    Ok(payments)
}

#[instrument(skip(db))]
pub async fn create_pending(db: &DatabaseConnection, request: CreatePendingRequest) -> ServiceResult<PendingPaymentDto> {
    trace!("Entering create_pending function");
    ensure_category(db, request.category_id).await?;
    let model = pending_payment::ActiveModel {
        name: Set(request.name),
        amount: Set(request.amount),
        category_id: Set(request.category_id),
        priority: Set(request.priority.unwrap_or(Priority::Medium)),
        target_date: Set(request.target_date),
        status: Set(PendingStatus::Active),
        executed_date: Set(None),
        transaction_id: Set(None),
        notes: Set(request.notes),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Pending payment created with ID: {}", model.id);
    Ok(PendingPaymentDto::from(model))
}

#[instrument(skip(db))]
pub async fn get_pending(db: &DatabaseConnection, pending_id: i32) -> ServiceResult<PendingPaymentDto> {
    Ok(PendingPaymentDto::from(find_pending(db, pending_id).await?))
}

#[instrument(skip(db))]
pub async fn list_pending(db: &DatabaseConnection, query: PendingQuery) -> ServiceResult<Vec<PendingPaymentDto>> {
    let mut select = pending_payment::Entity::find();
    if let Some(status) = query.status {
        select = select.filter(pending_payment::Column::Status.eq(status));
    }
    let mut payments = select.all(db).await?;
    payments.sort_by(display_order);
    debug!("Retrieved {} pending payments", payments.len());
    Ok(payments.into_iter().map(PendingPaymentDto::from).collect())
}

#[instrument(skip(db))]
pub async fn update_pending(
    db: &DatabaseConnection,
    pending_id: i32,
    request: UpdatePendingRequest,
) -> ServiceResult<PendingPaymentDto> {
    let existing = find_pending(db, pending_id).await?;
    ensure_active(&existing, "updated")?;
    ensure_category(db, request.category_id).await?;

    let mut active: pending_payment::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(amount) = request.amount {
        active.amount = Set(amount);
    }
    if let Some(category_id) = request.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(priority) = request.priority {
        active.priority = Set(priority);
    }
    if let Some(target_date) = request.target_date {
        active.target_date = Set(Some(target_date));
    }
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }
    let updated = active.update(db).await?;
    info!("Pending payment {} updated", updated.id);
    Ok(PendingPaymentDto::from(updated))
}

/// Pays a pending payment, recording an expense dated on execution.
#[instrument(skip(db))]
pub async fn execute_pending(
    db: &DatabaseConnection,
    pending_id: i32,
    request: ExecutePendingRequest,
    today: NaiveDate,
) -> ServiceResult<PendingPaymentDto> {
    let txn = db.begin().await?;
    let payment = find_pending(&txn, pending_id).await?;
    ensure_active(&payment, "executed")?;

    let executed_on = request.executed_date.unwrap_or(today);
    let transaction = record(
        &txn,
        executed_on,
        request.amount.unwrap_or(payment.amount),
        TransactionType::Expense,
        payment.category_id,
        Some(payment.name.clone()),
    )
    .await?;

    let mut active: pending_payment::ActiveModel = payment.into();
    active.status = Set(PendingStatus::Executed);
    active.executed_date = Set(Some(executed_on));
    active.transaction_id = Set(Some(transaction.id));
    let payment = active.update(&txn).await?;
    txn.commit().await?;

    info!("Pending payment {} executed as transaction {}", payment.id, transaction.id);
    Ok(PendingPaymentDto::from(payment))
}

#[instrument(skip(db))]
pub async fn cancel_pending(db: &DatabaseConnection, pending_id: i32) -> ServiceResult<PendingPaymentDto> {
    let payment = find_pending(db, pending_id).await?;
    ensure_active(&payment, "cancelled")?;
    let mut active: pending_payment::ActiveModel = payment.into();
    active.status = Set(PendingStatus::Cancelled);
    let payment = active.update(db).await?;
    info!("Pending payment {} cancelled", payment.id);
    Ok(PendingPaymentDto::from(payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transactions::{delete_transaction, get_transaction};
    use crate::test_utils::test_utils::setup_test_db;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn pending(name: &str, priority: Option<Priority>, target_date: Option<NaiveDate>) -> CreatePendingRequest {
        CreatePendingRequest {
            name: name.to_string(),
            amount: dec!(50),
            category_id: None,
            priority,
            target_date,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_list_order() {
        let db = setup_test_db().await;
        let undated = create_pending(&db, pending("Undated", Some(Priority::High), None)).await.unwrap();
        let late = create_pending(&db, pending("Late", Some(Priority::High), Some(d(2024, 9, 1))))
            .await
            .unwrap();
        let soon = create_pending(&db, pending("Soon", Some(Priority::High), Some(d(2024, 6, 1))))
            .await
            .unwrap();
        let urgent = create_pending(&db, pending("Urgent", Some(Priority::Urgent), None)).await.unwrap();
        let default = create_pending(&db, pending("Default", None, None)).await.unwrap();
        assert_eq!(default.priority, Priority::Medium);
        cancel_pending(&db, urgent.id).await.unwrap();

        let ids: Vec<i32> = list_pending(&db, PendingQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![soon.id, late.id, undated.id, default.id, urgent.id]);

        let active = list_pending(
            &db,
            PendingQuery {
                status: Some(PendingStatus::Active),
            },
        )
        .await
        .unwrap();
        assert_eq!(active.len(), 4);
    }

    #[tokio::test]
    async fn test_execute_and_state_rules() {
        let db = setup_test_db().await;
        let glasses = create_pending(&db, pending("Glasses", None, None)).await.unwrap();

        let executed = execute_pending(
            &db,
            glasses.id,
            ExecutePendingRequest {
                executed_date: None,
                amount: Some(dec!(45)),
            },
            d(2024, 5, 10),
        )
        .await
        .unwrap();
        assert_eq!(executed.status, PendingStatus::Executed);
        assert_eq!(executed.executed_date, Some(d(2024, 5, 10)));
        let transaction = get_transaction(&db, executed.transaction_id.unwrap()).await.unwrap();
        assert_eq!(transaction.amount, dec!(45));
        assert_eq!(transaction.date, d(2024, 5, 10));

        assert!(matches!(
            execute_pending(&db, glasses.id, ExecutePendingRequest::default(), d(2024, 5, 11)).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            cancel_pending(&db, glasses.id).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            update_pending(&db, glasses.id, UpdatePendingRequest::default()).await,
            Err(ServiceError::Conflict(_))
        ));

        delete_transaction(&db, transaction.id).await.unwrap();
        let reopened = get_pending(&db, glasses.id).await.unwrap();
        assert_eq!(reopened.status, PendingStatus::Active);
        assert_eq!(reopened.executed_date, None);
        assert_eq!(reopened.amount, dec!(50));
    }
}
