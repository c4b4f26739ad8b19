use std::collections::HashSet;

use chrono::NaiveDate;
use common::{
    CreatePlannedRequest, ExecuteOccurrenceRequest, MaterializeResultDto, OccurrenceDto,
    OccurrencePreviewDto, PlannedQuery, PlannedTransactionDto, RecurrenceRuleRequest,
    UpcomingOccurrenceDto, UpdatePlannedRequest,
};
use compute::{RecurrenceSpec, WeekdaySet};
use model::entities::{
    planned_occurrence::{self, OccurrenceStatus},
    planned_transaction,
    recurrence_rule::{self, EndCondition, Frequency},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::categories::ensure_category;
use super::transactions::record;
use super::{ServiceError, ServiceResult};

/// Turns a rule request into an unsaved rule model, rejecting rules that can
/// never produce a date.
fn build_rule(
    plan_id: i32,
    start_date: NaiveDate,
    request: &RecurrenceRuleRequest,
) -> ServiceResult<recurrence_rule::Model> {
    let interval_unit = match (request.frequency.preset_unit(), request.interval_unit) {
        (Some(unit), _) => unit,
        (None, Some(unit)) => unit,
        (None, None) => {
            return Err(ServiceError::Validation(
                "interval_unit is required for a Custom frequency".to_string(),
            ))
        }
    };

    let weekdays = match request.weekdays.as_deref() {
        Some(days) if !days.is_empty() => {
            let list = days.iter().map(u8::to_string).collect::<Vec<_>>().join(",");
            let set = list
                .parse::<WeekdaySet>()
                .map_err(|err| ServiceError::Validation(err.to_string()))?;
            Some(set.to_string())
        }
        _ => None,
    };

    let end_condition = request.end_condition.unwrap_or(match (request.end_date, request.occurrence_count) {
        (Some(_), _) => EndCondition::UntilDate,
        (None, Some(_)) => EndCondition::AfterCount,
        (None, None) => EndCondition::Never,
    });

    let rule = recurrence_rule::Model {
        id: 0,
        planned_transaction_id: plan_id,
        frequency: request.frequency,
        interval: request.interval.unwrap_or(1),
        interval_unit,
        weekdays,
        only_workdays: request.only_workdays.unwrap_or(false),
        end_condition,
        end_date: request.end_date,
        occurrence_count: request.occurrence_count,
    };
    RecurrenceSpec::from_rule(start_date, &rule)?;
    Ok(rule)
}

async fn insert_rule<C: ConnectionTrait>(conn: &C, rule: recurrence_rule::Model) -> ServiceResult<recurrence_rule::Model> {
    let saved = recurrence_rule::ActiveModel {
        planned_transaction_id: Set(rule.planned_transaction_id),
        frequency: Set(rule.frequency),
        interval: Set(rule.interval),
        interval_unit: Set(rule.interval_unit),
        weekdays: Set(rule.weekdays),
        only_workdays: Set(rule.only_workdays),
        end_condition: Set(rule.end_condition),
        end_date: Set(rule.end_date),
        occurrence_count: Set(rule.occurrence_count),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(saved)
}

/// Recurrence of a plan; a plan without a rule occurs once on its start date.
pub(crate) fn spec_for(
    plan: &planned_transaction::Model,
    rule: Option<&recurrence_rule::Model>,
) -> ServiceResult<RecurrenceSpec> {
    match rule {
        Some(rule) => Ok(RecurrenceSpec::from_rule(plan.start_date, rule)?),
        None => Ok(RecurrenceSpec::once(plan.start_date)),
    }
}

async fn find_plan<C: ConnectionTrait>(
    conn: &C,
    plan_id: i32,
) -> ServiceResult<(planned_transaction::Model, Option<recurrence_rule::Model>)> {
    planned_transaction::Entity::find_by_id(plan_id)
        .find_also_related(recurrence_rule::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Planned transaction", plan_id))
}

async fn find_occurrence<C: ConnectionTrait>(
    conn: &C,
    occurrence_id: i32,
) -> ServiceResult<planned_occurrence::Model> {
    planned_occurrence::Entity::find_by_id(occurrence_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Occurrence", occurrence_id))
}

/// Persists the plan's missing occurrences dated after `after` (if given) and
/// up to `horizon`. Existing rows of any status are left alone.
pub(crate) async fn materialize_plan<C: ConnectionTrait>(
    conn: &C,
    plan: &planned_transaction::Model,
    rule: Option<&recurrence_rule::Model>,
    after: Option<NaiveDate>,
    horizon: NaiveDate,
) -> ServiceResult<u64> {
    if !plan.is_active {
        return Ok(0);
    }
    let spec = spec_for(plan, rule)?;

    let existing: HashSet<NaiveDate> = planned_occurrence::Entity::find()
        .filter(planned_occurrence::Column::PlannedTransactionId.eq(plan.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|occurrence| occurrence.occurrence_date)
        .collect();

    let mut created = 0;
    let occurrences = match after {
        Some(after) => spec.occurrences_from(after),
        None => spec.occurrences(),
    };
    for date in occurrences.take_while(|date| *date <= horizon) {
        if after.is_some_and(|after| date <= after) || existing.contains(&date) {
            continue;
        }
        planned_occurrence::ActiveModel {
            planned_transaction_id: Set(plan.id),
            occurrence_date: Set(date),
            amount: Set(plan.amount),
            status: Set(OccurrenceStatus::Pending),
            executed_date: Set(None),
            transaction_id: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        created += 1;
    }
    debug!("Materialized {} occurrences of plan {} up to {}", created, plan.id, horizon);
    Ok(created)
}

/// Drops pending occurrences of a plan dated after `today`.
async fn clear_future_pending<C: ConnectionTrait>(conn: &C, plan_id: i32, today: NaiveDate) -> ServiceResult<u64> {
    let result = planned_occurrence::Entity::delete_many()
        .filter(planned_occurrence::Column::PlannedTransactionId.eq(plan_id))
        .filter(planned_occurrence::Column::Status.eq(OccurrenceStatus::Pending))
        .filter(planned_occurrence::Column::OccurrenceDate.gt(today))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Creates a plan with its optional rule and materializes it up to `horizon`.
#[instrument(skip(db))]
pub async fn create_planned(
    db: &DatabaseConnection,
    request: CreatePlannedRequest,
    horizon: NaiveDate,
) -> ServiceResult<PlannedTransactionDto> {
    trace!("Entering create_planned function");
    let rule = request
        .recurrence
        .as_ref()
        .map(|recurrence| build_rule(0, request.start_date, recurrence))
        .transpose()?;

    let txn = db.begin().await?;
    ensure_category(&txn, request.category_id).await?;

    let plan = planned_transaction::ActiveModel {
        name: Set(request.name),
        amount: Set(request.amount),
        transaction_type: Set(request.transaction_type),
        category_id: Set(request.category_id),
        start_date: Set(request.start_date),
        is_active: Set(true),
        description: Set(request.description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let rule = match rule {
        Some(rule) => Some(
            insert_rule(
                &txn,
                recurrence_rule::Model {
                    planned_transaction_id: plan.id,
                    ..rule
                },
            )
            .await?,
        ),
        None => None,
    };

    let created = materialize_plan(&txn, &plan, rule.as_ref(), None, horizon).await?;
    txn.commit().await?;

    info!("Planned transaction {} created with {} occurrences", plan.id, created);
    Ok(PlannedTransactionDto::new(plan, rule))
}

#[instrument(skip(db))]
pub async fn get_planned(db: &DatabaseConnection, plan_id: i32) -> ServiceResult<PlannedTransactionDto> {
    let (plan, rule) = find_plan(db, plan_id).await?;
    Ok(PlannedTransactionDto::new(plan, rule))
}

#[instrument(skip(db))]
pub async fn list_planned(db: &DatabaseConnection, query: PlannedQuery) -> ServiceResult<Vec<PlannedTransactionDto>> {
    let mut select = planned_transaction::Entity::find();
    if let Some(active) = query.active {
        select = select.filter(planned_transaction::Column::IsActive.eq(active));
    }
    let plans = select
        .order_by_asc(planned_transaction::Column::StartDate)
        .order_by_asc(planned_transaction::Column::Id)
        .find_also_related(recurrence_rule::Entity)
        .all(db)
        .await?;
    debug!("Retrieved {} planned transactions", plans.len());
    Ok(plans
        .into_iter()
        .map(|(plan, rule)| PlannedTransactionDto::new(plan, rule))
        .collect())
}

/// Updates a plan and regenerates its pending occurrences after `today`.
///
/// A given `recurrence` replaces the stored rule; `remove_recurrence` turns
/// the plan into a one-time plan. Executed and skipped occurrences are kept.
#[instrument(skip(db))]
pub async fn update_planned(
    db: &DatabaseConnection,
    plan_id: i32,
    request: UpdatePlannedRequest,
    today: NaiveDate,
    horizon: NaiveDate,
) -> ServiceResult<PlannedTransactionDto> {
    let txn = db.begin().await?;
    let (plan, old_rule) = find_plan(&txn, plan_id).await?;
    ensure_category(&txn, request.category_id).await?;

    let start_date = request.start_date.unwrap_or(plan.start_date);
    let remove = request.remove_recurrence.unwrap_or(false);
    if remove && request.recurrence.is_some() {
        return Err(ServiceError::Validation(
            "recurrence and remove_recurrence cannot be combined".to_string(),
        ));
    }

    let new_rule = match (&request.recurrence, &old_rule) {
        (Some(recurrence), _) => Some(build_rule(plan.id, start_date, recurrence)?),
        (None, Some(rule)) if !remove => {
            RecurrenceSpec::from_rule(start_date, rule)?;
            None
        }
        _ => None,
    };

    let previous_last = planned_occurrence::Entity::find()
        .filter(planned_occurrence::Column::PlannedTransactionId.eq(plan.id))
        .order_by_desc(planned_occurrence::Column::OccurrenceDate)
        .one(&txn)
        .await?
        .map(|occurrence| occurrence.occurrence_date);

    let mut active: planned_transaction::ActiveModel = plan.into();
    if let Some(name) = request.name {
        active.name = Set(name);
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
    if let Some(start_date) = request.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    if let Some(is_active) = request.is_active {
        active.is_active = Set(is_active);
    }
    let plan = active.update(&txn).await?;

    let rule = if new_rule.is_some() || remove {
        recurrence_rule::Entity::delete_many()
            .filter(recurrence_rule::Column::PlannedTransactionId.eq(plan.id))
            .exec(&txn)
            .await?;
        match new_rule {
            Some(rule) => Some(insert_rule(&txn, rule).await?),
            None => None,
        }
    } else {
        old_rule
    };

    let cleared = clear_future_pending(&txn, plan.id, today).await?;
    let until = previous_last.map_or(horizon, |last| last.max(horizon));
    let created = materialize_plan(&txn, &plan, rule.as_ref(), Some(today), until).await?;
    txn.commit().await?;

    info!(
        "Planned transaction {} updated, {} future occurrences replaced by {}",
        plan.id, cleared, created
    );
    Ok(PlannedTransactionDto::new(plan, rule))
}

/// Stops a plan; its pending occurrences after `today` are dropped.
#[instrument(skip(db))]
pub async fn deactivate_planned(
    db: &DatabaseConnection,
    plan_id: i32,
    today: NaiveDate,
) -> ServiceResult<PlannedTransactionDto> {
    let txn = db.begin().await?;
    let (plan, rule) = find_plan(&txn, plan_id).await?;
    let mut active: planned_transaction::ActiveModel = plan.into();
    active.is_active = Set(false);
    let plan = active.update(&txn).await?;
    let cleared = clear_future_pending(&txn, plan.id, today).await?;
    txn.commit().await?;

    info!("Planned transaction {} deactivated, {} occurrences dropped", plan.id, cleared);
    Ok(PlannedTransactionDto::new(plan, rule))
}

/// Deletes a plan with its rule and occurrences. Recorded transactions stay.
#[instrument(skip(db))]
pub async fn delete_planned(db: &DatabaseConnection, plan_id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;
    let (plan, _) = find_plan(&txn, plan_id).await?;
    planned_occurrence::Entity::delete_many()
        .filter(planned_occurrence::Column::PlannedTransactionId.eq(plan.id))
        .exec(&txn)
        .await?;
    recurrence_rule::Entity::delete_many()
        .filter(recurrence_rule::Column::PlannedTransactionId.eq(plan.id))
        .exec(&txn)
        .await?;
    planned_transaction::Entity::delete_by_id(plan.id).exec(&txn).await?;
    txn.commit().await?;

    info!("Planned transaction {} deleted", plan_id);
    Ok(())
}

fn check_window(from: NaiveDate, to: NaiveDate) -> ServiceResult<()> {
    if from > to {
        warn!("Inverted window {} > {}", from, to);
        return Err(ServiceError::Validation(format!(
            "Date range is inverted: {} > {}",
            from, to
        )));
    }
    Ok(())
}

/// Computes the plan's occurrences in `[from, to]` without storing them.
#[instrument(skip(db))]
pub async fn preview_planned(
    db: &DatabaseConnection,
    plan_id: i32,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<OccurrencePreviewDto>> {
    check_window(from, to)?;
    let (plan, rule) = find_plan(db, plan_id).await?;
    let spec = spec_for(&plan, rule.as_ref())?;
    Ok(spec
        .between(from, to)
        .into_iter()
        .map(|date| OccurrencePreviewDto {
            date,
            amount: plan.amount,
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn list_occurrences(db: &DatabaseConnection, plan_id: i32) -> ServiceResult<Vec<OccurrenceDto>> {
    find_plan(db, plan_id).await?;
    let occurrences = planned_occurrence::Entity::find()
        .filter(planned_occurrence::Column::PlannedTransactionId.eq(plan_id))
        .order_by_asc(planned_occurrence::Column::OccurrenceDate)
        .all(db)
        .await?;
    Ok(occurrences.into_iter().map(OccurrenceDto::from).collect())
}

/// Materializes every active plan up to `horizon`.
#[instrument(skip(db))]
pub async fn materialize_all(db: &DatabaseConnection, horizon: NaiveDate) -> ServiceResult<MaterializeResultDto> {
    let txn = db.begin().await?;
    let plans = planned_transaction::Entity::find()
        .filter(planned_transaction::Column::IsActive.eq(true))
        .find_also_related(recurrence_rule::Entity)
        .all(&txn)
        .await?;

    let mut created = 0;
    for (plan, rule) in &plans {
        created += materialize_plan(&txn, plan, rule.as_ref(), None, horizon).await?;
    }
    txn.commit().await?;

    info!("Materialized {} occurrences across {} plans", created, plans.len());
    Ok(MaterializeResultDto {
        horizon,
        plans: plans.len() as u64,
        created,
    })
}

/// Pending occurrences of active plans in `[from, to]`, soonest first.
pub(crate) async fn upcoming_in<C: ConnectionTrait>(
    conn: &C,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<UpcomingOccurrenceDto>> {
    let rows = planned_occurrence::Entity::find()
        .filter(planned_occurrence::Column::Status.eq(OccurrenceStatus::Pending))
        .filter(planned_occurrence::Column::OccurrenceDate.gte(from))
        .filter(planned_occurrence::Column::OccurrenceDate.lte(to))
        .order_by_asc(planned_occurrence::Column::OccurrenceDate)
        .order_by_asc(planned_occurrence::Column::Id)
        .find_also_related(planned_transaction::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(occurrence, plan)| plan.map(|plan| (occurrence, plan)))
        .filter(|(_, plan)| plan.is_active)
        .map(|(occurrence, plan)| UpcomingOccurrenceDto {
            id: occurrence.id,
            planned_transaction_id: plan.id,
            name: plan.name,
            transaction_type: plan.transaction_type,
            occurrence_date: occurrence.occurrence_date,
            amount: occurrence.amount,
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn upcoming(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<UpcomingOccurrenceDto>> {
    check_window(from, to)?;
    upcoming_in(db, from, to).await
}

/// Records a pending occurrence as a transaction of its plan.
#[instrument(skip(db))]
pub async fn execute_occurrence(
    db: &DatabaseConnection,
    occurrence_id: i32,
    request: ExecuteOccurrenceRequest,
) -> ServiceResult<OccurrenceDto> {
    let txn = db.begin().await?;
    let occurrence = find_occurrence(&txn, occurrence_id).await?;
    if occurrence.status != OccurrenceStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "Occurrence {} is {:?}, only pending occurrences can be executed",
            occurrence_id, occurrence.status
        )));
    }
    let (plan, _) = find_plan(&txn, occurrence.planned_transaction_id).await?;

    let date = request.date.unwrap_or(occurrence.occurrence_date);
    let transaction = record(
        &txn,
        date,
        request.amount.unwrap_or(occurrence.amount),
        plan.transaction_type,
        plan.category_id,
        Some(plan.name.clone()),
    )
    .await?;

    let mut active: planned_occurrence::ActiveModel = occurrence.into();
    active.status = Set(OccurrenceStatus::Executed);
    active.executed_date = Set(Some(date));
    active.transaction_id = Set(Some(transaction.id));
    let occurrence = active.update(&txn).await?;
    txn.commit().await?;

    info!("Occurrence {} executed as transaction {}", occurrence.id, transaction.id);
    Ok(OccurrenceDto::from(occurrence))
}

#[instrument(skip(db))]
pub async fn skip_occurrence(db: &DatabaseConnection, occurrence_id: i32) -> ServiceResult<OccurrenceDto> {
    let occurrence = find_occurrence(db, occurrence_id).await?;
    if occurrence.status != OccurrenceStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "Occurrence {} is {:?}, only pending occurrences can be skipped",
            occurrence_id, occurrence.status
        )));
    }
    let mut active: planned_occurrence::ActiveModel = occurrence.into();
    active.status = Set(OccurrenceStatus::Skipped);
    let occurrence = active.update(db).await?;
    info!("Occurrence {} skipped", occurrence.id);
    Ok(OccurrenceDto::from(occurrence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transactions::{delete_transaction, get_transaction};
    use crate::test_utils::test_utils::setup_test_db;
    use model::entities::recurrence_rule::IntervalUnit;
    use model::entities::transaction::TransactionType;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(frequency: Frequency) -> RecurrenceRuleRequest {
        RecurrenceRuleRequest {
            frequency,
            interval: None,
            interval_unit: None,
            weekdays: None,
            only_workdays: None,
            end_condition: None,
            end_date: None,
            occurrence_count: None,
        }
    }

    fn plan(name: &str, start_date: NaiveDate, recurrence: Option<RecurrenceRuleRequest>) -> CreatePlannedRequest {
        CreatePlannedRequest {
            name: name.to_string(),
            amount: dec!(100),
            transaction_type: TransactionType::Expense,
            category_id: None,
            start_date,
            description: None,
            recurrence,
        }
    }

    #[tokio::test]
    async fn test_monthly_plan_clamps_and_materializes_once() {
        let db = setup_test_db().await;
        let created = create_planned(&db, plan("Rent", d(2024, 1, 31), Some(rule(Frequency::Monthly))), d(2024, 5, 31))
            .await
            .unwrap();
        assert_eq!(created.recurrence.as_ref().unwrap().end_condition, EndCondition::Never);

        let dates: Vec<NaiveDate> = list_occurrences(&db, created.id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.occurrence_date)
            .collect();
        assert_eq!(
            dates,
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30), d(2024, 5, 31)]
        );

        let again = materialize_all(&db, d(2024, 5, 31)).await.unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.plans, 1);

        let extended = materialize_all(&db, d(2024, 6, 30)).await.unwrap();
        assert_eq!(extended.created, 1);
    }

    #[tokio::test]
    async fn test_rule_validation() {
        let db = setup_test_db().await;

        let custom = plan("Custom", d(2024, 1, 1), Some(rule(Frequency::Custom)));
        assert!(matches!(
            create_planned(&db, custom, d(2024, 2, 1)).await,
            Err(ServiceError::Validation(_))
        ));

        let mut weekend_workdays = rule(Frequency::Daily);
        weekend_workdays.weekdays = Some(vec![5, 6]);
        weekend_workdays.only_workdays = Some(true);
        assert!(matches!(
            create_planned(&db, plan("Never", d(2024, 1, 1), Some(weekend_workdays)), d(2024, 2, 1)).await,
            Err(ServiceError::Validation(_))
        ));

        let mut until_before_start = rule(Frequency::Weekly);
        until_before_start.end_date = Some(d(2023, 12, 1));
        assert!(matches!(
            create_planned(&db, plan("Backwards", d(2024, 1, 1), Some(until_before_start)), d(2024, 2, 1)).await,
            Err(ServiceError::Validation(_))
        ));

        let mut custom_days = rule(Frequency::Custom);
        custom_days.interval = Some(10);
        custom_days.interval_unit = Some(IntervalUnit::Days);
        custom_days.occurrence_count = Some(3);
        let created = create_planned(&db, plan("Every ten days", d(2024, 1, 1), Some(custom_days)), d(2024, 12, 31))
            .await
            .unwrap();
        assert_eq!(
            created.recurrence.as_ref().unwrap().end_condition,
            EndCondition::AfterCount
        );
        assert_eq!(list_occurrences(&db, created.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_preview_workdays_only() {
        let db = setup_test_db().await;
        let mut daily = rule(Frequency::Daily);
        daily.only_workdays = Some(true);
        // 2024-05-03 is a Friday
        let created = create_planned(&db, plan("Lunch", d(2024, 5, 3), Some(daily)), d(2024, 5, 1))
            .await
            .unwrap();

        let preview = preview_planned(&db, created.id, d(2024, 5, 3), d(2024, 5, 8)).await.unwrap();
        let dates: Vec<NaiveDate> = preview.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 5, 3), d(2024, 5, 6), d(2024, 5, 7), d(2024, 5, 8)]);
        assert!(list_occurrences(&db, created.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_skip_and_revert() {
        let db = setup_test_db().await;
        let created = create_planned(&db, plan("Gym", d(2024, 3, 1), Some(rule(Frequency::Monthly))), d(2024, 4, 30))
            .await
            .unwrap();
        let occurrences = list_occurrences(&db, created.id).await.unwrap();
        assert_eq!(occurrences.len(), 2);

        let executed = execute_occurrence(
            &db,
            occurrences[0].id,
            ExecuteOccurrenceRequest {
                amount: Some(dec!(95)),
                date: Some(d(2024, 3, 2)),
            },
        )
        .await
        .unwrap();
        assert_eq!(executed.status, OccurrenceStatus::Executed);
        let transaction_id = executed.transaction_id.unwrap();
        let transaction = get_transaction(&db, transaction_id).await.unwrap();
        assert_eq!(transaction.amount, dec!(95));
        assert_eq!(transaction.date, d(2024, 3, 2));

        assert!(matches!(
            execute_occurrence(&db, occurrences[0].id, ExecuteOccurrenceRequest::default()).await,
            Err(ServiceError::Conflict(_))
        ));

        let skipped = skip_occurrence(&db, occurrences[1].id).await.unwrap();
        assert_eq!(skipped.status, OccurrenceStatus::Skipped);
        assert!(upcoming(&db, d(2024, 3, 1), d(2024, 4, 30)).await.unwrap().is_empty());

        delete_transaction(&db, transaction_id).await.unwrap();
        let reverted = list_occurrences(&db, created.id).await.unwrap();
        assert_eq!(reverted[0].status, OccurrenceStatus::Pending);
        assert_eq!(reverted[0].transaction_id, None);
    }

    #[tokio::test]
    async fn test_update_regenerates_future_occurrences() {
        let db = setup_test_db().await;
        let created = create_planned(&db, plan("Rent", d(2024, 1, 1), Some(rule(Frequency::Monthly))), d(2024, 6, 30))
            .await
            .unwrap();

        update_planned(
            &db,
            created.id,
            UpdatePlannedRequest {
                amount: Some(dec!(120)),
                ..Default::default()
            },
            d(2024, 3, 15),
            d(2024, 4, 30),
        )
        .await
        .unwrap();

        let occurrences = list_occurrences(&db, created.id).await.unwrap();
        assert_eq!(occurrences.len(), 6);
        let amounts: Vec<_> = occurrences.iter().map(|o| o.amount).collect();
        assert_eq!(
            amounts,
            vec![dec!(100), dec!(100), dec!(100), dec!(120), dec!(120), dec!(120)]
        );

        let deactivated = deactivate_planned(&db, created.id, d(2024, 3, 15)).await.unwrap();
        assert!(!deactivated.is_active);
        assert_eq!(list_occurrences(&db, created.id).await.unwrap().len(), 3);

        delete_planned(&db, created.id).await.unwrap();
        assert!(matches!(
            get_planned(&db, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
