use chrono::NaiveDate;
use model::entities::planned_occurrence::{self, OccurrenceStatus};
use model::entities::planned_transaction;
use model::entities::recurrence_rule::{self, EndCondition, Frequency, IntervalUnit};
use model::entities::transaction::TransactionType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validators::{positive_amount, weekday_numbers};

/// Recurrence part of a planned transaction request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct RecurrenceRuleRequest {
    pub frequency: Frequency,
    /// Units between two occurrences (default: 1)
    #[validate(range(min = 1, max = 1000))]
    pub interval: Option<i32>,
    /// Step unit, required when `frequency` is `Custom`
    pub interval_unit: Option<IntervalUnit>,
    /// Weekday numbers, Monday = 0
    #[validate(custom(function = "weekday_numbers"))]
    pub weekdays: Option<Vec<u8>>,
    pub only_workdays: Option<bool>,
    /// Default: `Never`, or derived from `end_date`/`occurrence_count` when given
    pub end_condition: Option<EndCondition>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 5000))]
    pub occurrence_count: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreatePlannedRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category_id: Option<i32>,
    pub start_date: NaiveDate,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Without a rule the plan occurs once, on `start_date`
    #[validate(nested)]
    pub recurrence: Option<RecurrenceRuleRequest>,
}

/// Absent fields are left unchanged; a given `recurrence` replaces the rule.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdatePlannedRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[validate(nested)]
    pub recurrence: Option<RecurrenceRuleRequest>,
    /// Drop the rule, turning the plan into a one-time plan
    pub remove_recurrence: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct PlannedQuery {
    /// Only active (`true`) or inactive (`false`) plans
    pub active: Option<bool>,
}

/// Inclusive date window; defaults are chosen by the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct WindowQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default)]
pub struct MaterializeRequest {
    /// Last date to materialize (default: configured horizon from today)
    pub horizon: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct ExecuteOccurrenceRequest {
    /// Override of the planned amount
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    /// Transaction date (default: the occurrence date)
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecurrenceRuleDto {
    pub frequency: Frequency,
    pub interval: i32,
    pub interval_unit: IntervalUnit,
    pub weekdays: Option<Vec<u8>>,
    pub only_workdays: bool,
    pub end_condition: EndCondition,
    pub end_date: Option<NaiveDate>,
    pub occurrence_count: Option<i32>,
}

impl From<recurrence_rule::Model> for RecurrenceRuleDto {
    fn from(model: recurrence_rule::Model) -> Self {
        let weekdays = model.weekdays.as_deref().map(|list| {
            list.split(',')
                .filter_map(|day| day.trim().parse::<u8>().ok())
                .collect::<Vec<_>>()
        });
        Self {
            frequency: model.frequency,
            interval: model.interval,
            interval_unit: model.interval_unit,
            weekdays: weekdays.filter(|days| !days.is_empty()),
            only_workdays: model.only_workdays,
            end_condition: model.end_condition,
            end_date: model.end_date,
            occurrence_count: model.occurrence_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PlannedTransactionDto {
    pub id: i32,
    pub name: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category_id: Option<i32>,
    pub start_date: NaiveDate,
    pub is_active: bool,
    pub description: Option<String>,
    pub recurrence: Option<RecurrenceRuleDto>,
}

impl PlannedTransactionDto {
    pub fn new(plan: planned_transaction::Model, rule: Option<recurrence_rule::Model>) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            amount: plan.amount,
            transaction_type: plan.transaction_type,
            category_id: plan.category_id,
            start_date: plan.start_date,
            is_active: plan.is_active,
            description: plan.description,
            recurrence: rule.map(RecurrenceRuleDto::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct OccurrenceDto {
    pub id: i32,
    pub planned_transaction_id: i32,
    pub occurrence_date: NaiveDate,
    pub amount: Decimal,
    pub status: OccurrenceStatus,
    pub executed_date: Option<NaiveDate>,
    pub transaction_id: Option<i32>,
}

impl From<planned_occurrence::Model> for OccurrenceDto {
    fn from(model: planned_occurrence::Model) -> Self {
        Self {
            id: model.id,
            planned_transaction_id: model.planned_transaction_id,
            occurrence_date: model.occurrence_date,
            amount: model.amount,
            status: model.status,
            executed_date: model.executed_date,
            transaction_id: model.transaction_id,
        }
    }
}

/// A computed, not yet persisted occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct OccurrencePreviewDto {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MaterializeResultDto {
    pub horizon: NaiveDate,
    /// Plans examined
    pub plans: u64,
    /// Occurrences inserted
    pub created: u64,
}

/// A pending occurrence together with its plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpcomingOccurrenceDto {
    pub id: i32,
    pub planned_transaction_id: i32,
    pub name: String,
    pub transaction_type: TransactionType,
    pub occurrence_date: NaiveDate,
    pub amount: Decimal,
}
