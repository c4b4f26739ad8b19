use chrono::NaiveDate;
use model::entities::pending_payment::{self, PendingStatus, Priority};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validators::positive_amount;

/// Request body for tracking an undated expense.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreatePendingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub category_id: Option<i32>,
    /// Default: `Medium`
    pub priority: Option<Priority>,
    pub target_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdatePendingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    pub category_id: Option<i32>,
    pub priority: Option<Priority>,
    pub target_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct PendingQuery {
    pub status: Option<PendingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct ExecutePendingRequest {
    /// Default: today
    pub executed_date: Option<NaiveDate>,
    /// Amount actually paid (default: the tracked amount)
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PendingPaymentDto {
    pub id: i32,
    pub name: String,
    pub amount: Decimal,
    pub category_id: Option<i32>,
    pub priority: Priority,
    pub target_date: Option<NaiveDate>,
    pub status: PendingStatus,
    pub executed_date: Option<NaiveDate>,
    pub transaction_id: Option<i32>,
    pub notes: Option<String>,
}

impl From<pending_payment::Model> for PendingPaymentDto {
    fn from(model: pending_payment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            amount: model.amount,
            category_id: model.category_id,
            priority: model.priority,
            target_date: model.target_date,
            status: model.status,
            executed_date: model.executed_date,
            transaction_id: model.transaction_id,
            notes: model.notes,
        }
    }
}
