use chrono::NaiveDate;
use model::entities::transaction::{self, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validators::positive_amount;

/// Request body for recording a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateTransactionRequest {
    pub date: NaiveDate,
    /// Positive amount; the direction comes from `transaction_type`
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category_id: Option<i32>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request body for updating a transaction. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdateTransactionRequest {
    pub date: Option<NaiveDate>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<i32>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Filters for listing transactions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct TransactionQuery {
    /// Inclusive lower date bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub to: Option<NaiveDate>,
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate)]
pub struct PeriodQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TransactionDto {
    pub id: i32,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category_id: Option<i32>,
    pub description: Option<String>,
}

impl From<transaction::Model> for TransactionDto {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            amount: model.amount,
            transaction_type: model.transaction_type,
            category_id: model.category_id,
            description: model.description,
        }
    }
}

/// Income and expense totals of a period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PeriodSummaryDto {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    /// `income - expense`
    pub net: Decimal,
    pub transaction_count: u64,
}
