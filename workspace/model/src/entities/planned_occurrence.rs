use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{planned_transaction, transaction};

/// Represents the status of a single planned occurrence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum OccurrenceStatus {
    #[sea_orm(string_value = "Pending")]
    Pending, // Expected but not yet recorded.
    #[sea_orm(string_value = "Executed")]
    Executed, // Recorded as a transaction.
    #[sea_orm(string_value = "Skipped")]
    Skipped, // The user decided it will not happen.
}

/// One concrete dated instance generated from a planned transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "planned_occurrences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub planned_transaction_id: i32,
    pub occurrence_date: NaiveDate,
    /// The amount expected, inherited from the plan at materialization.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub status: OccurrenceStatus,
    pub executed_date: Option<NaiveDate>,
    /// The transaction recording this occurrence.
    pub transaction_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "planned_transaction::Entity",
        from = "Column::PlannedTransactionId",
        to = "planned_transaction::Column::Id",
        on_delete = "Cascade"
    )]
    PlannedTransaction,
    #[sea_orm(
        belongs_to = "transaction::Entity",
        from = "Column::TransactionId",
        to = "transaction::Column::Id",
        on_delete = "SetNull"
    )]
    Transaction,
}

impl Related<planned_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedTransaction.def()
    }
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
