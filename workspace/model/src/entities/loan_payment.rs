use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{lender, loan, transaction};

/// Represents the status of a single loan payment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "Pending")]
    Pending, // Scheduled, not yet due or paid.
    #[sea_orm(string_value = "Overdue")]
    Overdue, // Past its scheduled date and not paid.
    #[sea_orm(string_value = "Executed")]
    Executed, // Paid on or before the scheduled date.
    #[sea_orm(string_value = "ExecutedLate")]
    ExecutedLate, // Paid after the scheduled date.
    #[sea_orm(string_value = "Cancelled")]
    Cancelled, // Dropped by an early repayment.
}

impl PaymentStatus {
    /// Pending or overdue: still owed and still mutable.
    pub fn is_open(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Overdue)
    }

    /// Executed or executed late: settled history that never changes again.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Executed | PaymentStatus::ExecutedLate)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum PaymentKind {
    #[sea_orm(string_value = "Scheduled")]
    Scheduled,
    #[sea_orm(string_value = "EarlyRepayment")]
    EarlyRepayment,
}

/// One entry of a loan's payment schedule.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loan_payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub loan_id: i32,
    /// The lender this payment is owed to.
    pub lender_id: i32,
    /// 1-based position in the schedule.
    pub sequence: i32,
    pub scheduled_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub principal_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub interest_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_amount: Decimal,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
    pub executed_date: Option<NaiveDate>,
    pub transaction_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "loan::Entity",
        from = "Column::LoanId",
        to = "loan::Column::Id",
        on_delete = "Cascade"
    )]
    Loan,
    #[sea_orm(
        belongs_to = "lender::Entity",
        from = "Column::LenderId",
        to = "lender::Column::Id",
        on_delete = "Restrict"
    )]
    Lender,
    #[sea_orm(
        belongs_to = "transaction::Entity",
        from = "Column::TransactionId",
        to = "transaction::Column::Id",
        on_delete = "SetNull"
    )]
    Transaction,
}

impl Related<loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
