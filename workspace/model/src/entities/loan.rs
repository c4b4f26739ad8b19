use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{debt_transfer, lender, loan_payment};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum LoanType {
    #[sea_orm(string_value = "Consumer")]
    Consumer,
    #[sea_orm(string_value = "Mortgage")]
    Mortgage,
    #[sea_orm(string_value = "Car")]
    Car,
    #[sea_orm(string_value = "Microloan")]
    Microloan,
    #[sea_orm(string_value = "CreditCard")]
    CreditCard,
    #[sea_orm(string_value = "Personal")]
    Personal,
    #[sea_orm(string_value = "Other")]
    Other,
}

/// How the principal is spread over the schedule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum PaymentScheme {
    #[sea_orm(string_value = "Annuity")]
    Annuity, // level total payment
    #[sea_orm(string_value = "Differentiated")]
    Differentiated, // level principal portion
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum LoanStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Overdue")]
    Overdue,
    #[sea_orm(string_value = "PaidOff")]
    PaidOff,
}

/// A loan or debt with its amortization parameters.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The lender that issued the loan, never changes.
    pub original_lender_id: i32,
    /// The lender currently holding the debt.
    pub lender_id: i32,
    pub name: String,
    pub loan_type: LoanType,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub principal: Decimal,
    /// Annual interest rate in percent.
    #[sea_orm(column_type = "Decimal(Some((8, 4)))")]
    pub annual_rate: Decimal,
    pub term_months: i32,
    pub issue_date: NaiveDate,
    pub payment_scheme: PaymentScheme,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub remaining_balance: Decimal,
    pub status: LoanStatus,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "lender::Entity",
        from = "Column::LenderId",
        to = "lender::Column::Id",
        on_delete = "Restrict"
    )]
    Lender,
    #[sea_orm(
        belongs_to = "lender::Entity",
        from = "Column::OriginalLenderId",
        to = "lender::Column::Id",
        on_delete = "Restrict"
    )]
    OriginalLender,
    #[sea_orm(has_many = "loan_payment::Entity")]
    LoanPayment,
    #[sea_orm(has_many = "debt_transfer::Entity")]
    DebtTransfer,
}

impl Related<lender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lender.def()
    }
}

impl Related<loan_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanPayment.def()
    }
}

impl Related<debt_transfer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DebtTransfer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
