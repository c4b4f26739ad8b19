use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{lender, loan};

/// Reassignment of a loan's remaining balance from one lender to another.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debt_transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub loan_id: i32,
    pub from_lender_id: i32,
    pub to_lender_id: i32,
    pub transfer_date: NaiveDate,
    /// Remaining balance right before the transfer.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub previous_balance: Decimal,
    /// Balance claimed by the new holder.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub transfer_amount: Decimal,
    /// `transfer_amount - previous_balance`, negative when the debt shrank.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount_difference: Decimal,
    pub reason: Option<String>,
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
        from = "Column::FromLenderId",
        to = "lender::Column::Id",
        on_delete = "Restrict"
    )]
    FromLender,
    #[sea_orm(
        belongs_to = "lender::Entity",
        from = "Column::ToLenderId",
        to = "lender::Column::Id",
        on_delete = "Restrict"
    )]
    ToLender,
}

impl Related<loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
