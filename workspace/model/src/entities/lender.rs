use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::loan;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
pub enum LenderType {
    #[sea_orm(string_value = "Bank")]
    Bank,
    #[sea_orm(string_value = "Microfinance")]
    Microfinance,
    #[sea_orm(string_value = "Individual")]
    Individual,
    #[sea_orm(string_value = "Collector")]
    Collector,
    #[sea_orm(string_value = "Other")]
    Other,
}

/// A creditor: the party a loan was taken from or is currently owed to.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lenders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub lender_type: LenderType,
    pub description: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Loans currently held by this lender.
    #[sea_orm(has_many = "loan::Entity")]
    Loan,
}

impl Related<loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
