use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{pending_payment, planned_transaction, transaction};

/// Whether a category groups income or expenses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum CategoryType {
    #[sea_orm(string_value = "Income")]
    Income,
    #[sea_orm(string_value = "Expense")]
    Expense,
}

/// A category used to classify transactions, plans and pending payments.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub category_type: CategoryType,
    /// A description of what the category is for.
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "transaction::Entity")]
    Transaction,
    #[sea_orm(has_many = "planned_transaction::Entity")]
    PlannedTransaction,
    #[sea_orm(has_many = "pending_payment::Entity")]
    PendingPayment,
}

impl Related<transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<planned_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedTransaction.def()
    }
}

impl Related<pending_payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PendingPayment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
