use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::transaction::TransactionType;
use super::{category, planned_occurrence, recurrence_rule};

/// A template describing a future income or expense.
///
/// Without a recurrence rule the plan is one-time and occurs on `start_date`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "planned_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// The value of each occurrence, always positive.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category_id: Option<i32>,
    /// The date of the first occurrence and the anchor of the recurrence.
    pub start_date: NaiveDate,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_one = "recurrence_rule::Entity")]
    RecurrenceRule,
    #[sea_orm(has_many = "planned_occurrence::Entity")]
    PlannedOccurrence,
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<recurrence_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurrenceRule.def()
    }
}

impl Related<planned_occurrence::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedOccurrence.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
