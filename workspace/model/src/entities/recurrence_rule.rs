use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::planned_transaction;

/// User facing recurrence preset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Frequency {
    #[sea_orm(string_value = "Daily")]
    Daily,
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    #[sea_orm(string_value = "Monthly")]
    Monthly,
    #[sea_orm(string_value = "Yearly")]
    Yearly,
    #[sea_orm(string_value = "Custom")]
    Custom, // uses interval_unit
}

/// Calendar unit one recurrence step advances by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum IntervalUnit {
    #[sea_orm(string_value = "Days")]
    Days,
    #[sea_orm(string_value = "Weeks")]
    Weeks,
    #[sea_orm(string_value = "Months")]
    Months,
    #[sea_orm(string_value = "Years")]
    Years,
}

/// How a recurrence terminates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum EndCondition {
    #[sea_orm(string_value = "Never")]
    Never,
    #[sea_orm(string_value = "UntilDate")]
    UntilDate,
    #[sea_orm(string_value = "AfterCount")]
    AfterCount,
}

impl Frequency {
    /// The unit implied by the preset, `None` for `Custom`.
    pub fn preset_unit(&self) -> Option<IntervalUnit> {
        match self {
            Frequency::Daily => Some(IntervalUnit::Days),
            Frequency::Weekly => Some(IntervalUnit::Weeks),
            Frequency::Monthly => Some(IntervalUnit::Months),
            Frequency::Yearly => Some(IntervalUnit::Years),
            Frequency::Custom => None,
        }
    }
}

/// The recurrence rule of a planned transaction (at most one per plan).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recurrence_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub planned_transaction_id: i32,
    pub frequency: Frequency,
    /// Number of units between two steps, at least 1.
    pub interval: i32,
    /// Step unit when `frequency` is `Custom`.
    pub interval_unit: IntervalUnit,
    /// Comma separated weekday numbers, Monday = 0.
    pub weekdays: Option<String>,
    #[sea_orm(default_value = "false")]
    pub only_workdays: bool,
    pub end_condition: EndCondition,
    /// Inclusive last date, used with `UntilDate`.
    pub end_date: Option<NaiveDate>,
    /// Number of occurrences, used with `AfterCount`.
    pub occurrence_count: Option<i32>,
}

impl Model {
    /// The unit a step actually advances by.
    pub fn effective_unit(&self) -> IntervalUnit {
        self.frequency.preset_unit().unwrap_or(self.interval_unit)
    }
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
}

impl Related<planned_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlannedTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
