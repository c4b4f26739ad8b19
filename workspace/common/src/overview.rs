use chrono::NaiveDate;
use model::entities::loan_payment::PaymentStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::pending::PendingPaymentDto;
use crate::planned::UpcomingOccurrenceDto;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct OverviewQuery {
    /// Days ahead to include (default: configured window)
    #[validate(range(min = 1, max = 366))]
    pub days: Option<u32>,
}

/// An open loan payment due inside the overview window, or already overdue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoanPaymentDueDto {
    pub payment_id: i32,
    pub loan_id: i32,
    pub loan_name: String,
    pub scheduled_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: PaymentStatus,
}

/// Dashboard snapshot for one day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct OverviewDto {
    pub today: NaiveDate,
    pub window_end: NaiveDate,
    pub upcoming: Vec<UpcomingOccurrenceDto>,
    pub loan_payments: Vec<LoanPaymentDueDto>,
    pub pending_payments: Vec<PendingPaymentDto>,
    pub pending_total: Decimal,
    pub month_income: Decimal,
    pub month_expense: Decimal,
    pub month_net: Decimal,
}
