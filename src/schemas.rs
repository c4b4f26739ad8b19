use chrono::NaiveDate;
use common::{
    CategoryDto, CreateCategoryRequest, CreateLenderRequest, CreateLoanRequest,
    CreatePendingRequest, CreatePlannedRequest, CreateTransactionRequest, DebtTransferDto,
    EarlyRepaymentRequest, EarlyRepaymentResultDto, ExecuteOccurrenceRequest,
    ExecutePaymentRequest, ExecutePendingRequest, LenderDto, LoanDto, LoanPaymentDto,
    LoanPaymentDueDto, LoanSummaryDto, LoanWithScheduleDto, MaterializeRequest,
    MaterializeResultDto, OccurrenceDto, OccurrencePreviewDto, OverviewDto, PendingPaymentDto,
    PeriodSummaryDto, PlannedTransactionDto, RecurrenceRuleDto, RecurrenceRuleRequest,
    RefreshResultDto, RepaymentMode, ScheduledPaymentDto, SchedulePreviewRequest, TransactionDto,
    TransferLoanRequest, TransferResultDto, UpcomingOccurrenceDto, UpdateCategoryRequest,
    UpdateLenderRequest, UpdatePendingRequest, UpdatePlannedRequest, UpdateTransactionRequest,
};
use model::entities::{
    category::CategoryType,
    lender::LenderType,
    loan::{LoanStatus, LoanType, PaymentScheme},
    loan_payment::{PaymentKind, PaymentStatus},
    pending_payment::{PendingStatus, Priority},
    planned_occurrence::OccurrenceStatus,
    recurrence_rule::{EndCondition, Frequency, IntervalUnit},
    transaction::TransactionType,
};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::config::Settings;

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
    pub settings: Settings,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Overview(OverviewDto),
}

pub fn overview_cache_key(today: NaiveDate, days: u32) -> String {
    format!("overview_{}_{}", today, days)
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::get_transactions,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::update_transaction,
        crate::handlers::transactions::delete_transaction,
        crate::handlers::transactions::get_period_summary,
        crate::handlers::planned::create_planned,
        crate::handlers::planned::get_planned_list,
        crate::handlers::planned::get_planned,
        crate::handlers::planned::update_planned,
        crate::handlers::planned::delete_planned,
        crate::handlers::planned::deactivate_planned,
        crate::handlers::planned::preview_planned,
        crate::handlers::planned::get_plan_occurrences,
        crate::handlers::planned::materialize,
        crate::handlers::planned::get_upcoming,
        crate::handlers::planned::execute_occurrence,
        crate::handlers::planned::skip_occurrence,
        crate::handlers::loans::create_lender,
        crate::handlers::loans::get_lenders,
        crate::handlers::loans::get_lender,
        crate::handlers::loans::update_lender,
        crate::handlers::loans::delete_lender,
        crate::handlers::loans::create_loan,
        crate::handlers::loans::get_loans,
        crate::handlers::loans::get_loan,
        crate::handlers::loans::delete_loan,
        crate::handlers::loans::get_loan_payments,
        crate::handlers::loans::get_loan_summary,
        crate::handlers::loans::execute_loan_payment,
        crate::handlers::loans::refresh_overdue,
        crate::handlers::loans::early_repayment,
        crate::handlers::loans::preview_schedule,
        crate::handlers::transfers::transfer_loan,
        crate::handlers::transfers::get_loan_transfers,
        crate::handlers::pending::create_pending,
        crate::handlers::pending::get_pending_list,
        crate::handlers::pending::get_pending,
        crate::handlers::pending::update_pending,
        crate::handlers::pending::execute_pending,
        crate::handlers::pending::cancel_pending,
        crate::handlers::overview::get_overview,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CategoryType,
            TransactionType,
            Frequency,
            IntervalUnit,
            EndCondition,
            OccurrenceStatus,
            LenderType,
            LoanType,
            PaymentScheme,
            LoanStatus,
            PaymentStatus,
            PaymentKind,
            Priority,
            PendingStatus,
            RepaymentMode,
            CategoryDto,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            TransactionDto,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            PeriodSummaryDto,
            PlannedTransactionDto,
            RecurrenceRuleDto,
            RecurrenceRuleRequest,
            CreatePlannedRequest,
            UpdatePlannedRequest,
            OccurrenceDto,
            OccurrencePreviewDto,
            UpcomingOccurrenceDto,
            MaterializeRequest,
            MaterializeResultDto,
            ExecuteOccurrenceRequest,
            LenderDto,
            CreateLenderRequest,
            UpdateLenderRequest,
            LoanDto,
            CreateLoanRequest,
            LoanPaymentDto,
            LoanWithScheduleDto,
            LoanSummaryDto,
            ExecutePaymentRequest,
            EarlyRepaymentRequest,
            EarlyRepaymentResultDto,
            RefreshResultDto,
            SchedulePreviewRequest,
            ScheduledPaymentDto,
            TransferLoanRequest,
            TransferResultDto,
            DebtTransferDto,
            PendingPaymentDto,
            CreatePendingRequest,
            UpdatePendingRequest,
            ExecutePendingRequest,
            OverviewDto,
            LoanPaymentDueDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "categories", description = "Income and expense categories"),
        (name = "transactions", description = "Recorded transactions"),
        (name = "planned", description = "Planned transactions and their occurrences"),
        (name = "loans", description = "Lenders, loans and payment schedules"),
        (name = "transfers", description = "Debt transfers between lenders"),
        (name = "pending", description = "Undated pending payments"),
        (name = "overview", description = "Dashboard overview"),
    ),
    info(
        title = "fintrack API",
        description = "Personal finance tracker - planned transactions, loans and pending payments",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
