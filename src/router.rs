use crate::handlers::{
    categories::{create_category, delete_category, get_categories, get_category, update_category},
    health::health_check,
    loans::{
        create_lender, create_loan, delete_lender, delete_loan, early_repayment,
        execute_loan_payment, get_lender, get_lenders, get_loan, get_loan_payments,
        get_loan_summary, get_loans, preview_schedule, refresh_overdue, update_lender,
    },
    overview::get_overview,
    pending::{
        cancel_pending, create_pending, execute_pending, get_pending, get_pending_list,
        update_pending,
    },
    planned::{
        create_planned, deactivate_planned, delete_planned, execute_occurrence,
        get_plan_occurrences, get_planned, get_planned_list, get_upcoming, materialize,
        preview_planned, skip_occurrence, update_planned,
    },
    transactions::{
        create_transaction, delete_transaction, get_period_summary, get_transaction,
        get_transactions, update_transaction,
    },
    transfers::{get_loan_transfers, transfer_loan},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Category CRUD routes
        .route("/api/v1/categories", post(create_category).get(get_categories))
        .route(
            "/api/v1/categories/:category_id",
            get(get_category).put(update_category).delete(delete_category),
        )
        // Transaction routes
        .route("/api/v1/transactions", post(create_transaction).get(get_transactions))
        .route("/api/v1/transactions/summary", get(get_period_summary))
        .route(
            "/api/v1/transactions/:transaction_id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        // Planned transaction routes
        .route("/api/v1/planned", post(create_planned).get(get_planned_list))
        .route("/api/v1/planned/materialize", post(materialize))
        .route(
            "/api/v1/planned/:plan_id",
            get(get_planned).put(update_planned).delete(delete_planned),
        )
        .route("/api/v1/planned/:plan_id/deactivate", post(deactivate_planned))
        .route("/api/v1/planned/:plan_id/preview", get(preview_planned))
        .route("/api/v1/planned/:plan_id/occurrences", get(get_plan_occurrences))
        // Occurrence routes
        .route("/api/v1/occurrences/upcoming", get(get_upcoming))
        .route("/api/v1/occurrences/:occurrence_id/execute", post(execute_occurrence))
        .route("/api/v1/occurrences/:occurrence_id/skip", post(skip_occurrence))
        // Lender CRUD routes
        .route("/api/v1/lenders", post(create_lender).get(get_lenders))
        .route(
            "/api/v1/lenders/:lender_id",
            get(get_lender).put(update_lender).delete(delete_lender),
        )
        // Loan routes
        .route("/api/v1/loans", post(create_loan).get(get_loans))
        .route("/api/v1/loans/refresh", post(refresh_overdue))
        .route("/api/v1/loans/schedule-preview", post(preview_schedule))
        .route("/api/v1/loans/:loan_id", get(get_loan).delete(delete_loan))
        .route("/api/v1/loans/:loan_id/payments", get(get_loan_payments))
        .route("/api/v1/loans/:loan_id/summary", get(get_loan_summary))
        .route("/api/v1/loans/:loan_id/early-repayment", post(early_repayment))
        .route("/api/v1/loans/:loan_id/transfer", post(transfer_loan))
        .route("/api/v1/loans/:loan_id/transfers", get(get_loan_transfers))
        .route("/api/v1/loan-payments/:payment_id/execute", post(execute_loan_payment))
        // Pending payment routes
        .route("/api/v1/pending", post(create_pending).get(get_pending_list))
        .route(
            "/api/v1/pending/:pending_id",
            get(get_pending).put(update_pending),
        )
        .route("/api/v1/pending/:pending_id/execute", post(execute_pending))
        .route("/api/v1/pending/:pending_id/cancel", post(cancel_pending))
        // Dashboard
        .route("/api/v1/overview", get(get_overview))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
