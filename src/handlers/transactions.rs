use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{
    CreateTransactionRequest, PeriodQuery, PeriodSummaryDto, TransactionDto, TransactionQuery,
    UpdateTransactionRequest,
};
use tracing::{debug, info, instrument, trace};

use super::{error_response, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::transactions;

/// Record a transaction
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = ApiResponse<TransactionDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_transaction(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateTransactionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), HandlerError> {
    trace!("Entering create_transaction function");
    debug!(
        "Creating {:?} transaction of {} on {}",
        request.transaction_type, request.amount, request.date
    );

    match transactions::create_transaction(&state.db, request).await {
        Ok(transaction) => {
            info!("Transaction created successfully with ID: {}", transaction.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(transaction, "Transaction created successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// List transactions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<Vec<TransactionDto>>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transactions(
    Valid(Query(query)): Valid<Query<TransactionQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TransactionDto>>>), HandlerError> {
    trace!("Entering get_transactions function");

    let transactions = transactions::list_transactions(&state.db, query)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(transactions, "Transactions retrieved successfully")),
    ))
}

/// Get a transaction by ID
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(("transaction_id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction retrieved successfully", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), HandlerError> {
    trace!("Entering get_transaction function");

    let transaction = transactions::get_transaction(&state.db, transaction_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(transaction, "Transaction retrieved successfully")),
    ))
}

/// Update a transaction
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(("transaction_id" = i32, Path, description = "Transaction ID")),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated successfully", body = ApiResponse<TransactionDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 409, description = "Transaction settles a loan payment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateTransactionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), HandlerError> {
    trace!("Entering update_transaction function");

    match transactions::update_transaction(&state.db, transaction_id, request).await {
        Ok(transaction) => {
            info!("Transaction {} updated", transaction.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(transaction, "Transaction updated successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Delete a transaction, reopening the occurrence or pending payment it settled
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(("transaction_id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 409, description = "Transaction settles a loan payment", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), HandlerError> {
    trace!("Entering delete_transaction function");

    match transactions::delete_transaction(&state.db, transaction_id).await {
        Ok(()) => {
            info!("Transaction {} deleted", transaction_id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(
                    format!("Transaction {} deleted", transaction_id),
                    "Transaction deleted successfully",
                )),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Income, expense and net over a period
#[utoipa::path(
    get,
    path = "/api/v1/transactions/summary",
    tag = "transactions",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Summary computed successfully", body = ApiResponse<PeriodSummaryDto>),
        (status = 400, description = "Invalid period", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_period_summary(
    Valid(Query(query)): Valid<Query<PeriodQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<PeriodSummaryDto>>), HandlerError> {
    trace!("Entering get_period_summary function");
    debug!("Summarizing transactions from {} to {}", query.from, query.to);

    let summary = transactions::period_summary(&state.db, query.from, query.to)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(summary, "Summary computed successfully")),
    ))
}
