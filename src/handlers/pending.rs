use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{
    CreatePendingRequest, ExecutePendingRequest, PendingPaymentDto, PendingQuery,
    UpdatePendingRequest,
};
use tracing::{debug, info, instrument, trace};

use super::{error_response, today, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::pending;

/// Track a new pending payment
#[utoipa::path(
    post,
    path = "/api/v1/pending",
    tag = "pending",
    request_body = CreatePendingRequest,
    responses(
        (status = 201, description = "Pending payment created successfully", body = ApiResponse<PendingPaymentDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_pending(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreatePendingRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PendingPaymentDto>>), HandlerError> {
    trace!("Entering create_pending function");
    debug!("Creating pending payment '{}' of {}", request.name, request.amount);

    match pending::create_pending(&state.db, request).await {
        Ok(payment) => {
            info!("Pending payment created successfully with ID: {}", payment.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(payment, "Pending payment created successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// List pending payments, active and most pressing first
#[utoipa::path(
    get,
    path = "/api/v1/pending",
    tag = "pending",
    params(PendingQuery),
    responses(
        (status = 200, description = "Pending payments retrieved successfully", body = ApiResponse<Vec<PendingPaymentDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_pending_list(
    Valid(Query(query)): Valid<Query<PendingQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<PendingPaymentDto>>>), HandlerError> {
    trace!("Entering get_pending_list function");

    let payments = pending::list_pending(&state.db, query)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(payments, "Pending payments retrieved successfully")),
    ))
}

/// Get a pending payment by ID
#[utoipa::path(
    get,
    path = "/api/v1/pending/{pending_id}",
    tag = "pending",
    params(("pending_id" = i32, Path, description = "Pending payment ID")),
    responses(
        (status = 200, description = "Pending payment retrieved successfully", body = ApiResponse<PendingPaymentDto>),
        (status = 404, description = "Pending payment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_pending(
    Path(pending_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<PendingPaymentDto>>), HandlerError> {
    trace!("Entering get_pending function");

    let payment = pending::get_pending(&state.db, pending_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(payment, "Pending payment retrieved successfully")),
    ))
}

/// Update an active pending payment
#[utoipa::path(
    put,
    path = "/api/v1/pending/{pending_id}",
    tag = "pending",
    params(("pending_id" = i32, Path, description = "Pending payment ID")),
    request_body = UpdatePendingRequest,
    responses(
        (status = 200, description = "Pending payment updated successfully", body = ApiResponse<PendingPaymentDto>),
        (status = 404, description = "Pending payment not found", body = ErrorResponse),
        (status = 409, description = "Pending payment is no longer active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_pending(
    Path(pending_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdatePendingRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PendingPaymentDto>>), HandlerError> {
    trace!("Entering update_pending function");

    let payment = pending::update_pending(&state.db, pending_id, request)
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(payment, "Pending payment updated successfully")),
    ))
}

/// Pay a pending payment, recording an expense
#[utoipa::path(
    post,
    path = "/api/v1/pending/{pending_id}/execute",
    tag = "pending",
    params(("pending_id" = i32, Path, description = "Pending payment ID")),
    request_body = ExecutePendingRequest,
    responses(
        (status = 200, description = "Pending payment executed", body = ApiResponse<PendingPaymentDto>),
        (status = 404, description = "Pending payment not found", body = ErrorResponse),
        (status = 409, description = "Pending payment is no longer active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn execute_pending(
    Path(pending_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ExecutePendingRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PendingPaymentDto>>), HandlerError> {
    trace!("Entering execute_pending function");

    match pending::execute_pending(&state.db, pending_id, request, today()).await {
        Ok(payment) => {
            info!("Pending payment {} executed", payment.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(payment, "Pending payment executed")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Cancel an active pending payment
#[utoipa::path(
    post,
    path = "/api/v1/pending/{pending_id}/cancel",
    tag = "pending",
    params(("pending_id" = i32, Path, description = "Pending payment ID")),
    responses(
        (status = 200, description = "Pending payment cancelled", body = ApiResponse<PendingPaymentDto>),
        (status = 404, description = "Pending payment not found", body = ErrorResponse),
        (status = 409, description = "Pending payment is no longer active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_pending(
    Path(pending_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<PendingPaymentDto>>), HandlerError> {
    trace!("Entering cancel_pending function");

    let payment = pending::cancel_pending(&state.db, pending_id)
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(payment, "Pending payment cancelled")),
    ))
}
