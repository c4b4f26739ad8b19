use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{
    CreateLenderRequest, CreateLoanRequest, EarlyRepaymentRequest, EarlyRepaymentResultDto,
    ExecutePaymentRequest, LenderDto, LoanDto, LoanPaymentDto, LoanQuery, LoanSummaryDto,
    LoanWithScheduleDto, RefreshResultDto, ScheduledPaymentDto, SchedulePreviewRequest,
    UpdateLenderRequest,
};
use tracing::{debug, info, instrument, trace};

use super::{error_response, today, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::loans;

// ===================== Lenders =====================

/// Register a lender
#[utoipa::path(
    post,
    path = "/api/v1/lenders",
    tag = "loans",
    request_body = CreateLenderRequest,
    responses(
        (status = 201, description = "Lender created successfully", body = ApiResponse<LenderDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "Lender name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_lender(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateLenderRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<LenderDto>>), HandlerError> {
    trace!("Entering create_lender function");

    let lender = loans::create_lender(&state.db, request)
        .await
        .map_err(error_response)?;
    info!("Lender created successfully with ID: {}", lender.id);
    state.cache.invalidate_all();
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(lender, "Lender created successfully")),
    ))
}

/// List lenders
#[utoipa::path(
    get,
    path = "/api/v1/lenders",
    tag = "loans",
    responses(
        (status = 200, description = "Lenders retrieved successfully", body = ApiResponse<Vec<LenderDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_lenders(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<LenderDto>>>), HandlerError> {
    trace!("Entering get_lenders function");

    let lenders = loans::list_lenders(&state.db).await.map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(lenders, "Lenders retrieved successfully")),
    ))
}

/// Get a lender by ID
#[utoipa::path(
    get,
    path = "/api/v1/lenders/{lender_id}",
    tag = "loans",
    params(("lender_id" = i32, Path, description = "Lender ID")),
    responses(
        (status = 200, description = "Lender retrieved successfully", body = ApiResponse<LenderDto>),
        (status = 404, description = "Lender not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_lender(
    Path(lender_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<LenderDto>>), HandlerError> {
    trace!("Entering get_lender function");

    let lender = loans::get_lender(&state.db, lender_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(lender, "Lender retrieved successfully")),
    ))
}

/// Update a lender
#[utoipa::path(
    put,
    path = "/api/v1/lenders/{lender_id}",
    tag = "loans",
    params(("lender_id" = i32, Path, description = "Lender ID")),
    request_body = UpdateLenderRequest,
    responses(
        (status = 200, description = "Lender updated successfully", body = ApiResponse<LenderDto>),
        (status = 404, description = "Lender not found", body = ErrorResponse),
        (status = 409, description = "Lender name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_lender(
    Path(lender_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateLenderRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<LenderDto>>), HandlerError> {
    trace!("Entering update_lender function");

    let lender = loans::update_lender(&state.db, lender_id, request)
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(lender, "Lender updated successfully")),
    ))
}

/// Delete a lender no loan refers to
#[utoipa::path(
    delete,
    path = "/api/v1/lenders/{lender_id}",
    tag = "loans",
    params(("lender_id" = i32, Path, description = "Lender ID")),
    responses(
        (status = 200, description = "Lender deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Lender not found", body = ErrorResponse),
        (status = 409, description = "Lender still referenced", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_lender(
    Path(lender_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), HandlerError> {
    trace!("Entering delete_lender function");

    loans::delete_lender(&state.db, lender_id)
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("Lender {} deleted", lender_id),
            "Lender deleted successfully",
        )),
    ))
}

// ===================== Loans =====================

/// Register a loan and generate its payment schedule
#[utoipa::path(
    post,
    path = "/api/v1/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created successfully", body = ApiResponse<LoanWithScheduleDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Lender not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_loan(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateLoanRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<LoanWithScheduleDto>>), HandlerError> {
    trace!("Entering create_loan function");
    debug!(
        "Creating {:?} loan '{}' of {} over {} months",
        request.loan_type, request.name, request.principal, request.term_months
    );

    match loans::create_loan(&state.db, request, today()).await {
        Ok(created) => {
            info!(
                "Loan created successfully with ID: {} and {} payments",
                created.loan.id,
                created.payments.len()
            );
            state.cache.invalidate_all();
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(created, "Loan created successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// List loans
#[utoipa::path(
    get,
    path = "/api/v1/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans retrieved successfully", body = ApiResponse<Vec<LoanDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_loans(
    Valid(Query(query)): Valid<Query<LoanQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<LoanDto>>>), HandlerError> {
    trace!("Entering get_loans function");

    let loans = loans::list_loans(&state.db, query).await.map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(loans, "Loans retrieved successfully")),
    ))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/api/v1/loans/{loan_id}",
    tag = "loans",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan retrieved successfully", body = ApiResponse<LoanDto>),
        (status = 404, description = "Loan not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_loan(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<LoanDto>>), HandlerError> {
    trace!("Entering get_loan function");

    let loan = loans::get_loan(&state.db, loan_id)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(loan, "Loan retrieved successfully"))))
}

/// Delete a loan with its schedule and transfers
#[utoipa::path(
    delete,
    path = "/api/v1/loans/{loan_id}",
    tag = "loans",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Loan not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_loan(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), HandlerError> {
    trace!("Entering delete_loan function");

    match loans::delete_loan(&state.db, loan_id).await {
        Ok(()) => {
            info!("Loan {} deleted", loan_id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(
                    format!("Loan {} deleted", loan_id),
                    "Loan deleted successfully",
                )),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// List every payment of a loan
#[utoipa::path(
    get,
    path = "/api/v1/loans/{loan_id}/payments",
    tag = "loans",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Payments retrieved successfully", body = ApiResponse<Vec<LoanPaymentDto>>),
        (status = 404, description = "Loan not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_loan_payments(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<LoanPaymentDto>>>), HandlerError> {
    trace!("Entering get_loan_payments function");

    let payments = loans::list_payments(&state.db, loan_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(payments, "Payments retrieved successfully")),
    ))
}

/// Paid, remaining and next-due figures of a loan
#[utoipa::path(
    get,
    path = "/api/v1/loans/{loan_id}/summary",
    tag = "loans",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Summary computed successfully", body = ApiResponse<LoanSummaryDto>),
        (status = 404, description = "Loan not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_loan_summary(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<LoanSummaryDto>>), HandlerError> {
    trace!("Entering get_loan_summary function");

    let summary = loans::loan_summary(&state.db, loan_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(summary, "Summary computed successfully")),
    ))
}

/// Pay an open installment
#[utoipa::path(
    post,
    path = "/api/v1/loan-payments/{payment_id}/execute",
    tag = "loans",
    params(("payment_id" = i32, Path, description = "Loan payment ID")),
    request_body = ExecutePaymentRequest,
    responses(
        (status = 200, description = "Payment executed", body = ApiResponse<LoanPaymentDto>),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 409, description = "Payment is not open", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn execute_loan_payment(
    Path(payment_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ExecutePaymentRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<LoanPaymentDto>>), HandlerError> {
    trace!("Entering execute_loan_payment function");

    match loans::execute_payment(&state.db, payment_id, request, today()).await {
        Ok(payment) => {
            info!("Loan payment {} executed as {:?}", payment.id, payment.status);
            state.cache.invalidate_all();
            Ok((StatusCode::OK, Json(ApiResponse::ok(payment, "Payment executed"))))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Flag open payments past their date as overdue
#[utoipa::path(
    post,
    path = "/api/v1/loans/refresh",
    tag = "loans",
    responses(
        (status = 200, description = "Statuses refreshed", body = ApiResponse<RefreshResultDto>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn refresh_overdue(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<RefreshResultDto>>), HandlerError> {
    trace!("Entering refresh_overdue function");

    let result = loans::refresh_overdue(&state.db, today())
        .await
        .map_err(error_response)?;
    if result.updated > 0 {
        state.cache.invalidate_all();
    }
    Ok((StatusCode::OK, Json(ApiResponse::ok(result, "Statuses refreshed"))))
}

/// Repay part or all of a loan ahead of schedule
#[utoipa::path(
    post,
    path = "/api/v1/loans/{loan_id}/early-repayment",
    tag = "loans",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    request_body = EarlyRepaymentRequest,
    responses(
        (status = 200, description = "Early repayment applied", body = ApiResponse<EarlyRepaymentResultDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Loan not found", body = ErrorResponse),
        (status = 409, description = "Loan is paid off or has overdue payments", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn early_repayment(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<EarlyRepaymentRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<EarlyRepaymentResultDto>>), HandlerError> {
    trace!("Entering early_repayment function");
    debug!("Early repayment of {} on loan {} ({:?})", request.amount, loan_id, request.mode);

    match loans::early_repayment(&state.db, loan_id, request, today()).await {
        Ok(result) => {
            info!(
                "Early repayment applied to loan {}, balance now {}",
                loan_id, result.loan.remaining_balance
            );
            state.cache.invalidate_all();
            Ok((StatusCode::OK, Json(ApiResponse::ok(result, "Early repayment applied"))))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Compute an amortization table without storing a loan
#[utoipa::path(
    post,
    path = "/api/v1/loans/schedule-preview",
    tag = "loans",
    request_body = SchedulePreviewRequest,
    responses(
        (status = 200, description = "Schedule computed", body = ApiResponse<Vec<ScheduledPaymentDto>>),
        (status = 400, description = "Invalid loan terms", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn preview_schedule(
    Valid(Json(request)): Valid<Json<SchedulePreviewRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ScheduledPaymentDto>>>), HandlerError> {
    trace!("Entering preview_schedule function");

    let schedule = loans::preview_schedule(&request).map_err(error_response)?;
    Ok((StatusCode::OK, Json(ApiResponse::ok(schedule, "Schedule computed"))))
}
