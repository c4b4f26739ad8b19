use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{DebtTransferDto, TransferLoanRequest, TransferResultDto};
use tracing::{debug, info, instrument, trace};

use super::{error_response, today, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::transfers;

/// Transfer a loan's remaining debt to another lender
#[utoipa::path(
    post,
    path = "/api/v1/loans/{loan_id}/transfer",
    tag = "transfers",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    request_body = TransferLoanRequest,
    responses(
        (status = 200, description = "Loan transferred", body = ApiResponse<TransferResultDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Loan or lender not found", body = ErrorResponse),
        (status = 409, description = "Loan cannot be transferred", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn transfer_loan(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<TransferLoanRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransferResultDto>>), HandlerError> {
    trace!("Entering transfer_loan function");
    debug!(
        "Transferring loan {} to lender {} for {}",
        loan_id, request.to_lender_id, request.transfer_amount
    );

    match transfers::transfer_loan(&state.db, loan_id, request, today()).await {
        Ok(result) => {
            info!(
                "Loan {} transferred, {} open payments now owed to lender {}",
                loan_id,
                result.payments.len(),
                result.transfer.to_lender_id
            );
            state.cache.invalidate_all();
            Ok((StatusCode::OK, Json(ApiResponse::ok(result, "Loan transferred"))))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Transfer history of a loan
#[utoipa::path(
    get,
    path = "/api/v1/loans/{loan_id}/transfers",
    tag = "transfers",
    params(("loan_id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Transfers retrieved successfully", body = ApiResponse<Vec<DebtTransferDto>>),
        (status = 404, description = "Loan not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_loan_transfers(
    Path(loan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<DebtTransferDto>>>), HandlerError> {
    trace!("Entering get_loan_transfers function");

    let history = transfers::list_transfers(&state.db, loan_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(history, "Transfers retrieved successfully")),
    ))
}
