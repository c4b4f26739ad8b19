//! HTTP handlers. Each one maps a request onto a service call and the
//! service outcome onto an `ApiResponse` or an `ErrorResponse`.

pub mod categories;
pub mod health;
pub mod loans;
pub mod overview;
pub mod pending;
pub mod planned;
pub mod transactions;
pub mod transfers;

use axum::{http::StatusCode, response::Json};
use chrono::{Days, Local, NaiveDate};
use tracing::{error, warn};

use crate::schemas::{AppState, ErrorResponse};
use crate::services::ServiceError;

pub(crate) type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Maps a service error onto its status code and error body.
pub(crate) fn error_response(err: ServiceError) -> HandlerError {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected ({}): {}", status, err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().to_string(),
            success: false,
        }),
    )
}

/// The local calendar date requests are evaluated against.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn days_after(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Last date occurrences are materialized to.
pub(crate) fn horizon(state: &AppState) -> NaiveDate {
    days_after(today(), state.settings.horizon_days)
}
