use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{
    CreatePlannedRequest, ExecuteOccurrenceRequest, MaterializeRequest, MaterializeResultDto,
    OccurrenceDto, OccurrencePreviewDto, PlannedQuery, PlannedTransactionDto,
    UpcomingOccurrenceDto, UpdatePlannedRequest, WindowQuery,
};
use tracing::{debug, info, instrument, trace};

use super::{days_after, error_response, horizon, today, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::planned;

/// Create a planned transaction and materialize its occurrences
#[utoipa::path(
    post,
    path = "/api/v1/planned",
    tag = "planned",
    request_body = CreatePlannedRequest,
    responses(
        (status = 201, description = "Planned transaction created successfully", body = ApiResponse<PlannedTransactionDto>),
        (status = 400, description = "Invalid request or recurrence rule", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_planned(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreatePlannedRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PlannedTransactionDto>>), HandlerError> {
    trace!("Entering create_planned function");
    debug!("Creating planned transaction '{}' starting {}", request.name, request.start_date);

    match planned::create_planned(&state.db, request, horizon(&state)).await {
        Ok(plan) => {
            info!("Planned transaction created successfully with ID: {}", plan.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(plan, "Planned transaction created successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// List planned transactions
#[utoipa::path(
    get,
    path = "/api/v1/planned",
    tag = "planned",
    params(PlannedQuery),
    responses(
        (status = 200, description = "Planned transactions retrieved successfully", body = ApiResponse<Vec<PlannedTransactionDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_planned_list(
    Valid(Query(query)): Valid<Query<PlannedQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<PlannedTransactionDto>>>), HandlerError> {
    trace!("Entering get_planned_list function");

    let plans = planned::list_planned(&state.db, query)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(plans, "Planned transactions retrieved successfully")),
    ))
}

/// Get a planned transaction with its recurrence rule
#[utoipa::path(
    get,
    path = "/api/v1/planned/{plan_id}",
    tag = "planned",
    params(("plan_id" = i32, Path, description = "Planned transaction ID")),
    responses(
        (status = 200, description = "Planned transaction retrieved successfully", body = ApiResponse<PlannedTransactionDto>),
        (status = 404, description = "Planned transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_planned(
    Path(plan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<PlannedTransactionDto>>), HandlerError> {
    trace!("Entering get_planned function");

    let plan = planned::get_planned(&state.db, plan_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(plan, "Planned transaction retrieved successfully")),
    ))
}

/// Update a planned transaction; future pending occurrences are regenerated
#[utoipa::path(
    put,
    path = "/api/v1/planned/{plan_id}",
    tag = "planned",
    params(("plan_id" = i32, Path, description = "Planned transaction ID")),
    request_body = UpdatePlannedRequest,
    responses(
        (status = 200, description = "Planned transaction updated successfully", body = ApiResponse<PlannedTransactionDto>),
        (status = 400, description = "Invalid request or recurrence rule", body = ErrorResponse),
        (status = 404, description = "Planned transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_planned(
    Path(plan_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdatePlannedRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<PlannedTransactionDto>>), HandlerError> {
    trace!("Entering update_planned function");

    match planned::update_planned(&state.db, plan_id, request, today(), horizon(&state)).await {
        Ok(plan) => {
            info!("Planned transaction {} updated", plan.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(plan, "Planned transaction updated successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Delete a planned transaction with its rule and occurrences
#[utoipa::path(
    delete,
    path = "/api/v1/planned/{plan_id}",
    tag = "planned",
    params(("plan_id" = i32, Path, description = "Planned transaction ID")),
    responses(
        (status = 200, description = "Planned transaction deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Planned transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_planned(
    Path(plan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), HandlerError> {
    trace!("Entering delete_planned function");

    planned::delete_planned(&state.db, plan_id)
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("Planned transaction {} deleted", plan_id),
            "Planned transaction deleted successfully",
        )),
    ))
}

/// Deactivate a planned transaction, dropping its future pending occurrences
#[utoipa::path(
    post,
    path = "/api/v1/planned/{plan_id}/deactivate",
    tag = "planned",
    params(("plan_id" = i32, Path, description = "Planned transaction ID")),
    responses(
        (status = 200, description = "Planned transaction deactivated", body = ApiResponse<PlannedTransactionDto>),
        (status = 404, description = "Planned transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn deactivate_planned(
    Path(plan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<PlannedTransactionDto>>), HandlerError> {
    trace!("Entering deactivate_planned function");

    let plan = planned::deactivate_planned(&state.db, plan_id, today())
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(plan, "Planned transaction deactivated")),
    ))
}

/// Compute occurrences in a window without storing them
#[utoipa::path(
    get,
    path = "/api/v1/planned/{plan_id}/preview",
    tag = "planned",
    params(("plan_id" = i32, Path, description = "Planned transaction ID"), WindowQuery),
    responses(
        (status = 200, description = "Occurrences computed", body = ApiResponse<Vec<OccurrencePreviewDto>>),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 404, description = "Planned transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn preview_planned(
    Path(plan_id): Path<i32>,
    Valid(Query(query)): Valid<Query<WindowQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<OccurrencePreviewDto>>>), HandlerError> {
    trace!("Entering preview_planned function");
    let from = query.from.unwrap_or_else(today);
    let to = query
        .to
        .unwrap_or_else(|| days_after(from, state.settings.horizon_days));
    debug!("Previewing plan {} from {} to {}", plan_id, from, to);

    let preview = planned::preview_planned(&state.db, plan_id, from, to)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(preview, "Occurrences computed")),
    ))
}

/// List stored occurrences of a planned transaction
#[utoipa::path(
    get,
    path = "/api/v1/planned/{plan_id}/occurrences",
    tag = "planned",
    params(("plan_id" = i32, Path, description = "Planned transaction ID")),
    responses(
        (status = 200, description = "Occurrences retrieved successfully", body = ApiResponse<Vec<OccurrenceDto>>),
        (status = 404, description = "Planned transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_plan_occurrences(
    Path(plan_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<OccurrenceDto>>>), HandlerError> {
    trace!("Entering get_plan_occurrences function");

    let occurrences = planned::list_occurrences(&state.db, plan_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(occurrences, "Occurrences retrieved successfully")),
    ))
}

/// Materialize occurrences of every active plan up to a horizon
#[utoipa::path(
    post,
    path = "/api/v1/planned/materialize",
    tag = "planned",
    request_body = MaterializeRequest,
    responses(
        (status = 200, description = "Occurrences materialized", body = ApiResponse<MaterializeResultDto>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn materialize(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<MaterializeRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<MaterializeResultDto>>), HandlerError> {
    trace!("Entering materialize function");
    let until = request.horizon.unwrap_or_else(|| horizon(&state));

    match planned::materialize_all(&state.db, until).await {
        Ok(result) => {
            info!("Materialized {} occurrences up to {}", result.created, result.horizon);
            state.cache.invalidate_all();
            Ok((StatusCode::OK, Json(ApiResponse::ok(result, "Occurrences materialized"))))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Pending occurrences of active plans in a window
#[utoipa::path(
    get,
    path = "/api/v1/occurrences/upcoming",
    tag = "planned",
    params(WindowQuery),
    responses(
        (status = 200, description = "Upcoming occurrences retrieved successfully", body = ApiResponse<Vec<UpcomingOccurrenceDto>>),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_upcoming(
    Valid(Query(query)): Valid<Query<WindowQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<UpcomingOccurrenceDto>>>), HandlerError> {
    trace!("Entering get_upcoming function");
    let from = query.from.unwrap_or_else(today);
    let to = query
        .to
        .unwrap_or_else(|| days_after(from, state.settings.overview_days));

    let upcoming = planned::upcoming(&state.db, from, to)
        .await
        .map_err(error_response)?;
    debug!("Found {} upcoming occurrences", upcoming.len());
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(upcoming, "Upcoming occurrences retrieved successfully")),
    ))
}

/// Record a pending occurrence as a transaction
#[utoipa::path(
    post,
    path = "/api/v1/occurrences/{occurrence_id}/execute",
    tag = "planned",
    params(("occurrence_id" = i32, Path, description = "Occurrence ID")),
    request_body = ExecuteOccurrenceRequest,
    responses(
        (status = 200, description = "Occurrence executed", body = ApiResponse<OccurrenceDto>),
        (status = 404, description = "Occurrence not found", body = ErrorResponse),
        (status = 409, description = "Occurrence is not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn execute_occurrence(
    Path(occurrence_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<ExecuteOccurrenceRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<OccurrenceDto>>), HandlerError> {
    trace!("Entering execute_occurrence function");

    match planned::execute_occurrence(&state.db, occurrence_id, request).await {
        Ok(occurrence) => {
            info!("Occurrence {} executed", occurrence.id);
            state.cache.invalidate_all();
            Ok((StatusCode::OK, Json(ApiResponse::ok(occurrence, "Occurrence executed"))))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Skip a pending occurrence
#[utoipa::path(
    post,
    path = "/api/v1/occurrences/{occurrence_id}/skip",
    tag = "planned",
    params(("occurrence_id" = i32, Path, description = "Occurrence ID")),
    responses(
        (status = 200, description = "Occurrence skipped", body = ApiResponse<OccurrenceDto>),
        (status = 404, description = "Occurrence not found", body = ErrorResponse),
        (status = 409, description = "Occurrence is not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn skip_occurrence(
    Path(occurrence_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<OccurrenceDto>>), HandlerError> {
    trace!("Entering skip_occurrence function");

    let occurrence = planned::skip_occurrence(&state.db, occurrence_id)
        .await
        .map_err(error_response)?;
    state.cache.invalidate_all();
    Ok((StatusCode::OK, Json(ApiResponse::ok(occurrence, "Occurrence skipped"))))
}
