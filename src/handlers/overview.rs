use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{OverviewDto, OverviewQuery};
use tracing::{debug, instrument, trace};

use super::{error_response, today, HandlerError};
use crate::schemas::{overview_cache_key, ApiResponse, AppState, CachedData, ErrorResponse};
use crate::services::overview;

/// Dashboard snapshot for today
///
/// Results are cached until the next mutating request.
#[utoipa::path(
    get,
    path = "/api/v1/overview",
    tag = "overview",
    params(OverviewQuery),
    responses(
        (status = 200, description = "Overview computed", body = ApiResponse<OverviewDto>),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_overview(
    Valid(Query(query)): Valid<Query<OverviewQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<OverviewDto>>), HandlerError> {
    trace!("Entering get_overview function");
    let today = today();
    let days = query.days.unwrap_or(state.settings.overview_days);
    let cache_key = overview_cache_key(today, days);

    if let Some(CachedData::Overview(cached)) = state.cache.get(&cache_key).await {
        debug!("Returning cached overview for {}", cache_key);
        return Ok((StatusCode::OK, Json(ApiResponse::ok(cached, "Overview computed"))));
    }

    let computed = overview::overview(&state.db, today, days)
        .await
        .map_err(error_response)?;
    state
        .cache
        .insert(cache_key, CachedData::Overview(computed.clone()))
        .await;
    Ok((StatusCode::OK, Json(ApiResponse::ok(computed, "Overview computed"))))
}
