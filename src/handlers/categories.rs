use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CategoryDto, CategoryQuery, CreateCategoryRequest, UpdateCategoryRequest};
use tracing::{debug, info, instrument, trace};

use super::{error_response, HandlerError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::services::categories;

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "Category name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_category(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCategoryRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), HandlerError> {
    trace!("Entering create_category function");
    debug!("Creating category with name: {}", request.name);

    match categories::create_category(&state.db, request).await {
        Ok(category) => {
            info!("Category created successfully with ID: {}", category.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(category, "Category created successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Get all categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryDto>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_categories(
    Valid(Query(query)): Valid<Query<CategoryQuery>>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<CategoryDto>>>), HandlerError> {
    trace!("Entering get_categories function");

    let categories = categories::list_categories(&state.db, query)
        .await
        .map_err(error_response)?;
    debug!("Returning {} categories", categories.len());
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(categories, "Categories retrieved successfully")),
    ))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category retrieved successfully", body = ApiResponse<CategoryDto>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), HandlerError> {
    trace!("Entering get_category function");

    let category = categories::get_category(&state.db, category_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(category, "Category retrieved successfully")),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(("category_id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryDto>),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category name already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateCategoryRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), HandlerError> {
    trace!("Entering update_category function");
    debug!("Updating category {}", category_id);

    match categories::update_category(&state.db, category_id, request).await {
        Ok(category) => {
            info!("Category {} updated", category.id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(category, "Category updated successfully")),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category still in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), HandlerError> {
    trace!("Entering delete_category function");

    match categories::delete_category(&state.db, category_id).await {
        Ok(()) => {
            info!("Category {} deleted", category_id);
            state.cache.invalidate_all();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(
                    format!("Category {} deleted", category_id),
                    "Category deleted successfully",
                )),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}
