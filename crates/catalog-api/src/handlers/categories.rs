// ============================================================================
// Catalog API - Category Handlers
// File: crates/catalog-api/src/handlers/categories.rs
// ============================================================================
//! Category HTTP handlers. Categories hard-delete; products referencing a
//! deleted category degrade to uncategorized.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use catalog_core::services::CategoryFields;

use crate::dto::{CategoryCreateRequest, CategoryDto, CategoryUpdateRequest};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/categories - ordered by name
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryDto>>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(ApiResponse::success(
        categories.into_iter().map(CategoryDto::from).collect(),
    )))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryDto>>), ApiError> {
    payload.validate()?;

    let fields = CategoryFields {
        name: Some(payload.name),
        slug: payload.slug,
    };

    let category = state.categories.create(fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(category.into())),
    ))
}

/// GET /api/categories/{slug}
pub async fn retrieve(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    let category = state.categories.get(&slug).await?;
    Ok(Json(ApiResponse::success(category.into())))
}

/// PUT/PATCH /api/categories/{slug}
pub async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CategoryUpdateRequest>,
) -> Result<Json<ApiResponse<CategoryDto>>, ApiError> {
    payload.validate()?;

    let existing = state.categories.get(&slug).await?;
    let fields = CategoryFields {
        name: payload.name,
        slug: payload.slug,
    };

    let category = state.categories.update(existing, fields).await?;
    Ok(Json(ApiResponse::success(category.into())))
}

/// DELETE /api/categories/{slug} - physical removal
pub async fn destroy(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.categories.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
