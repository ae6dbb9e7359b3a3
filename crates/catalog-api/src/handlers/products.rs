// ============================================================================
// Catalog API - Product Handlers
// File: crates/catalog-api/src/handlers/products.rs
// ============================================================================
//! Product HTTP handlers: listing, CRUD, soft delete, image upload.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use catalog_core::error::DomainError;
use catalog_core::repositories::{BlobStore, ProductFilter, ProductOrder};
use catalog_core::services::ProductFields;

use crate::dto::{ProductCreateRequest, ProductDto, ProductListQuery, ProductUpdateRequest};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Resolve an optional category slug to its id; an unknown slug is a
/// field-level validation error, not a 404.
async fn resolve_category(
    state: &AppState,
    slug: Option<&str>,
) -> Result<Option<uuid::Uuid>, ApiError> {
    match slug {
        None => Ok(None),
        Some(slug) => match state.categories.get(slug).await {
            Ok(category) => Ok(Some(category.id)),
            Err(DomainError::CategoryNotFound) => Err(ApiError::field(
                "category",
                &format!("category '{}' does not exist", slug),
            )),
            Err(e) => Err(e.into()),
        },
    }
}

fn parse_ordering(ordering: Option<&str>) -> Result<ProductOrder, ApiError> {
    match ordering {
        None | Some("-created_at") => Ok(ProductOrder::CreatedAtDesc),
        Some("created_at") => Ok(ProductOrder::CreatedAtAsc),
        Some("price") => Ok(ProductOrder::PriceAsc),
        Some("-price") => Ok(ProductOrder::PriceDesc),
        Some(other) => Err(ApiError::field(
            "ordering",
            &format!("unsupported ordering '{}'", other),
        )),
    }
}

/// GET /api/products - active products only, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductDto>>>, ApiError> {
    let category_id = resolve_category(&state, query.category.as_deref()).await?;

    let filter = ProductFilter {
        category_id,
        search: query.search,
        order: parse_ordering(query.ordering.as_deref())?,
        include_inactive: false,
        page: query.page,
        page_size: query.page_size,
    };

    let products = state.products.list(&filter).await?;
    Ok(Json(ApiResponse::success(
        products.into_iter().map(ProductDto::from).collect(),
    )))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDto>>), ApiError> {
    payload.validate()?;

    let category_id = resolve_category(&state, payload.category.as_deref()).await?;

    let fields = ProductFields {
        name: Some(payload.name),
        slug: payload.slug,
        description: payload.description,
        price: Some(payload.price),
        stock: Some(payload.stock),
        category_id: category_id.map(Some),
        image: payload.image,
    };

    let product = state.products.create(fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(product.into())),
    ))
}

/// GET /api/products/{slug}
pub async fn retrieve(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let product = state.products.get(&slug).await?;
    Ok(Json(ApiResponse::success(product.into())))
}

/// PUT/PATCH /api/products/{slug}
pub async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<ProductUpdateRequest>,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    payload.validate()?;

    let existing = state.products.get(&slug).await?;

    // Absent keeps the category, null clears it, a slug reassigns it.
    let category_id = match &payload.category {
        None => None,
        Some(None) => Some(None),
        Some(Some(category_slug)) => {
            Some(resolve_category(&state, Some(category_slug.as_str())).await?)
        }
    };

    let fields = ProductFields {
        name: payload.name,
        slug: payload.slug,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        category_id,
        image: None,
    };

    let product = state.products.update(existing, fields).await?;
    Ok(Json(ApiResponse::success(product.into())))
}

/// DELETE /api/products/{slug} - soft delete, idempotent
pub async fn destroy(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.products.delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{slug}/image - multipart upload
pub async fn upload_image(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProductDto>>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read field: {}", e)))?
    {
        if field.name() == Some("image") {
            filename = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read file: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::field("image", "image file is required"))?;
    let filename = filename.ok_or_else(|| ApiError::field("image", "filename is required"))?;

    // Basename only; blob references never carry client-supplied paths.
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or("image").to_string();

    info!("Image upload for product {}: {}", slug, basename);

    let image_ref = state
        .blobs
        .write(&format!("products/{}", basename), &file_data)
        .await?;

    let product = state.products.attach_image(&slug, image_ref).await?;
    Ok(Json(ApiResponse::success(product.into())))
}
