// src/handlers/product.rs
use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use http::header::LOCATION;
use tracing::{error, instrument};

use crate::dtos::product::ProductDto;
use crate::error::AppError;
use crate::extract::{Pageable, PathParam, ValidJson};
use crate::pagination::PageResponse;
use crate::state::AppState;

// GET /products - One page of products
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Pageable(request): Pageable,
) -> Result<Json<PageResponse<ProductDto>>, AppError> {
    match state.products.find_all(&request).await {
        Ok(page) => Ok(Json(PageResponse::from(page))),
        Err(e) => {
            error!(?e, "Failed to fetch products");
            Err(e)
        }
    }
}

// GET /products/{id} - Get single product
#[instrument(skip(state))]
pub async fn get_product(
    PathParam(id): PathParam<i64>,
    State(state): State<AppState>,
) -> Result<Json<ProductDto>, AppError> {
    let product = state.products.find_by_id(id).await?;
    Ok(Json(product))
}

// POST /products - Create new product
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ValidJson(payload): ValidJson<ProductDto>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.products.insert(payload).await?;

    let id = product
        .id
        .ok_or_else(|| AppError::internal("Store did not assign an id"))?;
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(product)))
}

// PUT /products/{id} - Overwrite product
#[instrument(skip(state, payload))]
pub async fn update_product(
    PathParam(id): PathParam<i64>,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ProductDto>,
) -> Result<Json<ProductDto>, AppError> {
    let product = state.products.update(id, payload).await?;
    Ok(Json(product))
}

// DELETE /products/{id} - Delete product
#[instrument(skip(state))]
pub async fn delete_product(
    PathParam(id): PathParam<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
