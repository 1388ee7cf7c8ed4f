//! Product catalog endpoints.
//!
//! Products are only soft-deleted: sale lines keep pointing at them.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mostrador_core::{Product, ProductInput, StockAdjustment};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiResult;
use crate::routes::{clamp_limit, search_term, DEFAULT_PAGE_SIZE};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(deactivate))
        .route("/{id}/stock", post(adjust_stock))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// `GET /api/products?search=&limit=&includeInactive=`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    let Query(query) = query?;
    let search = search_term(query.search.as_deref())?;

    let products = state
        .db
        .products()
        .list(
            search.as_deref(),
            query.include_inactive,
            clamp_limit(query.limit, DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(Json(products))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(input) = body?;
    let product = state.db.products().create(&input).await?;

    info!(id = product.id, sku = %product.sku, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products/{id}`
pub async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    Ok(Json(state.db.products().get(id).await?))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    let Json(input) = body?;

    Ok(Json(state.db.products().update(id, &input).await?))
}

/// `DELETE /api/products/{id}` (soft delete)
pub async fn deactivate(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.db.products().deactivate(id).await?;

    info!(id, "Product deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/products/{id}/stock` with `{ "delta": n }`
pub async fn adjust_stock(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<StockAdjustment>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Path(id) = id?;
    let Json(adjustment) = body?;

    let product = state.db.products().adjust_stock(id, adjustment.delta).await?;

    info!(id, delta = adjustment.delta, stock = product.stock, "Stock adjusted");
    Ok(Json(product))
}
