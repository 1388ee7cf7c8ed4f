//! # Sale Endpoints
//!
//! ```text
//! POST /api/sales
//!      │
//!      ▼
//! SaleDraft::from_request ── invalid ──► 400 (nothing touched the database)
//!      │
//!      ▼
//! tokio::spawn(SaleRepository::register)
//!      │        │
//!      │        └── client hangs up: the task still commits or rolls back
//!      ▼
//! 201 { saleId, message, subtotal, tax, total }
//!     or 409 (stock/catalog rejection) / 503 / 500, nothing written
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use mostrador_core::{Sale, SaleDetail, SaleDraft, SaleReceipt, SaleRequest};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::routes::{clamp_limit, DEFAULT_PAGE_SIZE};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/{id}", get(fetch))
}

/// Body of a 201 from `POST /api/sales`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreated {
    pub message: String,
    #[serde(flatten)]
    pub receipt: SaleReceipt,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleQuery {
    /// Business date, `YYYY-MM-DD`
    pub date: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// `POST /api/sales`
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<SaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleCreated>)> {
    let Json(request) = body?;
    let draft = SaleDraft::from_request(request, state.config.tax_rate())?;

    let today = state.today();
    let price_source = state.config.sales.price_source;
    let db = state.db.clone();

    let receipt = tokio::spawn(async move { db.sales().register(&draft, price_source, today).await })
        .await
        .map_err(|e| {
            error!(error = %e, "Sale registration task failed");
            ApiError::internal("Sale registration failed")
        })??;

    Ok((
        StatusCode::CREATED,
        Json(SaleCreated {
            message: format!("Sale {} registered", receipt.sale_id),
            receipt,
        }),
    ))
}

/// `GET /api/sales?date=&limit=`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<SaleQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Sale>>> {
    let Query(query) = query?;

    Ok(Json(
        state
            .db
            .sales()
            .list(query.date, clamp_limit(query.limit, DEFAULT_PAGE_SIZE))
            .await?,
    ))
}

/// `GET /api/sales/{id}`
pub async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<SaleDetail>> {
    let Path(id) = id?;
    Ok(Json(state.db.sales().get(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ErrorCode;
    use crate::routes::test_support::{state_with, test_state};
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};
    use axum::response::IntoResponse;
    use mostrador_core::{LineItemRequest, PriceSource, Product, ProductInput};

    async fn product(state: &AppState, sku: &str, price_cents: i64, stock: i64) -> Product {
        state
            .db
            .products()
            .create(&ProductInput {
                sku: sku.to_string(),
                name: format!("Producto {sku}"),
                description: None,
                provider_id: None,
                price_cents,
                cost_cents: None,
                stock,
                min_stock: 0,
                expiration_date: None,
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn request(method: &str, items: &[(i64, i64, i64)]) -> SaleRequest {
        SaleRequest {
            client_id: None,
            payment_method: Some(method.to_string()),
            line_items: items
                .iter()
                .map(|&(product_id, quantity, unit_price_cents)| LineItemRequest {
                    product_id,
                    quantity,
                    unit_price_cents,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_created_with_totals() {
        let state = test_state().await;
        let a = product(&state, "A", 1000, 5).await;
        let b = product(&state, "B", 500, 5).await;

        let response = register(
            State(state.clone()),
            Ok(Json(request("cash", &[(a.id, 2, 1000), (b.id, 1, 500)]))),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let (_, Json(created)) = register(State(state.clone()), Ok(Json(request("card", &[(a.id, 1, 1000)]))))
            .await
            .unwrap();
        let body = serde_json::to_value(&created).unwrap();
        assert!(body["saleId"].as_i64().unwrap() > 0);
        assert_eq!(body["subtotal"], 10.0);
        assert_eq!(body["tax"], 1.6);
        assert_eq!(body["total"], 11.6);
        assert!(body["message"].as_str().unwrap().contains("registered"));

        assert_eq!(state.db.products().get(a.id).await.unwrap().stock, 2);
        assert_eq!(state.db.products().get(b.id).await.unwrap().stock, 4);
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_conflict_and_writes_nothing() {
        let state = test_state().await;
        let a = product(&state, "A", 1000, 5).await;
        let b = product(&state, "B", 500, 1).await;

        let err = register(
            State(state.clone()),
            Ok(Json(request("cash", &[(a.id, 2, 1000), (b.id, 3, 500)]))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(state.db.products().get(a.id).await.unwrap().stock, 5);

        let Json(sales) = list(State(state), Ok(Query(SaleQuery::default()))).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_requests_are_bad_request() {
        let state = test_state().await;
        let a = product(&state, "A", 1000, 5).await;

        for bad in [
            request("cash", &[]),
            request("bitcoin", &[(a.id, 1, 1000)]),
            request("cash", &[(a.id, 0, 1000)]),
            request("cash", &[(a.id, 1, -1)]),
            SaleRequest {
                payment_method: None,
                ..request("cash", &[(a.id, 1, 1000)])
            },
        ] {
            let err = register(State(state.clone()), Ok(Json(bad))).await.unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }

        assert_eq!(state.db.products().get(a.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let state = test_state().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/sales")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"lineItems\": ["))
            .unwrap();

        let rejection = Json::<SaleRequest>::from_request(req, &()).await.unwrap_err();
        let err = register(State(state), Err(rejection)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_product_and_client_are_conflicts() {
        let state = test_state().await;
        let a = product(&state, "A", 1000, 5).await;

        let err = register(State(state.clone()), Ok(Json(request("cash", &[(999, 1, 1000)]))))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let mut with_client = request("cash", &[(a.id, 1, 1000)]);
        with_client.client_id = Some(4242);
        let err = register(State(state.clone()), Ok(Json(with_client))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        assert_eq!(state.db.products().get(a.id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_catalog_pricing_ignores_request_price() {
        let mut config = AppConfig::default();
        config.sales.price_source = PriceSource::Catalog;
        let state = state_with(config).await;
        let a = product(&state, "A", 8900, 5).await;

        let (_, Json(created)) = register(State(state.clone()), Ok(Json(request("transfer", &[(a.id, 2, 1)]))))
            .await
            .unwrap();

        assert_eq!(created.receipt.subtotal_cents, 17800);
        assert_eq!(created.receipt.total_cents, 20648);

        let Json(detail) = fetch(State(state), Ok(Path(created.receipt.sale_id))).await.unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].unit_price_cents, 8900);
    }

    #[tokio::test]
    async fn test_list_filters_by_business_date() {
        let state = test_state().await;
        let a = product(&state, "A", 1000, 5).await;
        register(State(state.clone()), Ok(Json(request("cash", &[(a.id, 1, 1000)]))))
            .await
            .unwrap();

        let today = SaleQuery {
            date: Some(state.today()),
            limit: None,
        };
        let Json(found) = list(State(state.clone()), Ok(Query(today))).await.unwrap();
        assert_eq!(found.len(), 1);

        let other_day = SaleQuery {
            date: NaiveDate::from_ymd_opt(2001, 1, 1),
            limit: None,
        };
        let Json(none) = list(State(state), Ok(Query(other_day))).await.unwrap();
        assert!(none.is_empty());
    }
}
