//! Read-only report endpoints.
//!
//! Dates are store-local business dates (`YYYY-MM-DD`). Omitted defaults
//! come from the `[reports]` config section and the store's clock.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use mostrador_core::{DailyCut, ExpiringItem, LowStockItem, ProviderRevenue, TopSeller, MAX_PAGE_SIZE};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::routes::clamp_limit;
use crate::state::AppState;

/// Longest look-ahead accepted by the expiring report.
const MAX_EXPIRING_DAYS: u32 = 3650;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(low_stock))
        .route("/expiring", get(expiring))
        .route("/daily-cut", get(daily_cut))
        .route("/top-sellers", get(top_sellers))
        .route("/revenue-by-provider", get(revenue_by_provider))
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

impl RangeQuery {
    fn check_order(&self) -> ApiResult<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(ApiError::validation(format!(
                "from ({}) is after to ({})",
                from, to
            ))),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/reports/low-stock?threshold=`
///
/// Without a threshold each product is compared to its own `minStock`.
pub async fn low_stock(
    State(state): State<AppState>,
    query: Result<Query<LowStockQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<LowStockItem>>> {
    let Query(query) = query?;

    if query.threshold.is_some_and(|t| t < 0) {
        return Err(ApiError::validation("threshold must not be negative"));
    }

    Ok(Json(state.db.reports().low_stock(query.threshold).await?))
}

/// `GET /api/reports/expiring?days=`
pub async fn expiring(
    State(state): State<AppState>,
    query: Result<Query<ExpiringQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ExpiringItem>>> {
    let Query(query) = query?;
    let days = query
        .days
        .unwrap_or(state.config.reports.expiring_within_days)
        .min(MAX_EXPIRING_DAYS);

    Ok(Json(state.db.reports().expiring(state.today(), days).await?))
}

/// `GET /api/reports/daily-cut?date=`, today when omitted.
pub async fn daily_cut(
    State(state): State<AppState>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<Json<DailyCut>> {
    let Query(query) = query?;
    let date = query.date.unwrap_or_else(|| state.today());

    Ok(Json(state.db.reports().daily_cut(date).await?))
}

/// `GET /api/reports/top-sellers?from=&to=&limit=`
pub async fn top_sellers(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TopSeller>>> {
    let Query(query) = query?;
    query.check_order()?;

    let limit = clamp_limit(
        query.limit,
        state.config.reports.top_sellers_limit.min(MAX_PAGE_SIZE),
    );

    Ok(Json(
        state
            .db
            .reports()
            .top_sellers(query.from, query.to, limit)
            .await?,
    ))
}

/// `GET /api/reports/revenue-by-provider?from=&to=`
pub async fn revenue_by_provider(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ProviderRevenue>>> {
    let Query(query) = query?;
    query.check_order()?;

    Ok(Json(
        state
            .db
            .reports()
            .revenue_by_provider(query.from, query.to)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use mostrador_core::{LineItemRequest, PriceSource, ProductInput, SaleDraft, SaleRequest, TaxRate};

    async fn stocked(state: &AppState, sku: &str, stock: i64, min_stock: i64) -> i64 {
        state
            .db
            .products()
            .create(&ProductInput {
                sku: sku.to_string(),
                name: format!("Producto {sku}"),
                description: None,
                provider_id: None,
                price_cents: 1000,
                cost_cents: None,
                stock,
                min_stock,
                expiration_date: None,
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    async fn sell(state: &AppState, method: &str, product_id: i64, quantity: i64) {
        let request = SaleRequest {
            client_id: None,
            payment_method: Some(method.to_string()),
            line_items: vec![LineItemRequest {
                product_id,
                quantity,
                unit_price_cents: 1000,
            }],
        };
        let draft = SaleDraft::from_request(request, TaxRate::default()).unwrap();
        state
            .db
            .sales()
            .register(&draft, PriceSource::Request, state.today())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_low_stock_rejects_negative_threshold() {
        let state = test_state().await;
        stocked(&state, "A", 2, 5).await;
        stocked(&state, "B", 20, 5).await;

        let Json(rows) = low_stock(State(state.clone()), Ok(Query(LowStockQuery::default())))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let err = low_stock(State(state), Ok(Query(LowStockQuery { threshold: Some(-1) })))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_cut_defaults_to_today() {
        let state = test_state().await;
        let id = stocked(&state, "A", 50, 0).await;
        sell(&state, "cash", id, 2).await;
        sell(&state, "card", id, 1).await;

        let Json(cut) = daily_cut(State(state.clone()), Ok(Query(DateQuery::default())))
            .await
            .unwrap();

        assert_eq!(cut.date, state.today());
        assert_eq!(cut.sales_count, 2);
        assert_eq!(cut.subtotal_cents, 3000);
        assert_eq!(cut.tax_cents, 480);
        assert_eq!(
            cut.total_cents,
            cut.by_method.iter().map(|l| l.total_cents).sum::<i64>()
        );
    }

    #[tokio::test]
    async fn test_top_sellers_uses_configured_limit_and_rejects_inverted_range() {
        let state = test_state().await;
        for (n, sku) in ["A", "B", "C"].iter().enumerate() {
            let id = stocked(&state, sku, 50, 0).await;
            sell(&state, "cash", id, n as i64 + 1).await;
        }

        let Json(rows) = top_sellers(State(state.clone()), Ok(Query(RangeQuery::default())))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].sku, "C");

        let limited = RangeQuery {
            limit: Some(1),
            ..Default::default()
        };
        let Json(rows) = top_sellers(State(state.clone()), Ok(Query(limited))).await.unwrap();
        assert_eq!(rows.len(), 1);

        let inverted = RangeQuery {
            from: NaiveDate::from_ymd_opt(2026, 10, 20),
            to: NaiveDate::from_ymd_opt(2026, 10, 1),
            limit: None,
        };
        let err = revenue_by_provider(State(state), Ok(Query(inverted)))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_expiring_uses_store_today() {
        let state = test_state().await;
        let soon = state.today().checked_add_days(chrono::Days::new(3)).unwrap();
        state
            .db
            .products()
            .create(&ProductInput {
                sku: "YOG-1".to_string(),
                name: "Yoghurt Natural 1kg".to_string(),
                description: None,
                provider_id: None,
                price_cents: 4400,
                cost_cents: None,
                stock: 6,
                min_stock: 0,
                expiration_date: Some(soon),
                is_active: true,
            })
            .await
            .unwrap();

        let Json(rows) = expiring(State(state.clone()), Ok(Query(ExpiringQuery::default())))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].days_remaining, 3);

        let Json(rows) = expiring(State(state), Ok(Query(ExpiringQuery { days: Some(1) })))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
