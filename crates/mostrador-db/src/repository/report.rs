//! # Report Repository
//!
//! Read-only queries behind the dashboard reports.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report               Source tables                 Grouping            │
//! │  ───────────────────  ────────────────────────────  ─────────────────  │
//! │  low_stock            products ⟕ providers         none                │
//! │  expiring             products                      none                │
//! │  daily_cut            sales                         payment_method      │
//! │  top_sellers          sale_items ⋈ sales ⋈ products product             │
//! │  revenue_by_provider  sale_items ⋈ sales ⋈ products provider (or NULL)  │
//! │                         ⟕ providers                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Date filters apply to `sales.business_date`, never to UTC timestamps.

use chrono::{Days, NaiveDate};
use mostrador_core::{CutLine, DailyCut, ExpiringItem, LowStockItem, ProviderRevenue, TopSeller};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Active products at or below a stock threshold, lowest stock first.
    ///
    /// Without `threshold`, each product is compared to its own `min_stock`.
    pub async fn low_stock(&self, threshold: Option<i64>) -> DbResult<Vec<LowStockItem>> {
        debug!(threshold = ?threshold, "Low stock report");

        let rows = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT
                p.id AS product_id,
                p.sku,
                p.name,
                p.stock,
                p.min_stock,
                pr.name AS provider_name
            FROM products p
            LEFT JOIN providers pr ON pr.id = p.provider_id
            WHERE p.is_active = 1
              AND p.stock <= COALESCE(?1, p.min_stock)
            ORDER BY p.stock ASC, p.name
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active products expiring within `days` of `today`, expired ones included.
    pub async fn expiring(&self, today: NaiveDate, days: u32) -> DbResult<Vec<ExpiringItem>> {
        let horizon = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);

        debug!(%today, %horizon, "Expiring products report");

        let rows = sqlx::query_as::<_, ExpiringItem>(
            r#"
            SELECT
                id AS product_id,
                sku,
                name,
                stock,
                expiration_date,
                CAST(julianday(expiration_date) - julianday(?1) AS INTEGER) AS days_remaining
            FROM products
            WHERE is_active = 1
              AND expiration_date IS NOT NULL
              AND expiration_date <= ?2
            ORDER BY expiration_date, name
            "#,
        )
        .bind(today)
        .bind(horizon)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Corte de caja for one business date.
    pub async fn daily_cut(&self, date: NaiveDate) -> DbResult<DailyCut> {
        debug!(%date, "Daily cut");

        let lines = sqlx::query_as::<_, CutLine>(
            r#"
            SELECT
                payment_method,
                COUNT(*) AS sales_count,
                SUM(subtotal_cents) AS subtotal_cents,
                SUM(tax_cents) AS tax_cents,
                SUM(total_cents) AS total_cents
            FROM sales
            WHERE business_date = ?1
            GROUP BY payment_method
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(DailyCut::from_lines(date, lines))
    }

    /// Products ranked by units sold, ties broken by revenue.
    ///
    /// `from` and `to` are inclusive business dates.
    pub async fn top_sellers(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: u32,
    ) -> DbResult<Vec<TopSeller>> {
        debug!(from = ?from, to = ?to, limit, "Top sellers report");

        let rows = sqlx::query_as::<_, TopSeller>(
            r#"
            SELECT
                p.id AS product_id,
                p.sku,
                p.name,
                SUM(si.quantity) AS units_sold,
                SUM(si.line_total_cents) AS revenue_cents
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            INNER JOIN products p ON p.id = si.product_id
            WHERE (?1 IS NULL OR s.business_date >= ?1)
              AND (?2 IS NULL OR s.business_date <= ?2)
            GROUP BY p.id, p.sku, p.name
            ORDER BY units_sold DESC, revenue_cents DESC, p.name
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Units and revenue per provider; products without one share a NULL row.
    pub async fn revenue_by_provider(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<ProviderRevenue>> {
        debug!(from = ?from, to = ?to, "Revenue by provider report");

        let rows = sqlx::query_as::<_, ProviderRevenue>(
            r#"
            SELECT
                pr.id AS provider_id,
                pr.name AS provider_name,
                SUM(si.quantity) AS units_sold,
                SUM(si.line_total_cents) AS revenue_cents
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            INNER JOIN products p ON p.id = si.product_id
            LEFT JOIN providers pr ON pr.id = p.provider_id
            WHERE (?1 IS NULL OR s.business_date >= ?1)
              AND (?2 IS NULL OR s.business_date <= ?2)
            GROUP BY pr.id, pr.name
            ORDER BY revenue_cents DESC, pr.name
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
