//! # Sale Repository
//!
//! Sale registration and sale history.
//!
//! ## Registration Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    register(draft) - one transaction                    │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├── INSERT sales (header)        ← first statement is a write, so    │
//! │   │                                  the write lock is held before any │
//! │   │                                  stock is read                     │
//! │   │                                                                     │
//! │   ├── for each line:                                                   │
//! │   │     [catalog pricing] SELECT price_cents                           │
//! │   │     UPDATE products SET stock = stock - n                          │
//! │   │       WHERE id = ? AND is_active = 1 AND stock >= n                │
//! │   │       └── 0 rows → ProductNotFound / InsufficientStock             │
//! │   │     INSERT sale_items                                              │
//! │   │                                                                     │
//! │   ├── [catalog pricing] UPDATE sales SET totals                        │
//! │   │                                                                     │
//! │  COMMIT ──► SaleReceipt                                                │
//! │                                                                         │
//! │  Any error ──► ROLLBACK (explicit) ──► error returned unchanged        │
//! │  Nothing is visible to other connections until COMMIT.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use mostrador_core::{
    CoreError, PriceSource, Sale, SaleDetail, SaleDraft, SaleItem, SaleReceipt, SaleTotals,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info, warn};

use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str =
    "id, client_id, payment_method, subtotal_cents, tax_cents, total_cents, business_date, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Registers a sale atomically: header, line items and stock decrements
    /// all commit together or not at all.
    ///
    /// ## Arguments
    /// * `draft` - Validated sale (see [`SaleDraft::from_request`])
    /// * `price_source` - Trust request prices or re-read them from the catalog
    /// * `business_date` - Store-local date the sale is booked under
    ///
    /// ## Returns
    /// * `Ok(SaleReceipt)` - Committed sale id and totals
    /// * `Err(DbError::Rejected(_))` - Unknown/inactive product, unknown
    ///   client or insufficient stock; nothing was written
    /// * `Err(_)` - Storage failure; nothing was written
    pub async fn register(
        &self,
        draft: &SaleDraft,
        price_source: PriceSource,
        business_date: NaiveDate,
    ) -> DbResult<SaleReceipt> {
        debug!(
            lines = draft.lines.len(),
            payment_method = %draft.payment_method,
            "Registering sale"
        );

        let mut tx = self.pool.begin().await?;

        match write_sale(&mut tx, draft, price_source, business_date).await {
            Ok(receipt) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                info!(
                    sale_id = receipt.sale_id,
                    total_cents = receipt.total_cents,
                    payment_method = %draft.payment_method,
                    "Sale registered"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after sale error");
                }

                match &err {
                    DbError::Rejected(reason) => warn!(reason = %reason, "Sale rejected"),
                    other => error!(error = %other, "Sale registration failed"),
                }
                Err(err)
            }
        }
    }

    /// Gets a sale with its line items.
    pub async fn get(&self, id: i64) -> DbResult<SaleDetail> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let items = self.get_items(id).await?;

        Ok(SaleDetail { sale, items })
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                si.id,
                si.sale_id,
                si.product_id,
                p.name AS product_name,
                si.quantity,
                si.unit_price_cents,
                si.line_total_cents
            FROM sale_items si
            INNER JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sale headers, newest first.
    ///
    /// ## Arguments
    /// * `date` - Only sales booked under this business date
    /// * `limit` - Maximum results to return
    pub async fn list(&self, date: Option<NaiveDate>, limit: u32) -> DbResult<Vec<Sale>> {
        debug!(date = ?date, limit, "Listing sales");

        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE (?1 IS NULL OR business_date = ?1)
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(date)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}

// =============================================================================
// Transaction Body
// =============================================================================

/// Every statement of a registration, run on the transaction's connection.
async fn write_sale(
    conn: &mut SqliteConnection,
    draft: &SaleDraft,
    price_source: PriceSource,
    business_date: NaiveDate,
) -> DbResult<SaleReceipt> {
    let mut lines = draft.lines.clone();
    let mut totals = draft.totals()?;

    let header = sqlx::query(
        r#"
        INSERT INTO sales (
            client_id, payment_method,
            subtotal_cents, tax_cents, total_cents,
            business_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(draft.client_id)
    .bind(draft.payment_method)
    .bind(totals.subtotal_cents)
    .bind(totals.tax_cents)
    .bind(totals.total_cents)
    .bind(business_date)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| match (DbError::from(e), draft.client_id) {
        // clients is the only table the header references
        (DbError::ForeignKeyViolation { .. }, Some(client_id)) => {
            DbError::Rejected(CoreError::ClientNotFound(client_id))
        }
        (other, _) => other,
    })?;

    let sale_id = header.last_insert_rowid();
    debug!(sale_id, "Sale header inserted");

    for line in lines.iter_mut() {
        if price_source == PriceSource::Catalog {
            let price: Option<i64> = sqlx::query_scalar(
                "SELECT price_cents FROM products WHERE id = ?1 AND is_active = 1",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *conn)
            .await?;

            let price = price.ok_or(CoreError::ProductNotFound(line.product_id))?;
            line.reprice(price)?;
        }

        let decremented = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2,
                updated_at = ?3
            WHERE id = ?1 AND is_active = 1 AND stock >= ?2
            "#,
        )
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        if decremented.rows_affected() == 0 {
            return Err(classify_stock_failure(conn, line.product_id, line.quantity).await);
        }

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                sale_id, product_id, quantity, unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(sale_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.line_total_cents)
        .execute(&mut *conn)
        .await?;
    }

    if price_source == PriceSource::Catalog {
        totals = SaleTotals::compute(&lines, draft.tax_rate)?;

        sqlx::query(
            r#"
            UPDATE sales SET
                subtotal_cents = ?2,
                tax_cents = ?3,
                total_cents = ?4
            WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .bind(totals.subtotal_cents)
        .bind(totals.tax_cents)
        .bind(totals.total_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(SaleReceipt {
        sale_id,
        subtotal_cents: totals.subtotal_cents,
        tax_cents: totals.tax_cents,
        total_cents: totals.total_cents,
    })
}

/// Explains why a conditional stock decrement touched no rows.
async fn classify_stock_failure(conn: &mut SqliteConnection, product_id: i64, requested: i64) -> DbError {
    let row: Result<Option<(i64, bool)>, sqlx::Error> =
        sqlx::query_as("SELECT stock, is_active FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await;

    match row {
        Ok(Some((available, true))) => CoreError::InsufficientStock {
            product_id,
            available,
            requested,
        }
        .into(),
        Ok(_) => CoreError::ProductNotFound(product_id).into(),
        Err(e) => e.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{client_input, create_product, memory_db};
    use crate::{Database, DbConfig};
    use mostrador_core::{LineItemRequest, PaymentMethod, SaleRequest, TaxRate};
    use std::time::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn draft(client_id: Option<i64>, items: &[(i64, i64, i64)]) -> SaleDraft {
        let request = SaleRequest {
            client_id,
            payment_method: Some("cash".to_string()),
            line_items: items
                .iter()
                .map(|&(product_id, quantity, unit_price_cents)| LineItemRequest {
                    product_id,
                    quantity,
                    unit_price_cents,
                })
                .collect(),
        };
        SaleDraft::from_request(request, TaxRate::default()).unwrap()
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn stock(db: &Database, id: i64) -> i64 {
        db.products().get(id).await.unwrap().stock
    }

    #[tokio::test]
    async fn test_register_sale_happy_path() {
        let db = memory_db().await;
        let a = create_product(&db, "REFRESCO", 1000, 10).await;
        let b = create_product(&db, "GALLETAS", 500, 10).await;

        let receipt = db
            .sales()
            .register(&draft(None, &[(a.id, 2, 1000), (b.id, 1, 500)]), PriceSource::Request, today())
            .await
            .unwrap();

        assert!(receipt.sale_id > 0);
        assert_eq!(receipt.subtotal_cents, 2500);
        assert_eq!(receipt.tax_cents, 400);
        assert_eq!(receipt.total_cents, 2900);

        assert_eq!(stock(&db, a.id).await, 8);
        assert_eq!(stock(&db, b.id).await, 9);

        let detail = db.sales().get(receipt.sale_id).await.unwrap();
        assert_eq!(detail.sale.payment_method, PaymentMethod::Cash);
        assert_eq!(detail.sale.business_date, today());
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].product_name, "Producto REFRESCO");
        assert_eq!(detail.items[0].line_total_cents, 2000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = memory_db().await;
        let a = create_product(&db, "A-1", 1000, 5).await;
        let b = create_product(&db, "B-1", 1000, 1).await;

        let err = db
            .sales()
            .register(&draft(None, &[(a.id, 2, 1000), (b.id, 3, 1000)]), PriceSource::Request, today())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Rejected(CoreError::InsufficientStock {
                available: 1,
                requested: 3,
                ..
            })
        ));
        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        // first line's decrement was undone
        assert_eq!(stock(&db, a.id).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products_rejected() {
        let db = memory_db().await;
        let retired = create_product(&db, "RETIRADO", 1000, 50).await;
        db.products().deactivate(retired.id).await.unwrap();

        let err = db
            .sales()
            .register(&draft(None, &[(9999, 1, 1000)]), PriceSource::Request, today())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::ProductNotFound(9999))));

        let err = db
            .sales()
            .register(&draft(None, &[(retired.id, 1, 1000)]), PriceSource::Request, today())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::ProductNotFound(id)) if id == retired.id));

        assert_eq!(stock(&db, retired.id).await, 50);
        assert_eq!(count(&db, "sales").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_client_rejected() {
        let db = memory_db().await;
        let p = create_product(&db, "P-1", 1000, 5).await;

        let err = db
            .sales()
            .register(&draft(Some(77), &[(p.id, 1, 1000)]), PriceSource::Request, today())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rejected(CoreError::ClientNotFound(77))));
        assert_eq!(stock(&db, p.id).await, 5);
    }

    #[tokio::test]
    async fn test_sale_with_client_survives_client_delete() {
        let db = memory_db().await;
        let p = create_product(&db, "P-1", 1000, 5).await;
        let client = db.clients().create(&client_input("Ana")).await.unwrap();

        let receipt = db
            .sales()
            .register(&draft(Some(client.id), &[(p.id, 1, 1000)]), PriceSource::Request, today())
            .await
            .unwrap();
        db.clients().delete(client.id).await.unwrap();

        let detail = db.sales().get(receipt.sale_id).await.unwrap();
        assert_eq!(detail.sale.client_id, None);
    }

    #[tokio::test]
    async fn test_storage_failure_mid_sale_leaves_no_rows() {
        let db = memory_db().await;
        let a = create_product(&db, "A-1", 1000, 5).await;
        let b = create_product(&db, "B-1", 1000, 5).await;

        // abort the second line-item insert
        sqlx::query(
            r#"
            CREATE TRIGGER fail_second_item BEFORE INSERT ON sale_items
            WHEN (SELECT COUNT(*) FROM sale_items WHERE sale_id = NEW.sale_id) >= 1
            BEGIN
                SELECT RAISE(ABORT, 'simulated storage failure');
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .sales()
            .register(&draft(None, &[(a.id, 1, 1000), (b.id, 1, 1000)]), PriceSource::Request, today())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::QueryFailed(ref msg) if msg.contains("simulated")));
        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        assert_eq!(stock(&db, a.id).await, 5);
        assert_eq!(stock(&db, b.id).await, 5);
    }

    #[tokio::test]
    async fn test_catalog_pricing_ignores_request_price() {
        let db = memory_db().await;
        let p = create_product(&db, "CAFE-250", 8900, 5).await;

        let receipt = db
            .sales()
            .register(&draft(None, &[(p.id, 2, 1)]), PriceSource::Catalog, today())
            .await
            .unwrap();

        assert_eq!(receipt.subtotal_cents, 17800);
        assert_eq!(receipt.tax_cents, 2848);
        assert_eq!(receipt.total_cents, 20648);

        let detail = db.sales().get(receipt.sale_id).await.unwrap();
        assert_eq!(detail.sale.total_cents, 20648);
        assert_eq!(detail.items[0].unit_price_cents, 8900);
    }

    #[tokio::test]
    async fn test_list_by_business_date() {
        let db = memory_db().await;
        let p = create_product(&db, "P-1", 1000, 10).await;
        let yesterday = today().pred_opt().unwrap();

        for date in [yesterday, today(), today()] {
            db.sales()
                .register(&draft(None, &[(p.id, 1, 1000)]), PriceSource::Request, date)
                .await
                .unwrap();
        }

        assert_eq!(db.sales().list(Some(today()), 50).await.unwrap().len(), 2);
        assert_eq!(db.sales().list(None, 50).await.unwrap().len(), 3);
        assert_eq!(db.sales().list(None, 1).await.unwrap().len(), 1);
        assert!(matches!(db.sales().get(999).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("concurrency.db"))
            .max_connections(4)
            .busy_timeout(Duration::from_secs(10));
        let db = Database::new(config).await.unwrap();
        let last_unit = create_product(&db, "ULTIMO", 1000, 1).await;

        let attempts: Vec<_> = (0..2)
            .map(|_| {
                let db = db.clone();
                let sale = draft(None, &[(last_unit.id, 1, 1000)]);
                tokio::spawn(async move {
                    db.sales().register(&sale, PriceSource::Request, today()).await
                })
            })
            .collect();

        let mut committed = 0;
        let mut rejected = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => committed += 1,
                Err(DbError::Rejected(CoreError::InsufficientStock { available: 0, .. })) => {
                    rejected += 1
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!((committed, rejected), (1, 1));
        assert_eq!(stock(&db, last_unit.id).await, 0);
        assert_eq!(count(&db, "sales").await, 1);
        assert_eq!(count(&db, "sale_items").await, 1);
    }
}
