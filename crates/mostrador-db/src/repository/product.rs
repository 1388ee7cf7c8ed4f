//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Name/SKU search
//! - CRUD operations (soft delete only)
//! - Manual stock adjustments
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, compute, write back (lost updates)                │
//! │     SELECT stock ...; UPDATE products SET stock = 7 WHERE id = ?   │
//! │                                                                     │
//! │  ✅ CORRECT: conditional delta update                              │
//! │     UPDATE products SET stock = stock + ?delta                     │
//! │     WHERE id = ? AND stock + ?delta BETWEEN 0 AND MAX_STOCK        │
//! │                                                                     │
//! │  Zero rows affected → the product is missing or the delta would    │
//! │  leave the range. A follow-up SELECT tells which.                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use mostrador_core::validation::{validate_product_input, validate_stock_delta};
use mostrador_core::{CoreError, Product, ProductInput, ValidationError, MAX_STOCK};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{clean, like_pattern};

pub(crate) const PRODUCT_COLUMNS: &str = "id, sku, name, description, provider_id, price_cents, \
     cost_cents, stock, min_stock, expiration_date, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.list(Some("coca"), false, 20).await?;
/// let product = repo.get(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name.
    ///
    /// ## Arguments
    /// * `search` - Case-insensitive substring of the name or SKU
    /// * `include_inactive` - Also return soft-deleted products
    /// * `limit` - Maximum results to return
    pub async fn list(
        &self,
        search: Option<&str>,
        include_inactive: bool,
        limit: u32,
    ) -> DbResult<Vec<Product>> {
        let pattern = like_pattern(search);

        debug!(search = ?pattern, include_inactive, limit, "Listing products");

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR sku LIKE ?1 ESCAPE '\')
              AND (?2 OR is_active = 1)
            ORDER BY name, id
            LIMIT ?3
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .bind(include_inactive)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID, active or not.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with that ID
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Creates a product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated ID and timestamps
    /// * `Err(DbError::Rejected)` - Input failed validation
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown provider
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input).map_err(CoreError::from)?;

        let sku = input.sku.trim();
        debug!(sku = %sku, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                sku, name, description, provider_id,
                price_cents, cost_cents, stock, min_stock,
                expiration_date, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
        )
        .bind(sku)
        .bind(input.name.trim())
        .bind(clean(input.description.as_deref()))
        .bind(input.provider_id)
        .bind(input.price_cents)
        .bind(input.cost_cents)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(input.expiration_date)
        .bind(input.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(sku))?;

        self.get(result.last_insert_rowid()).await
    }

    /// Replaces every editable field of a product.
    ///
    /// Stock is overwritten too; use [`adjust_stock`](Self::adjust_stock)
    /// for deltas.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input).map_err(CoreError::from)?;

        let sku = input.sku.trim();
        debug!(id, sku = %sku, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                description = ?4,
                provider_id = ?5,
                price_cents = ?6,
                cost_cents = ?7,
                stock = ?8,
                min_stock = ?9,
                expiration_date = ?10,
                is_active = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(sku)
        .bind(input.name.trim())
        .bind(clean(input.description.as_deref()))
        .bind(input.provider_id)
        .bind(input.price_cents)
        .bind(input.cost_cents)
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(input.expiration_date)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(sku))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Adds `delta` units to stock (negative to remove).
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with that ID
    /// * `Err(DbError::Rejected(Validation))` - Zero or oversized delta, or
    ///   stock would exceed `MAX_STOCK`
    /// * `Err(DbError::Rejected(InsufficientStock))` - Stock would go negative
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<Product> {
        validate_stock_delta(delta).map_err(CoreError::from)?;

        debug!(id, delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock + ?2 BETWEEN 0 AND ?4
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .bind(MAX_STOCK)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get(id).await?;

            if delta > 0 {
                return Err(CoreError::from(ValidationError::OutOfRange {
                    field: "stock".to_string(),
                    min: 0,
                    max: MAX_STOCK,
                })
                .into());
            }

            return Err(CoreError::InsufficientStock {
                product_id: id,
                available: current.stock,
                requested: delta.saturating_neg(),
            }
            .into());
        }

        self.get(id).await
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Sale items keep referencing the row, so it is never removed.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
