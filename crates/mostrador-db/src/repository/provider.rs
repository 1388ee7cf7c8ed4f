//! # Provider Repository
//!
//! Database operations for suppliers.
//!
//! Deleting a provider keeps its products; `products.provider_id` is set to
//! NULL by the foreign key.

use chrono::Utc;
use mostrador_core::validation::validate_provider_input;
use mostrador_core::{CoreError, Provider, ProviderInput};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{clean, like_pattern};

const PROVIDER_COLUMNS: &str =
    "id, name, contact_name, phone, email, address, created_at, updated_at";

/// Repository for provider database operations.
#[derive(Debug, Clone)]
pub struct ProviderRepository {
    pool: SqlitePool,
}

impl ProviderRepository {
    /// Creates a new ProviderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProviderRepository { pool }
    }

    /// Lists providers by name, optionally filtered by a name substring.
    pub async fn list(&self, search: Option<&str>, limit: u32) -> DbResult<Vec<Provider>> {
        let pattern = like_pattern(search);
        debug!(search = ?pattern, limit, "Listing providers");

        let sql = format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM providers
            WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR contact_name LIKE ?1 ESCAPE '\')
            ORDER BY name, id
            LIMIT ?2
            "#
        );

        let providers = sqlx::query_as::<_, Provider>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(providers)
    }

    /// Gets a provider by ID.
    pub async fn get(&self, id: i64) -> DbResult<Provider> {
        let sql = format!("SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = ?1");

        sqlx::query_as::<_, Provider>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Provider", id))
    }

    /// Creates a provider.
    pub async fn create(&self, input: &ProviderInput) -> DbResult<Provider> {
        validate_provider_input(input).map_err(CoreError::from)?;
        debug!(name = %input.name.trim(), "Inserting provider");

        let result = sqlx::query(
            r#"
            INSERT INTO providers (name, contact_name, phone, email, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(input.name.trim())
        .bind(clean(input.contact_name.as_deref()))
        .bind(clean(input.phone.as_deref()))
        .bind(clean(input.email.as_deref()))
        .bind(clean(input.address.as_deref()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    /// Replaces a provider's fields.
    pub async fn update(&self, id: i64, input: &ProviderInput) -> DbResult<Provider> {
        validate_provider_input(input).map_err(CoreError::from)?;
        debug!(id, "Updating provider");

        let result = sqlx::query(
            r#"
            UPDATE providers SET
                name = ?2,
                contact_name = ?3,
                phone = ?4,
                email = ?5,
                address = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(input.contact_name.as_deref()))
        .bind(clean(input.phone.as_deref()))
        .bind(clean(input.email.as_deref()))
        .bind(clean(input.address.as_deref()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Provider", id));
        }

        self.get(id).await
    }

    /// Deletes a provider. Its products stay, without a provider.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting provider");

        let result = sqlx::query("DELETE FROM providers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Provider", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
