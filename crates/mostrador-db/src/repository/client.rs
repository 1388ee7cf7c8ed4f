//! # Client Repository
//!
//! Database operations for registered customers.
//!
//! Deleting a client keeps its sales; `sales.client_id` is set to NULL by
//! the foreign key.

use chrono::Utc;
use mostrador_core::validation::validate_client_input;
use mostrador_core::{Client, ClientInput, CoreError};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{clean, like_pattern};

const CLIENT_COLUMNS: &str = "id, name, phone, email, address, tax_id, created_at, updated_at";

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists clients by name, optionally filtered by a name/RFC substring.
    pub async fn list(&self, search: Option<&str>, limit: u32) -> DbResult<Vec<Client>> {
        let pattern = like_pattern(search);
        debug!(search = ?pattern, limit, "Listing clients");

        let sql = format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR tax_id LIKE ?1 ESCAPE '\')
            ORDER BY name, id
            LIMIT ?2
            "#
        );

        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    /// Gets a client by ID.
    pub async fn get(&self, id: i64) -> DbResult<Client> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");

        sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Creates a client.
    pub async fn create(&self, input: &ClientInput) -> DbResult<Client> {
        validate_client_input(input).map_err(CoreError::from)?;
        debug!(name = %input.name.trim(), "Inserting client");

        let result = sqlx::query(
            r#"
            INSERT INTO clients (name, phone, email, address, tax_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(input.name.trim())
        .bind(clean(input.phone.as_deref()))
        .bind(clean(input.email.as_deref()))
        .bind(clean(input.address.as_deref()))
        .bind(clean(input.tax_id.as_deref()).map(str::to_uppercase))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    /// Replaces a client's fields.
    pub async fn update(&self, id: i64, input: &ClientInput) -> DbResult<Client> {
        validate_client_input(input).map_err(CoreError::from)?;
        debug!(id, "Updating client");

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?2,
                phone = ?3,
                email = ?4,
                address = ?5,
                tax_id = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean(input.phone.as_deref()))
        .bind(clean(input.email.as_deref()))
        .bind(clean(input.address.as_deref()))
        .bind(clean(input.tax_id.as_deref()).map(str::to_uppercase))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        self.get(id).await
    }

    /// Deletes a client. Past sales stay, detached from the client.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{client_input, memory_db};

    #[tokio::test]
    async fn test_client_crud() {
        let db = memory_db().await;
        let mut input = client_input("  María López ");
        input.email = Some("maria@example.com".to_string());
        input.tax_id = Some("lomm800101abc".to_string());
        input.phone = Some("   ".to_string());

        let client = db.clients().create(&input).await.unwrap();
        assert_eq!(client.name, "María López");
        assert_eq!(client.tax_id.as_deref(), Some("LOMM800101ABC"));
        assert_eq!(client.phone, None);

        input.name = "María López Díaz".to_string();
        let updated = db.clients().update(client.id, &input).await.unwrap();
        assert_eq!(updated.name, "María López Díaz");

        let found = db.clients().list(Some("LOMM"), 10).await.unwrap();
        assert_eq!(found.len(), 1);

        db.clients().delete(client.id).await.unwrap();
        assert!(matches!(db.clients().get(client.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(db.clients().delete(client.id).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_client_bad_email_rejected() {
        let db = memory_db().await;
        let mut input = client_input("Juan");
        input.email = Some("juan-at-example".to_string());

        assert!(matches!(
            db.clients().create(&input).await,
            Err(DbError::Rejected(ref core)) if core.is_validation()
        ));
    }
}
