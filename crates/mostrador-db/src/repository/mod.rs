//! # Repository Module
//!
//! Database repository implementations for Mostrador.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().list(Some("coca"), false, 50)                   │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list / get / get_by_sku                                           │
//! │  ├── create / update                                                   │
//! │  └── adjust_stock / deactivate                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every repository validates its input with mostrador-core before any   │
//! │  SQL runs, so callers other than the HTTP layer get the same checks.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalog and stock
//! - [`ClientRepository`](client::ClientRepository) - Customers
//! - [`ProviderRepository`](provider::ProviderRepository) - Suppliers
//! - [`SaleRepository`](sale::SaleRepository) - Sale registration and history
//! - [`ReportRepository`](report::ReportRepository) - Read-only reports

pub mod client;
pub mod product;
pub mod provider;
pub mod report;
pub mod sale;

/// Trims an optional text field, mapping blank to `None`.
pub(crate) fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Builds a `LIKE` pattern matching `search` anywhere, escaping wildcards.
///
/// Use with `ESCAPE '\'`. Blank searches yield `None` (no filter).
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
    let search = clean(search)?;
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

// =============================================================================
// Test Helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use mostrador_core::{ClientInput, Product, ProductInput, ProviderInput};

    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn product_input(sku: &str, price_cents: i64, stock: i64) -> ProductInput {
        ProductInput {
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
        }
    }

    pub async fn create_product(db: &Database, sku: &str, price_cents: i64, stock: i64) -> Product {
        db.products()
            .create(&product_input(sku, price_cents, stock))
            .await
            .unwrap()
    }

    pub fn provider_input(name: &str) -> ProviderInput {
        ProviderInput {
            name: name.to_string(),
            contact_name: None,
            phone: None,
            email: None,
            address: None,
        }
    }

    pub fn client_input(name: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            phone: None,
            email: None,
            address: None,
            tax_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("coca")), Some("%coca%".to_string()));
        assert_eq!(like_pattern(Some(" 50%_off ")), Some("%50\\%\\_off%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }
}
