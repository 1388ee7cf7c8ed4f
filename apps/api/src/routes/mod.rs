//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /health                              health::check                     │
//! │  /api/products[/{id}[/stock]]         products::*                       │
//! │  /api/clients[/{id}]                  clients::*                        │
//! │  /api/providers[/{id}]                providers::*                      │
//! │  /api/sales[/{id}]                    sales::*                          │
//! │  /api/reports/{report}                reports::*                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers take extractors as `Result<_, Rejection>` so malformed input
//! comes back in the same error body as everything else.

pub mod clients;
pub mod health;
pub mod products;
pub mod providers;
pub mod reports;
pub mod sales;

use mostrador_core::validation::validate_search_query;
use mostrador_core::{CoreError, MAX_PAGE_SIZE};
use serde::Deserialize;

use crate::error::ApiResult;

/// Page size when a list request gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Query string shared by the simple list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl ListParams {
    /// Trimmed search text, `None` when blank.
    pub fn search(&self) -> ApiResult<Option<String>> {
        search_term(self.search.as_deref())
    }

    pub fn limit(&self) -> u32 {
        clamp_limit(self.limit, DEFAULT_PAGE_SIZE)
    }
}

/// Applies the default and caps the page size.
pub fn clamp_limit(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

pub fn search_term(raw: Option<&str>) -> ApiResult<Option<String>> {
    match raw {
        Some(raw) => {
            let query = validate_search_query(raw).map_err(CoreError::from)?;
            Ok((!query.is_empty()).then_some(query))
        }
        None => Ok(None),
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use mostrador_db::{Database, DbConfig};

    use crate::config::AppConfig;
    use crate::state::AppState;

    pub async fn test_state() -> AppState {
        state_with(AppConfig::default()).await
    }

    pub async fn state_with(config: AppConfig) -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(db, config)
    }
}
