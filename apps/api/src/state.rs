//! Shared application state.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use mostrador_core::types::business_date;
use mostrador_db::Database;

use crate::config::AppConfig;

/// State handed to every handler. Cheap to clone: the pool and the
/// config are both reference counted.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    /// The store-local date right now.
    pub fn today(&self) -> NaiveDate {
        business_date(Utc::now(), self.config.store.utc_offset_minutes)
    }
}
