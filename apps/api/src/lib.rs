//! # Mostrador API
//!
//! HTTP JSON API for the Mostrador point-of-sale / inventory service.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Server                                      │
//! │                                                                         │
//! │  Dashboard ──► HTTP (3000) ──► axum Router ──► Repositories ──► SQLite  │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                              ApiError ──► { error, code, details? }     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  products      │  │  sales         │  │  reports                   ││
//! │  │  clients       │  │                │  │                            ││
//! │  │  providers     │  │ • register     │  │ • low-stock   • top-sellers││
//! │  │                │  │ • list / get   │  │ • expiring    • by provider││
//! │  │ CRUD           │  │                │  │ • daily-cut                ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `mostrador.toml` (or `$MOSTRADOR_CONFIG`), then environment overrides:
//! - `MOSTRADOR__SERVER__PORT` - listen port (default: 3000)
//! - `MOSTRADOR__DATABASE__PATH` - SQLite file (default: ./mostrador.db)
//! - `MOSTRADOR__SALES__PRICE_SOURCE` - `request` or `catalog`
//! - `MOSTRADOR__STORE__UTC_OFFSET_MINUTES` - store clock offset
//! - `RUST_LOG` - log filter, overrides `logging.filter`

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;

pub use crate::config::AppConfig;
pub use crate::error::{ApiError, ApiResult, ErrorCode};
pub use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/products", routes::products::router())
        .nest("/clients", routes::clients::router())
        .nest("/providers", routes::providers::router())
        .nest("/sales", routes::sales::router())
        .nest("/reports", routes::reports::router());

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .with_state(state)
}
