//! Health check endpoint.
//!
//! Reports database reachability and migration progress for monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    /// `connected` or `unreachable`
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrations: Option<MigrationStatus>,
}

#[derive(Debug, Serialize)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
}

/// `GET /health`
///
/// 200 when the database answers, 503 otherwise.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if !state.db.health_check().await {
        warn!("Health check: database unreachable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: "unreachable",
                migrations: None,
            }),
        );
    }

    let migrations = match state.db.migration_status().await {
        Ok((total, applied)) => Some(MigrationStatus { total, applied }),
        Err(e) => {
            warn!(error = %e, "Health check: could not read migration status");
            None
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            database: "connected",
            migrations,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;

    #[tokio::test]
    async fn test_health_reports_migrations() {
        let state = test_state().await;

        let (status, Json(body)) = check(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.database, "connected");
        let migrations = body.migrations.unwrap();
        assert!(migrations.total >= 1);
        assert_eq!(migrations.applied, migrations.total);
    }

    #[tokio::test]
    async fn test_health_after_drain_is_degraded() {
        let state = test_state().await;
        state.db.drain(std::time::Duration::from_secs(1)).await;

        let (status, Json(body)) = check(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
