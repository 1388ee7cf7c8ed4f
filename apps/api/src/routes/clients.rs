//! Client endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use mostrador_core::{Client, ClientInput};
use tracing::info;

use crate::error::ApiResult;
use crate::routes::ListParams;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(delete))
}

/// `GET /api/clients?search=&limit=`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Client>>> {
    let Query(params) = query?;
    let search = params.search()?;

    Ok(Json(
        state.db.clients().list(search.as_deref(), params.limit()).await?,
    ))
}

/// `POST /api/clients`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ClientInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let Json(input) = body?;
    let client = state.db.clients().create(&input).await?;

    info!(id = client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /api/clients/{id}`
pub async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Client>> {
    let Path(id) = id?;
    Ok(Json(state.db.clients().get(id).await?))
}

/// `PUT /api/clients/{id}`
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ClientInput>, JsonRejection>,
) -> ApiResult<Json<Client>> {
    let Path(id) = id?;
    let Json(input) = body?;

    Ok(Json(state.db.clients().update(id, &input).await?))
}

/// `DELETE /api/clients/{id}`
///
/// Past sales keep their totals and lose the client reference.
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.db.clients().delete(id).await?;

    info!(id, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use axum::response::IntoResponse;

    fn input(name: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            phone: None,
            email: None,
            address: None,
            tax_id: None,
        }
    }

    #[tokio::test]
    async fn test_client_lifecycle() {
        let state = test_state().await;

        let (status, Json(client)) = create(State(state.clone()), Ok(Json(input("Fonda Doña Lupe"))))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let mut changed = input("Fonda Doña Lupe");
        changed.email = Some("lupe@example.mx".to_string());
        let Json(updated) = update(State(state.clone()), Ok(Path(client.id)), Ok(Json(changed)))
            .await
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("lupe@example.mx"));

        let params = ListParams {
            search: Some("lupe".to_string()),
            limit: None,
        };
        let Json(found) = list(State(state.clone()), Ok(Query(params))).await.unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(
            delete(State(state.clone()), Ok(Path(client.id))).await.unwrap(),
            StatusCode::NO_CONTENT
        );
        let err = fetch(State(state), Ok(Path(client.id))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_email_is_rejected() {
        let state = test_state().await;
        let mut bad = input("Juan Pérez");
        bad.email = Some("juan.example.mx".to_string());

        let err = create(State(state), Ok(Json(bad))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
