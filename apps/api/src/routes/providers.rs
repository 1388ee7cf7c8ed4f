//! Provider (supplier) endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use mostrador_core::{Provider, ProviderInput};
use tracing::info;

use crate::error::ApiResult;
use crate::routes::ListParams;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(delete))
}

/// `GET /api/providers?search=&limit=`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Provider>>> {
    let Query(params) = query?;
    let search = params.search()?;

    Ok(Json(
        state.db.providers().list(search.as_deref(), params.limit()).await?,
    ))
}

/// `POST /api/providers`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ProviderInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Provider>)> {
    let Json(input) = body?;
    let provider = state.db.providers().create(&input).await?;

    info!(id = provider.id, name = %provider.name, "Provider created");
    Ok((StatusCode::CREATED, Json(provider)))
}

/// `GET /api/providers/{id}`
pub async fn fetch(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Provider>> {
    let Path(id) = id?;
    Ok(Json(state.db.providers().get(id).await?))
}

/// `PUT /api/providers/{id}`
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProviderInput>, JsonRejection>,
) -> ApiResult<Json<Provider>> {
    let Path(id) = id?;
    let Json(input) = body?;

    Ok(Json(state.db.providers().update(id, &input).await?))
}

/// `DELETE /api/providers/{id}`
///
/// The provider's products stay in the catalog without a provider.
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.db.providers().delete(id).await?;

    info!(id, "Provider deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use axum::response::IntoResponse;
    use mostrador_core::ProductInput;

    fn input(name: &str) -> ProviderInput {
        ProviderInput {
            name: name.to_string(),
            contact_name: None,
            phone: None,
            email: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_delete_keeps_products() {
        let state = test_state().await;
        let (_, Json(provider)) = create(State(state.clone()), Ok(Json(input("Grupo Lala"))))
            .await
            .unwrap();

        let product = state
            .db
            .products()
            .create(&ProductInput {
                sku: "LAL-01".to_string(),
                name: "Leche Entera 1L".to_string(),
                description: None,
                provider_id: Some(provider.id),
                price_cents: 2850,
                cost_cents: None,
                stock: 10,
                min_stock: 0,
                expiration_date: None,
                is_active: true,
            })
            .await
            .unwrap();

        delete(State(state.clone()), Ok(Path(provider.id))).await.unwrap();

        let orphan = state.db.products().get(product.id).await.unwrap();
        assert_eq!(orphan.provider_id, None);
    }

    #[tokio::test]
    async fn test_update_missing_provider_is_not_found() {
        let state = test_state().await;

        let err = update(State(state), Ok(Path(77)), Ok(Json(input("Sabritas"))))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
