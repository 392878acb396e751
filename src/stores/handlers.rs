use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateStoreRequest, StoreListItem, StoreResponse},
    repo_types::StoreFilter,
    services,
};
use crate::{
    auth::extractors::require_admin,
    error::AppError,
    extract::{AppJson, AppQuery},
    pagination::Pagination,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/stores", get(list_stores))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/stores", post(create_store))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

#[instrument(skip(state))]
pub async fn list_stores(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
    AppQuery(filter): AppQuery<StoreFilter>,
) -> Result<Json<Vec<StoreListItem>>, AppError> {
    let stores = state
        .stores
        .list_stores(&filter, page)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(stores.into_iter().map(StoreListItem::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_store(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), AppError> {
    let store = services::create_store(state.stores.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(store.into())))
}
