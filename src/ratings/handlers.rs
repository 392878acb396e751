use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateRatingRequest, RatingResponse},
    services,
};
use crate::{
    auth::extractors::{require_rater, AuthUser},
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    pagination::Pagination,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/stores/:id/ratings", get(list_ratings))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/stores/:id/ratings", post(rate_store))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_rater))
}

#[instrument(skip(state))]
pub async fn list_ratings(
    State(state): State<AppState>,
    AppPath(store_id): AppPath<i64>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<RatingResponse>>, AppError> {
    let ratings =
        services::store_ratings(state.stores.as_ref(), state.ratings.as_ref(), store_id, page)
            .await?;
    Ok(Json(ratings.into_iter().map(RatingResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn rate_store(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    AppPath(store_id): AppPath<i64>,
    AppJson(payload): AppJson<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), AppError> {
    let rating = services::rate_store(
        state.stores.as_ref(),
        state.ratings.as_ref(),
        current.id,
        store_id,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(rating.into())))
}
