use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{dto::PublicUser, repo_types::UserFilter};
use crate::{
    auth::extractors::{require_admin, AuthUser},
    error::{AppError, StoreError},
    extract::{AppPath, AppQuery},
    pagination::Pagination,
    state::AppState,
};

pub fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
    AppQuery(filter): AppQuery<UserFilter>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = state
        .users
        .list_users(&filter, page)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Owned stores are kept without an owner; users with ratings cannot be deleted.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    match state.users.delete_user(id).await {
        Ok(true) => {
            info!(user_id = id, admin_id = admin.id, "user deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(AppError::NotFound("User not found".into())),
        Err(StoreError::Referenced) => {
            warn!(user_id = id, "delete blocked by existing ratings");
            Err(AppError::Conflict("User has ratings and cannot be deleted".into()))
        }
        Err(e) => Err(AppError::Internal(e.into())),
    }
}
