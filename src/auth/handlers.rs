use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UpdatePasswordRequest},
    extractors::{require_auth, AuthUser},
    services,
};
use crate::{
    error::AppError, extract::AppJson, state::AppState, users::dto::PublicUser,
    users::repo_types::Role,
};

pub fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/update-password",
            post(update_password)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user =
        services::verify_credentials(state.users.as_ref(), &payload.email, &payload.password).await?;
    let token = state.keys.sign(&user)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Users may change their own password; administrators may change anyone's.
#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(current): AuthUser,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.email.trim().is_empty() || payload.new_password.is_empty() {
        return Err(AppError::validation("Email and new password are required"));
    }
    if current.role != Role::SystemAdmin {
        let me = state
            .users
            .find_user(current.id)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or(AppError::Unauthorized("User not found"))?;
        if me.email != services::normalize_email(&payload.email) {
            warn!(user_id = current.id, "attempt to change another user's password");
            return Err(AppError::Forbidden("Cannot change another user's password"));
        }
    }

    services::update_password(state.users.as_ref(), &payload.email, &payload.new_password).await?;
    Ok(Json(MessageResponse {
        message: "Password updated",
    }))
}
