use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo_types;

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::user_routes(state)
}
