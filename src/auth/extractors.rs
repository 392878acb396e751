use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::claims::CurrentUser;
use super::jwt::JwtKeys;
use crate::{error::AppError, users::repo_types::Role};

/// Capability a route requires before its handler runs.
#[derive(Debug, Clone, Copy)]
pub enum Access {
    Authenticated,
    Roles(&'static [Role]),
}

impl Access {
    pub const ADMIN: Access = Access::Roles(&[Role::SystemAdmin]);
    pub const RATER: Access = Access::Roles(&[Role::NormalUser]);

    pub fn permits(self, role: Role) -> bool {
        match self {
            Access::Authenticated => true,
            Access::Roles(roles) => roles.contains(&role),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized("Missing Authorization header"))?;

    // Expect "Bearer <token>"
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized("Invalid Authorization header"))
}

/// Validates the bearer token, checks `access`, and hands the request on with
/// a `CurrentUser` extension.
pub async fn authorize(
    keys: &JwtKeys,
    access: Access,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::Unauthorized("Invalid or expired token")
    })?;

    if !access.permits(claims.role) {
        warn!(user_id = claims.sub, role = ?claims.role, path = %req.uri().path(), "access denied");
        return Err(AppError::Forbidden("Insufficient permissions"));
    }

    req.extensions_mut().insert(CurrentUser::from(&claims));
    Ok(next.run(req).await)
}

pub async fn require_auth(
    State(keys): State<JwtKeys>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&keys, Access::Authenticated, req, next).await
}

pub async fn require_admin(
    State(keys): State<JwtKeys>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&keys, Access::ADMIN, req, next).await
}

pub async fn require_rater(
    State(keys): State<JwtKeys>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&keys, Access::RATER, req, next).await
}

/// The user the route guard admitted. Only usable behind one of the `require_*` layers.
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized("Authentication required"))
    }
}
