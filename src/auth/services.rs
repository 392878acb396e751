use lazy_static::lazy_static;
use tracing::{info, warn};

use super::dto::RegisterRequest;
use super::password::{check_password_policy, hash_password, verify_password};
use super::repo::UserRepo;
use crate::config::AdminSeed;
use crate::error::{AppError, StoreError};
use crate::users::repo_types::{NewUser, Role, User};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

lazy_static! {
    /// Verified against when the email is unknown, so both login failures cost one argon2 check.
    static ref DUMMY_HASH: Option<String> = hash_password("dummy-Password!").ok();
}

/// Creates a `NORMAL_USER` account. Only presence of the fields is checked here;
/// the password policy applies when a password is changed.
pub async fn register(users: &dyn UserRepo, req: RegisterRequest) -> Result<User, AppError> {
    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Name, email and password are required"));
    }

    let password_hash = hash_password(&req.password)?;
    let new = NewUser {
        name,
        email,
        password_hash,
        address: non_blank(req.address),
        role: Role::NormalUser,
    };

    match users.create_user(new).await {
        Ok(user) => {
            info!(user_id = user.id, email = %user.email, "user registered");
            Ok(user)
        }
        Err(StoreError::Duplicate) => {
            warn!(email = %req.email.trim(), "email already registered");
            Err(AppError::Conflict("Email already registered".into()))
        }
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

/// Unknown email and wrong password fail identically.
pub async fn verify_credentials(
    users: &dyn UserRepo,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let Some(user) = users
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
    else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}

pub async fn update_password(
    users: &dyn UserRepo,
    email: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let email = normalize_email(email);
    if email.is_empty() || new_password.is_empty() {
        return Err(AppError::validation("Email and new password are required"));
    }
    check_password_policy(new_password).map_err(AppError::validation)?;

    let hash = hash_password(new_password)?;
    let updated = users
        .update_password(&email, &hash)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    if !updated {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(email = %email, "password updated");
    Ok(())
}

/// Creates the configured administrator unless an account with that email exists.
pub async fn ensure_admin(users: &dyn UserRepo, seed: &AdminSeed) -> anyhow::Result<()> {
    check_password_policy(&seed.password)
        .map_err(|reason| anyhow::anyhow!("ADMIN_PASSWORD rejected: {reason}"))?;
    let email = normalize_email(&seed.email);
    if users.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }
    let new = NewUser {
        name: seed.name.clone(),
        email,
        password_hash: hash_password(&seed.password)?,
        address: None,
        role: Role::SystemAdmin,
    };
    match users.create_user(new).await {
        Ok(user) => {
            info!(user_id = user.id, "administrator account created");
            Ok(())
        }
        // Another instance won the race.
        Err(StoreError::Duplicate) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
