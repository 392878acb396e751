use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SystemAdmin,
    NormalUser,
    StoreOwner,
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never leaves the server
    pub address: Option<String>,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub q: Option<String>,
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }
        match self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let q = q.to_lowercase();
                user.name.to_lowercase().contains(&q) || user.email.to_lowercase().contains(&q)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str, role: Role) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 1,
            name: name.into(),
            email: email.into(),
            password_hash: "x".into(),
            address: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn role_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&Role::SystemAdmin).unwrap(), "\"SYSTEM_ADMIN\"");
        assert_eq!(serde_json::to_string(&Role::NormalUser).unwrap(), "\"NORMAL_USER\"");
        let r: Role = serde_json::from_str("\"STORE_OWNER\"").unwrap();
        assert_eq!(r, Role::StoreOwner);
        assert!(serde_json::from_str::<Role>("\"ADMIN\"").is_err());
    }

    #[test]
    fn filter_matches_name_email_and_role() {
        let u = user("Alice Baker", "alice@shop.com", Role::NormalUser);
        assert!(UserFilter::default().matches(&u));
        assert!(UserFilter { q: Some("baker".into()), role: None }.matches(&u));
        assert!(UserFilter { q: Some("SHOP.com".into()), role: None }.matches(&u));
        assert!(!UserFilter { q: Some("bob".into()), role: None }.matches(&u));
        assert!(!UserFilter { q: None, role: Some(Role::SystemAdmin) }.matches(&u));
        assert!(UserFilter { q: Some("  ".into()), role: Some(Role::NormalUser) }.matches(&u));
    }
}
