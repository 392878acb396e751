use axum::async_trait;

use crate::db::{like_pattern, PgRepo};
use crate::error::StoreError;
use crate::pagination::Pagination;
use crate::users::repo_types::{NewUser, User, UserFilter};

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// Fails with `Duplicate` when the email is taken.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    /// Returns `false` when no user has that email.
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError>;
    async fn list_users(&self, filter: &UserFilter, page: Pagination) -> Result<Vec<User>, StoreError>;
    /// Owned stores lose their owner; fails with `Referenced` while the user has ratings.
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str = "id, name, email, password_hash, address, role, created_at, updated_at";

#[async_trait]
impl UserRepo for PgRepo {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.address)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $2, updated_at = now()
             WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_users(&self, filter: &UserFilter, page: Pagination) -> Result<Vec<User>, StoreError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
               AND ($2::user_role IS NULL OR role = $2)
             ORDER BY id
             LIMIT $3 OFFSET $4
            "#
        ))
        .bind(like_pattern(filter.q.as_deref()))
        .bind(filter.role)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::on_delete)?;
        Ok(res.rows_affected() > 0)
    }
}
