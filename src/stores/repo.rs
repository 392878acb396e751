use axum::async_trait;

use super::repo_types::{NewStore, Store, StoreFilter, StoreSummary};
use crate::db::{like_pattern, PgRepo};
use crate::error::StoreError;
use crate::pagination::Pagination;

#[async_trait]
pub trait StoreRepo: Send + Sync {
    /// Fails with `MissingReference` when `owner_id` names no user.
    async fn create_store(&self, new: NewStore) -> Result<Store, StoreError>;
    async fn find_store(&self, id: i64) -> Result<Option<Store>, StoreError>;
    async fn list_stores(
        &self,
        filter: &StoreFilter,
        page: Pagination,
    ) -> Result<Vec<StoreSummary>, StoreError>;
}

const STORE_COLUMNS: &str =
    "id, name, email, address, description, owner_id, created_at, updated_at";

#[async_trait]
impl StoreRepo for PgRepo {
    async fn create_store(&self, new: NewStore) -> Result<Store, StoreError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            r#"
            INSERT INTO stores (name, email, address, description, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.address)
        .bind(&new.description)
        .bind(new.owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(store)
    }

    async fn find_store(&self, id: i64) -> Result<Option<Store>, StoreError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    async fn list_stores(
        &self,
        filter: &StoreFilter,
        page: Pagination,
    ) -> Result<Vec<StoreSummary>, StoreError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, StoreSummary>(
            r#"
            SELECT s.id, s.name, s.email, s.address, s.description, s.owner_id,
                   s.created_at, s.updated_at,
                   AVG(r.score)::float8 AS average_rating,
                   COUNT(r.id)          AS rating_count
              FROM stores s
              LEFT JOIN ratings r ON r.store_id = s.id
             WHERE ($1::text IS NULL OR s.name ILIKE $1 OR s.email ILIKE $1)
             GROUP BY s.id
             ORDER BY s.id
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(filter.q.as_deref()))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
