use axum::async_trait;

use super::repo_types::{NewRating, Rating};
use crate::db::PgRepo;
use crate::error::StoreError;
use crate::pagination::Pagination;

#[async_trait]
pub trait RatingRepo: Send + Sync {
    /// Fails with `Duplicate` when the user already rated the store.
    async fn create_rating(&self, new: NewRating) -> Result<Rating, StoreError>;
    /// Newest first.
    async fn list_ratings(&self, store_id: i64, page: Pagination) -> Result<Vec<Rating>, StoreError>;
}

#[async_trait]
impl RatingRepo for PgRepo {
    async fn create_rating(&self, new: NewRating) -> Result<Rating, StoreError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (score, comment, user_id, store_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, score, comment, user_id, store_id, created_at
            "#,
        )
        .bind(new.score)
        .bind(&new.comment)
        .bind(new.user_id)
        .bind(new.store_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(rating)
    }

    async fn list_ratings(&self, store_id: i64, page: Pagination) -> Result<Vec<Rating>, StoreError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, score, comment, user_id, store_id, created_at
              FROM ratings
             WHERE store_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(store_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
