use sqlx::FromRow;
use time::OffsetDateTime;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

/// Foreign key constraint names from the schema.
pub const RATER_FK: &str = "ratings_user_id_fkey";
pub const RATED_STORE_FK: &str = "ratings_store_id_fkey";

#[derive(Debug, Clone, FromRow)]
pub struct Rating {
    pub id: i64,
    pub score: i32,
    pub comment: Option<String>,
    pub user_id: i64,
    pub store_id: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub score: i32,
    pub comment: Option<String>,
    pub user_id: i64,
    pub store_id: i64,
}
