use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::Rating;

#[derive(Debug, Default, Deserialize)]
pub struct CreateRatingRequest {
    pub score: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: i64,
    pub score: i32,
    pub comment: Option<String>,
    pub user_id: i64,
    pub store_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            score: r.score,
            comment: r.comment,
            user_id: r.user_id,
            store_id: r.store_id,
            created_at: r.created_at,
        }
    }
}
