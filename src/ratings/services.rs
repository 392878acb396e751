use tracing::{info, warn};

use super::dto::CreateRatingRequest;
use super::repo::RatingRepo;
use super::repo_types::{NewRating, Rating, MAX_SCORE, MIN_SCORE, RATER_FK};
use crate::auth::services::non_blank;
use crate::error::{AppError, StoreError};
use crate::pagination::Pagination;
use crate::stores::{repo::StoreRepo, services::find_store};

pub async fn rate_store(
    stores: &dyn StoreRepo,
    ratings: &dyn RatingRepo,
    user_id: i64,
    store_id: i64,
    req: CreateRatingRequest,
) -> Result<Rating, AppError> {
    let score = req
        .score
        .ok_or_else(|| AppError::validation("Score is required"))?;
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::validation(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }
    find_store(stores, store_id).await?;

    let new = NewRating {
        score,
        comment: non_blank(req.comment),
        user_id,
        store_id,
    };
    match ratings.create_rating(new).await {
        Ok(rating) => {
            info!(rating_id = rating.id, user_id, store_id, score, "store rated");
            Ok(rating)
        }
        Err(StoreError::Duplicate) => {
            warn!(user_id, store_id, "store already rated by user");
            Err(AppError::Conflict("You have already rated this store".into()))
        }
        // The rater's account was deleted after the token was issued.
        Err(e) if e.violates(RATER_FK) => Err(AppError::Unauthorized("User not found")),
        Err(StoreError::MissingReference { .. }) => Err(AppError::NotFound("Store not found".into())),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

pub async fn store_ratings(
    stores: &dyn StoreRepo,
    ratings: &dyn RatingRepo,
    store_id: i64,
    page: Pagination,
) -> Result<Vec<Rating>, AppError> {
    find_store(stores, store_id).await?;
    ratings
        .list_ratings(store_id, page)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}
