use tracing::{info, warn};

use super::dto::CreateStoreRequest;
use super::repo::StoreRepo;
use super::repo_types::{NewStore, Store};
use crate::auth::password::is_valid_email;
use crate::auth::services::{non_blank, normalize_email};
use crate::error::{AppError, StoreError};

pub async fn create_store(stores: &dyn StoreRepo, req: CreateStoreRequest) -> Result<Store, AppError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Store name is required"));
    }
    let email = non_blank(req.email).map(|e| normalize_email(&e));
    if email.as_deref().is_some_and(|e| !is_valid_email(e)) {
        return Err(AppError::validation("Invalid email"));
    }

    let new = NewStore {
        name,
        email,
        address: non_blank(req.address),
        description: non_blank(req.description),
        owner_id: req.owner_id,
    };
    match stores.create_store(new).await {
        Ok(store) => {
            info!(store_id = store.id, owner_id = ?store.owner_id, "store created");
            Ok(store)
        }
        Err(StoreError::MissingReference { .. }) => {
            warn!(owner_id = ?req.owner_id, "store owner does not exist");
            Err(AppError::validation("ownerId does not reference an existing user"))
        }
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

pub async fn find_store(stores: &dyn StoreRepo, id: i64) -> Result<Store, AppError> {
    stores
        .find_store(id)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
}
