//! In-process backend with the same constraint semantics as the Postgres schema:
//! unique user email, unique (user, store) rating, SET NULL on store owner,
//! RESTRICT on rating references.

use axum::async_trait;
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::auth::repo::UserRepo;
use crate::error::StoreError;
use crate::pagination::Pagination;
use crate::ratings::repo::RatingRepo;
use crate::ratings::repo_types::{NewRating, Rating, RATED_STORE_FK, RATER_FK};
use crate::stores::repo::StoreRepo;
use crate::stores::repo_types::{NewStore, Store, StoreFilter, StoreSummary, OWNER_FK};
use crate::users::repo_types::{NewUser, User, UserFilter};

fn missing(constraint: &str) -> StoreError {
    StoreError::MissingReference {
        constraint: Some(constraint.to_string()),
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    stores: Vec<Store>,
    ratings: Vec<Rating>,
    seq: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }
}

#[derive(Default)]
pub struct MemoryRepo {
    tables: Mutex<Tables>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryRepo {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.lock();
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: t.next_id(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            address: new.address,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool, StoreError> {
        let mut t = self.tables.lock();
        match t.users.iter_mut().find(|u| u.email == email) {
            Some(u) => {
                u.password_hash = password_hash.to_string();
                u.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self, filter: &UserFilter, page: Pagination) -> Result<Vec<User>, StoreError> {
        let t = self.tables.lock();
        Ok(page.window(t.users.iter().filter(|u| filter.matches(u)).cloned()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.lock();
        if !t.users.iter().any(|u| u.id == id) {
            return Ok(false);
        }
        if t.ratings.iter().any(|r| r.user_id == id) {
            return Err(StoreError::Referenced);
        }
        for store in t.stores.iter_mut().filter(|s| s.owner_id == Some(id)) {
            store.owner_id = None;
        }
        t.users.retain(|u| u.id != id);
        Ok(true)
    }
}

#[async_trait]
impl StoreRepo for MemoryRepo {
    async fn create_store(&self, new: NewStore) -> Result<Store, StoreError> {
        let mut t = self.tables.lock();
        if let Some(owner) = new.owner_id {
            if !t.users.iter().any(|u| u.id == owner) {
                return Err(missing(OWNER_FK));
            }
        }
        let now = OffsetDateTime::now_utc();
        let store = Store {
            id: t.next_id(),
            name: new.name,
            email: new.email,
            address: new.address,
            description: new.description,
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        };
        t.stores.push(store.clone());
        Ok(store)
    }

    async fn find_store(&self, id: i64) -> Result<Option<Store>, StoreError> {
        let t = self.tables.lock();
        Ok(t.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn list_stores(
        &self,
        filter: &StoreFilter,
        page: Pagination,
    ) -> Result<Vec<StoreSummary>, StoreError> {
        let t = self.tables.lock();
        let summaries = t.stores.iter().filter(|s| filter.matches(s)).map(|s| {
            let scores: Vec<i32> = t
                .ratings
                .iter()
                .filter(|r| r.store_id == s.id)
                .map(|r| r.score)
                .collect();
            let average_rating = (!scores.is_empty())
                .then(|| scores.iter().map(|&x| f64::from(x)).sum::<f64>() / scores.len() as f64);
            StoreSummary {
                store: s.clone(),
                average_rating,
                rating_count: scores.len() as i64,
            }
        });
        Ok(page.window(summaries))
    }
}

#[async_trait]
impl RatingRepo for MemoryRepo {
    async fn create_rating(&self, new: NewRating) -> Result<Rating, StoreError> {
        let mut t = self.tables.lock();
        if !t.users.iter().any(|u| u.id == new.user_id) {
            return Err(missing(RATER_FK));
        }
        if !t.stores.iter().any(|s| s.id == new.store_id) {
            return Err(missing(RATED_STORE_FK));
        }
        if t
            .ratings
            .iter()
            .any(|r| r.user_id == new.user_id && r.store_id == new.store_id)
        {
            return Err(StoreError::Duplicate);
        }
        let rating = Rating {
            id: t.next_id(),
            score: new.score,
            comment: new.comment,
            user_id: new.user_id,
            store_id: new.store_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.ratings.push(rating.clone());
        Ok(rating)
    }

    async fn list_ratings(&self, store_id: i64, page: Pagination) -> Result<Vec<Rating>, StoreError> {
        let t = self.tables.lock();
        Ok(page.window(
            t.ratings
                .iter()
                .rev()
                .filter(|r| r.store_id == store_id)
                .cloned(),
        ))
    }
}
