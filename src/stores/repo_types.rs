use serde::Deserialize;
use sqlx::FromRow;
use time::OffsetDateTime;

pub const OWNER_FK: &str = "stores_owner_id_fkey";

#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A store row joined with its rating aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct StoreSummary {
    #[sqlx(flatten)]
    pub store: Store,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFilter {
    pub q: Option<String>,
}

impl StoreFilter {
    pub fn matches(&self, store: &Store) -> bool {
        match self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let q = q.to_lowercase();
                store.name.to_lowercase().contains(&q)
                    || store
                        .email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&q))
            }
            None => true,
        }
    }
}
