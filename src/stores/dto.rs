use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{Store, StoreSummary};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Store> for StoreResponse {
    fn from(s: Store) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            address: s.address,
            description: s.description,
            owner_id: s.owner_id,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListItem {
    #[serde(flatten)]
    pub store: StoreResponse,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

impl From<StoreSummary> for StoreListItem {
    fn from(s: StoreSummary) -> Self {
        Self {
            store: s.store.into(),
            average_rating: s.average_rating,
            rating_count: s.rating_count,
        }
    }
}
