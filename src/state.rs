use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::UserRepo;
use crate::config::AppConfig;
use crate::db::PgRepo;
use crate::memory::MemoryRepo;
use crate::ratings::repo::RatingRepo;
use crate::stores::repo::StoreRepo;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserRepo>,
    pub stores: Arc<dyn StoreRepo>,
    pub ratings: Arc<dyn RatingRepo>,
}

impl AppState {
    /// Connects to Postgres and applies pending migrations. A `memory:` database URL
    /// selects the in-process backend instead; its data is lost on exit.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        if config.database_url.starts_with("memory:") {
            tracing::warn!("using in-memory storage");
            let repo = Arc::new(MemoryRepo::new());
            return Ok(Self::from_parts(Arc::new(config), repo.clone(), repo.clone(), repo));
        }

        let repo = Arc::new(PgRepo::connect(&config).await?);
        repo.migrate().await?;
        Ok(Self::from_parts(
            Arc::new(config),
            repo.clone(),
            repo.clone(),
            repo,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        stores: Arc<dyn StoreRepo>,
        ratings: Arc<dyn RatingRepo>,
    ) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            config,
            keys,
            users,
            stores,
            ratings,
        }
    }

    /// State over an empty in-memory backend.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "memory:".into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            admin: None,
        });
        let repo = Arc::new(MemoryRepo::new());
        Self::from_parts(config, repo.clone(), repo.clone(), repo)
    }
}
