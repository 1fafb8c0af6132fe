use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};

use super::{
    connect_options,
    registry::{DbProvider, DbProviderId},
};
use crate::{config::DatabaseConfig, db::normalize_url};

pub struct PostgresDbProvider;

#[async_trait]
impl DbProvider for PostgresDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Postgres
    }

    fn supports_url(&self, url: &str) -> bool {
        let normalized = url.trim().to_ascii_lowercase();
        normalized.starts_with("postgres://")
            || normalized.starts_with("postgresql://")
            || normalized.starts_with("postgresql+asyncpg://")
    }

    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        let options = connect_options(normalize_url(&cfg.url), cfg);
        Ok(Database::connect(options).await?)
    }
}
