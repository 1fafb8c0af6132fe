use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;

use crate::{auth::JwtKeys, config::AppConfig, config::defaults, migration::MigrationRunner};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
    pub migrations: MigrationRunner,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        migrations: MigrationRunner,
    ) -> anyhow::Result<Arc<Self>> {
        let auth = config
            .auth
            .as_ref()
            .context("auth config missing; set APP_AUTH__JWT_SECRET")?;
        let jwt = JwtKeys::from_secret(auth.jwt_secret.as_bytes());

        Ok(Arc::new(Self {
            config,
            db,
            jwt,
            migrations,
        }))
    }

    pub fn access_token_ttl_secs(&self) -> usize {
        self.config
            .auth
            .as_ref()
            .map(|auth| auth.access_token_ttl_secs)
            .unwrap_or(defaults::DEFAULT_ACCESS_TOKEN_TTL_SECS as u64) as usize
    }
}
