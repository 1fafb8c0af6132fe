use std::{collections::HashMap, sync::Arc};

use anyhow::{Result, bail};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }
}

#[async_trait]
pub trait DbProvider: Send + Sync {
    fn id(&self) -> DbProviderId;
    fn supports_url(&self, url: &str) -> bool;
    async fn connect(&self, cfg: &DatabaseConfig) -> Result<DatabaseConnection>;
    async fn post_connect(&self, _db: &DatabaseConnection, _cfg: &DatabaseConfig) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct DbProviders {
    providers: HashMap<DbProviderId, Arc<dyn DbProvider>>,
}

impl DbProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn DbProvider>) -> Result<Self> {
        self.add(provider)?;
        Ok(self)
    }

    pub fn add(&mut self, provider: Arc<dyn DbProvider>) -> Result<()> {
        let id = provider.id();
        if self.providers.contains_key(&id) {
            bail!("database provider already registered: {}", id.as_str());
        }
        self.providers.insert(id, provider);
        Ok(())
    }

    pub fn provider_for_url(&self, url: &str) -> Result<Arc<dyn DbProvider>> {
        self.providers
            .values()
            .find(|provider| provider.supports_url(url))
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unsupported database url '{}'; expected postgres://, postgresql://, postgresql+asyncpg:// or sqlite:",
                    redact_url(url)
                )
            })
    }
}

/// Keeps the scheme and drops credentials, host and path.
pub fn redact_url(url: &str) -> String {
    let trimmed = url.trim();
    if let Some((scheme, _)) = trimmed.split_once("://") {
        format!("{scheme}://<redacted>")
    } else if let Some((scheme, _)) = trimmed.split_once(':') {
        format!("{scheme}:<redacted>")
    } else {
        "<invalid-url>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{DbProviderId, redact_url};
    use crate::db::providers::default_registry;

    #[test]
    fn default_registry_routes_every_supported_scheme() {
        let providers = default_registry().expect("default providers should register");

        for (url, expected) in [
            ("postgres://zodiac:pw@db/zodiac", DbProviderId::Postgres),
            ("postgresql://zodiac:pw@db/zodiac", DbProviderId::Postgres),
            ("postgresql+asyncpg://zodiac:pw@db/zodiac", DbProviderId::Postgres),
            ("sqlite://./zodiac.db?mode=rwc", DbProviderId::Sqlite),
            ("sqlite::memory:", DbProviderId::Sqlite),
        ] {
            let provider = providers
                .provider_for_url(url)
                .unwrap_or_else(|err| panic!("{url} should resolve: {err}"));
            assert_eq!(provider.id(), expected, "{url}");
        }
    }

    #[test]
    fn unsupported_scheme_error_hides_credentials() {
        let providers = default_registry().expect("default providers should register");
        let err = match providers.provider_for_url("mysql://root:hunter2@db/zodiac") {
            Ok(_) => panic!("mysql should be rejected"),
            Err(err) => err.to_string(),
        };

        assert!(err.contains("unsupported database url 'mysql://<redacted>'"));
        assert!(!err.contains("hunter2"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut providers = default_registry().expect("default providers should register");
        let err = providers
            .add(std::sync::Arc::new(crate::db::providers::sqlite::SqliteDbProvider))
            .expect_err("second sqlite provider should be rejected");
        assert!(err.to_string().contains("already registered: sqlite"));
    }

    #[test]
    fn redacts_urls_without_authority() {
        assert_eq!(redact_url("sqlite:zodiac.db"), "sqlite:<redacted>");
        assert_eq!(redact_url("nonsense"), "<invalid-url>");
    }
}
