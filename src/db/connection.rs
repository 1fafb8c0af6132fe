use anyhow::Context;
use sea_orm::DatabaseConnection;
use tracing::info;

use super::providers::{default_registry, redact_url};
use crate::config::DatabaseConfig;

/// Opens the pool through the provider matching the URL scheme. Table
/// creation is left to the migration runner.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let providers = default_registry()?;
    let provider = providers.provider_for_url(&cfg.url)?;

    info!(
        provider = provider.id().as_str(),
        url = %redact_url(&cfg.url),
        "connecting to database"
    );
    let db = provider
        .connect(cfg)
        .await
        .with_context(|| format!("failed to connect to {}", redact_url(&cfg.url)))?;
    provider.post_connect(&db, cfg).await?;
    Ok(db)
}

/// Maps driver-qualified URLs (`postgresql+asyncpg://`) onto the plain
/// scheme sqlx understands.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.split_once("://") {
        Some((scheme, rest)) if scheme.to_ascii_lowercase().starts_with("postgresql+") => {
            format!("postgresql://{rest}")
        }
        _ => trimmed.to_string(),
    }
}
