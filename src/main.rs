use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use clap::Parser;
use sea_orm::DatabaseConnection;

use zodiac_api::{
    cli::{Cli, Command},
    config::{AppConfig, DatabaseConfig},
    db,
    logging::init_tracing,
    migration::{MigrationRunner, SeaOrmCatalog},
    routes::app,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("zodiac-api failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .clone()
        .context("database config missing; set DATABASE_URL or APP_DATABASE__URL")?;
    let db = db::connect(&db_cfg).await?;
    let migrations = MigrationRunner::new(Arc::new(SeaOrmCatalog::new(db.clone())));

    let result = match cli.command() {
        Command::Serve => serve(cfg, db.clone(), migrations).await,
        Command::Migrate => migrate(&migrations).await,
        Command::Status => print_status(&migrations).await,
    };

    close(db, &db_cfg).await;
    result
}

async fn serve(
    cfg: AppConfig,
    db: DatabaseConnection,
    migrations: MigrationRunner,
) -> anyhow::Result<()> {
    // Step failures are logged and surface through /health; only an
    // unreachable database stops startup.
    migrations
        .run_all_migrations()
        .await
        .context("database initialization failed")?;

    let state = AppState::new(cfg, db, migrations)?;
    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", addr);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn migrate(migrations: &MigrationRunner) -> anyhow::Result<()> {
    let report = migrations.run_all_migrations().await?;
    let failed: Vec<&str> = report.failures().map(|step| step.target.as_str()).collect();
    if !failed.is_empty() {
        bail!("{} migration step(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

async fn print_status(migrations: &MigrationRunner) -> anyhow::Result<()> {
    let status = migrations.get_migration_status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}

async fn close(db: DatabaseConnection, cfg: &DatabaseConfig) {
    if let Err(err) = db.close().await {
        tracing::warn!(error = %err, url = %db::providers::redact_url(&cfg.url), "closing database pool failed");
    }
}
