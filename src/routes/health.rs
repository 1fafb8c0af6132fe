use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::{config::defaults::SERVICE_NAME, migration::MigrationStatus, state::AppState};

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database_migrations: MigrationStatus,
}

impl HealthResponse {
    pub fn from_status(database_migrations: MigrationStatus) -> Self {
        let status = if database_migrations.all_applied() {
            "healthy"
        } else {
            "degraded"
        };
        Self {
            status,
            service: SERVICE_NAME,
            database_migrations,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Zodiac API is running",
        status: "healthy",
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.migrations.get_migration_status().await;
    Json(HealthResponse::from_status(status))
}
