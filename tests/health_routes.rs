mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;

use common::{json_response, test_app};
use zodiac_api::migration::{MigrationRunner, testing::InMemoryCatalog};

fn mock_db() -> sea_orm::DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

#[tokio::test]
async fn root_reports_running() {
    let app = test_app(mock_db(), InMemoryCatalog::legacy_schema());

    let (status, body) = json_response(app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Zodiac API is running", "status": "healthy"})
    );
}

#[tokio::test]
async fn health_is_degraded_before_migrations_run() {
    let app = test_app(mock_db(), InMemoryCatalog::legacy_schema());

    let (status, body) = json_response(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["service"], "zodiac-api");
    assert_eq!(
        body["database_migrations"]["deleted_at_columns"],
        json!({
            "zodiac_invoice_success_edi": false,
            "zodiac_invoice_failed_edi": false
        })
    );
}

#[tokio::test]
async fn health_is_healthy_after_migrations_run() {
    let catalog = InMemoryCatalog::legacy_schema();
    let report = MigrationRunner::new(std::sync::Arc::new(catalog.clone()))
        .run_all_migrations()
        .await
        .expect("migrations should run");
    assert!(report.is_clean());

    let app = test_app(mock_db(), catalog);
    let (status, body) = json_response(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["database_migrations"],
        json!({
            "deleted_at_columns": {
                "zodiac_invoice_success_edi": true,
                "zodiac_invoice_failed_edi": true
            },
            "processing_steps_columns": {
                "zodiac_invoice_success_edi": true,
                "zodiac_invoice_failed_edi": true
            },
            "blob_path_columns": {
                "zodiac_invoice_success_edi": {"blob_xml_path": true, "blob_edi_path": true},
                "zodiac_invoice_failed_edi": {"blob_xml_path": true, "blob_edi_path": true}
            },
            "api_key_columns": {
                "zodiac_users": {
                    "api_user_identifier": true,
                    "api_user_allowed": true,
                    "api_key_hashed": true,
                    "api_key_created_at": true,
                    "api_key_updated_at": true,
                    "api_key_deactivated_at": true,
                    "api_key_allow_list": true
                }
            },
            "request_type_columns": {
                "zodiac_invoice_success_edi": true,
                "zodiac_invoice_failed_edi": true
            },
            "indexes": {
                "deleted_at_indexes": [true, true, true, true],
                "processing_steps_indexes": [true, true],
                "api_key_indexes": [true, true],
                "request_type_indexes": [true, true]
            }
        })
    );
}

#[tokio::test]
async fn health_stays_up_when_catalog_is_unreachable() {
    let catalog = InMemoryCatalog::legacy_schema();
    catalog.set_unreachable(true);
    let app = test_app(mock_db(), catalog);

    let (status, body) = json_response(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn unknown_routes_get_json_errors() {
    let app = test_app(mock_db(), InMemoryCatalog::legacy_schema());

    let (status, body) = json_response(app, get("/api/v1/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
