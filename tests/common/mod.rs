#![allow(dead_code)]

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::{DateTime, FixedOffset, TimeZone};
use sea_orm::{DatabaseConnection, Value};
use tower::ServiceExt;
use uuid::Uuid;

use zodiac_api::{
    auth::{
        JwtKeys, Role,
        jwt::{encode_token, make_access_claims},
    },
    config::{AppConfig, AuthConfig},
    db::entities::{invoice_failed, invoice_success, user},
    migration::{MigrationRunner, SchemaCatalog, testing::InMemoryCatalog},
    routes::{API_PREFIX, app},
    state::AppState,
};

pub const SECRET: &str = "integration-test-secret";

pub fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

pub fn ts(day: u32, hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset should be valid")
        .with_ymd_and_hms(2026, 4, day, hour, 0, 0)
        .single()
        .expect("timestamp should be valid")
}

pub fn test_app(db: DatabaseConnection, catalog: InMemoryCatalog) -> Router {
    let mut cfg = AppConfig::default();
    cfg.auth = Some(AuthConfig::new(SECRET));
    let catalog: Arc<dyn SchemaCatalog> = Arc::new(catalog);
    let state = AppState::new(cfg, db, MigrationRunner::new(catalog)).expect("state should build");
    app(state)
}

pub fn bearer(user_id: i32) -> String {
    let keys = JwtKeys::from_secret(SECRET.as_bytes());
    let token = encode_token(&keys, &make_access_claims(user_id, vec![Role::User], 600))
        .expect("token should encode");
    format!("Bearer {token}")
}

pub fn user_model(id: i32, email: &str, password_hash: &str) -> user::Model {
    user::Model {
        id,
        email: email.to_string(),
        username: email.split('@').next().unwrap_or_default().to_string(),
        password_hash: password_hash.to_string(),
        is_active: true,
        is_verified: false,
        is_admin: false,
        created_at: ts(1, 0),
        updated_at: None,
        api_user_identifier: None,
        api_user_allowed: Some(true),
        api_key_hashed: None,
        api_key_created_at: None,
        api_key_updated_at: None,
        api_key_deactivated_at: None,
        api_key_allow_list: None,
    }
}

pub fn success_invoice(id: i32, user_id: i32) -> invoice_success::Model {
    invoice_success::Model {
        id,
        tracking_id: Uuid::new_v4(),
        user_id,
        uploaded_at: ts(2, id as u32 % 24),
        xml_path: Some(format!("uploads/{id}.xml")),
        xml_validation_pass: true,
        xml_convert_message: Some("converted".to_string()),
        edi_path: Some(format!("converted/{id}.x12")),
        edi_convert_pass: true,
        edi_convert_message: None,
        deleted_at: None,
        processing_steps_error: None,
        blob_xml_path: None,
        blob_edi_path: None,
        request_type: "web".to_string(),
    }
}

pub fn failed_invoice(id: i32, user_id: i32) -> invoice_failed::Model {
    invoice_failed::Model {
        id,
        tracking_id: Uuid::new_v4(),
        user_id,
        uploaded_at: ts(3, id as u32 % 24),
        xml_path: Some(format!("uploads/{id}.xml")),
        xml_validation_pass: false,
        xml_convert_message: Some("schema violation".to_string()),
        edi_path: None,
        edi_convert_pass: false,
        edi_convert_message: None,
        deleted_at: None,
        processing_steps_error: None,
        blob_xml_path: None,
        blob_edi_path: None,
        request_type: "web".to_string(),
    }
}

pub fn count_row(n: i64) -> BTreeMap<String, Value> {
    BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])
}

pub async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("body should be json");
    (status, json)
}
