use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    auth::TokenResponse,
    middleware::CurrentUser,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, user_service::PublicUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/create-user", post(create_user))
        .route("/login", post(login))
        .route("/fetch_user", get(fetch_user))
        .with_state(state)
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<TokenResponse> {
    let service = ServiceContext::from_state(&state).auth(&state);
    let token = service
        .register(&body.email, &body.username, &body.password)
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "User created", token)
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let service = ServiceContext::from_state(&state).auth(&state);
    let token = service.login(&body.email, &body.password).await?;
    JsonApiResponse::ok(token)
}

async fn fetch_user(CurrentUser(user): CurrentUser) -> ApiResult<PublicUser> {
    JsonApiResponse::ok(PublicUser::from(user))
}
