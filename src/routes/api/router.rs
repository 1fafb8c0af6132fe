use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, invoices};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/user/auth", auth::router(state.clone()))
        .nest("/invoices", invoices::router(state))
}
