use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    middleware::CurrentUser,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        invoice_service::{
            DEFAULT_LIMIT, DEFAULT_SKIP, DeletedInvoice, InvoiceAction, InvoiceCounts,
            InvoiceView,
        },
    },
    state::AppState,
};

const MAX_LIMIT: i64 = 100;

/// `?skip=&limit=`, signed so negative input gets the pagination error
/// instead of a query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn resolve(&self) -> Result<(u64, u64), AppError> {
        let skip = self.skip.unwrap_or(DEFAULT_SKIP as i64);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT as i64);
        if skip < 0 || !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(format!(
                "Invalid pagination: skip={skip} limit={limit}"
            )));
        }
        Ok((skip as u64, limit as u64))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/counts", get(counts))
        .route("/success", get(list_success))
        .route("/failed", get(list_failed))
        .route("/failed/{tracking_id}", get(failed_by_tracking_id))
        .route("/deleted", get(list_deleted))
        .route("/{invoice_id}", delete(delete_invoice))
        .route("/{invoice_id}/restore", post(restore_invoice))
        .with_state(state)
}

async fn counts(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<InvoiceCounts> {
    let service = ServiceContext::from_state(&state).invoice();
    JsonApiResponse::ok(service.counts(user.id()).await?)
}

async fn list_success(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<InvoiceView>> {
    let (skip, limit) = page.resolve()?;
    let service = ServiceContext::from_state(&state).invoice();
    JsonApiResponse::ok(service.list_success(user.id(), skip, limit).await?)
}

async fn list_failed(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<InvoiceView>> {
    let (skip, limit) = page.resolve()?;
    let service = ServiceContext::from_state(&state).invoice();
    JsonApiResponse::ok(service.list_failed(user.id(), skip, limit).await?)
}

async fn failed_by_tracking_id(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(tracking_id): Path<String>,
) -> ApiResult<InvoiceView> {
    let service = ServiceContext::from_state(&state).invoice();
    JsonApiResponse::ok(
        service
            .failed_by_tracking_id(user.id(), &tracking_id)
            .await?,
    )
}

async fn list_deleted(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<DeletedInvoice>> {
    let (skip, limit) = page.resolve()?;
    let service = ServiceContext::from_state(&state).invoice();
    JsonApiResponse::ok(service.list_deleted(user.id(), skip, limit).await?)
}

async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(invoice_id): Path<i32>,
) -> ApiResult<InvoiceAction> {
    let service = ServiceContext::from_state(&state).invoice();
    let action = service.delete(user.id(), invoice_id).await?;
    JsonApiResponse::with_status(axum::http::StatusCode::OK, action.message, action)
}

async fn restore_invoice(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(invoice_id): Path<i32>,
) -> ApiResult<InvoiceAction> {
    let service = ServiceContext::from_state(&state).invoice();
    let action = service.restore(user.id(), invoice_id).await?;
    JsonApiResponse::with_status(axum::http::StatusCode::OK, action.message, action)
}

#[cfg(test)]
mod tests {
    use super::PageQuery;

    #[test]
    fn defaults_to_first_hundred() {
        assert_eq!(PageQuery::default().resolve().ok(), Some((0, 100)));
    }

    #[test]
    fn rejects_out_of_range_values_with_both_numbers() {
        for (skip, limit) in [(-1, 10), (0, 0), (0, 101)] {
            let query = PageQuery {
                skip: Some(skip),
                limit: Some(limit),
            };
            let err = query.resolve().expect_err("should be rejected");
            assert_eq!(
                err.message(),
                format!("Invalid pagination: skip={skip} limit={limit}")
            );
        }
    }
}
