use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

pub type ApiResult<T> = Result<JsonApiResponse<T>, AppError>;

/// Message sent in place of anything that failed server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Envelope for every `/api/v1` response. Failures repeat the message under
/// `detail`, the field upload clients of the previous FastAPI service read.
#[derive(Debug, Serialize)]
pub struct JsonApiResponse<T: Serialize> {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub data: T,
}

impl<T: Serialize> JsonApiResponse<T> {
    pub fn ok(data: T) -> ApiResult<T> {
        Self::with_status(StatusCode::OK, "ok", data)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self {
            status: status.as_u16(),
            message: message.into(),
            detail: None,
            data,
        })
    }
}

impl JsonApiResponse<()> {
    /// Error envelope; `data` serializes as `null`.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: status.as_u16(),
            detail: Some(message.clone()),
            message,
            data: (),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(cause) => {
                tracing::error!(status = status.as_u16(), error = %cause, "request failed");
                INTERNAL_ERROR_MESSAGE
            }
            other => other.message(),
        };
        JsonApiResponse::failure(status, message).into_response()
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body, http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use super::JsonApiResponse;
    use crate::error::AppError;

    async fn body_of(response: axum::response::Response) -> Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    #[tokio::test]
    async fn client_errors_carry_message_and_detail() {
        let response = AppError::not_found("Invoice not found or already deleted").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_of(response).await,
            json!({
                "status": 404,
                "message": "Invoice not found or already deleted",
                "detail": "Invoice not found or already deleted",
                "data": null
            })
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let response =
            AppError::internal("Query Error: relation \"zodiac_users\" does not exist").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("zodiac_users"));
    }

    #[tokio::test]
    async fn success_envelope_omits_detail() {
        let response = JsonApiResponse::ok(json!({"successful": 1}))
            .expect("ok envelope")
            .into_response();

        let body = body_of(response).await;
        assert_eq!(body["status"], 200);
        assert!(body.get("detail").is_none());
    }
}
