use axum::{
    body::to_bytes,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::response::{INTERNAL_ERROR_MESSAGE, JsonApiResponse};

const MAX_REJECTION_BYTES: usize = 16 * 1024;

/// Wraps failures that never went through `AppError` in the API envelope:
/// extractor rejections (a non-numeric `invoice_id`, a malformed query or
/// JSON body), unmatched routes and wrong methods.
pub async fn json_error_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let text = match to_bytes(body, MAX_REJECTION_BYTES).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_owned(),
        Err(_) => String::new(),
    };
    let message = rejection_message(status, text);
    if status.is_server_error() {
        tracing::error!(%method, path = %path, status = status.as_u16(), "request failed outside a handler");
    } else {
        tracing::debug!(%method, path = %path, status = status.as_u16(), %message, "request rejected");
    }

    let mut wrapped = JsonApiResponse::failure(status, message).into_response();
    for name in [header::ALLOW, header::WWW_AUTHENTICATE] {
        if let Some(value) = parts.headers.get(&name) {
            wrapped.headers_mut().insert(name, value.clone());
        }
    }
    wrapped
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            let value = value.to_ascii_lowercase();
            value.starts_with("application/json") || value.contains("+json")
        })
}

fn rejection_message(status: StatusCode, text: String) -> String {
    match status {
        StatusCode::NOT_FOUND => "Not Found".to_string(),
        StatusCode::METHOD_NOT_ALLOWED => "Method Not Allowed".to_string(),
        _ if status.is_server_error() => INTERNAL_ERROR_MESSAGE.to_string(),
        _ if text.is_empty() => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
        _ => text,
    }
}
