// src/routes/envelope.rs

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const FALLBACK_BODY: &[u8] = br#"{"error":"Failed to process chat request."}"#;

/// Wrap already-serialized JSON bytes. Every relay response goes through here.
pub fn raw(status: StatusCode, body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => raw(status, body),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response envelope");
            raw(StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_BODY.to_vec())
        }
    }
}
