use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::RelayError,
    message::{OutputBody, UpstreamReply},
    origin::is_origin_allowed,
    routes::envelope,
    services::validation::{
        MAX_BODY_BYTES, check_content_length, parse_body, require_json_content_type, validate_chat,
    },
    state::{AppState, SharedState},
};

pub async fn chat_handler(State(state): State<SharedState>, request: Request) -> Response {
    let span = tracing::info_span!("chat_relay", request_id = %Uuid::new_v4());

    match relay(&state, request).instrument(span).await {
        Ok(UpstreamReply::Json(body)) => envelope::raw(StatusCode::OK, body),
        Ok(UpstreamReply::Text(text)) => {
            envelope::json(StatusCode::OK, &OutputBody { output: &text })
        }
        Err(err) => err.into_response(),
    }
}

/// Checks run in a fixed order; the first failure ends the request.
async fn relay(state: &AppState, request: Request) -> Result<UpstreamReply, RelayError> {
    let (parts, body) = request.into_parts();

    if parts.method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    if !is_origin_allowed(&parts.headers, &state.config.allowed_origins) {
        tracing::debug!(origin = ?parts.headers.get("origin"), "rejected chat request origin");
        return Err(RelayError::OriginNotAllowed);
    }

    require_json_content_type(&parts.headers)?;
    check_content_length(&parts.headers)?;

    let Some(url) = state.config.upstream_url.as_deref() else {
        tracing::error!("chat upstream URL is not configured");
        return Err(RelayError::NotConfigured);
    };

    // Hard cap on the bytes actually read, whatever Content-Length claimed.
    // Any other read failure leaves an empty body for the lenient parse.
    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) if is_length_limit(&err) => return Err(RelayError::PayloadTooLarge),
        Err(err) => {
            tracing::debug!(error = %err, "failed to read chat request body");
            Bytes::new()
        }
    };

    let chat = validate_chat(&parse_body(&bytes))?;

    state.upstream.forward(url, &chat).await
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}
