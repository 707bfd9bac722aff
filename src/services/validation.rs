// src/services/validation.rs
use axum::http::{HeaderMap, header};
use serde_json::Value;

use crate::{error::RelayError, message::ChatRequest, origin::header_str};

pub const MAX_BODY_BYTES: usize = 10_000;
pub const MAX_MESSAGE_CHARS: usize = 2_000;
pub const SESSION_ID_MIN: usize = 8;
pub const SESSION_ID_MAX: usize = 128;

pub fn require_json_content_type(headers: &HeaderMap) -> Result<(), RelayError> {
    let is_json = header_str(headers, header::CONTENT_TYPE)
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        Ok(())
    } else {
        Err(RelayError::UnsupportedMediaType)
    }
}

/// Fast-path size check on the declared length. Unparseable or non-finite values are ignored.
pub fn check_content_length(headers: &HeaderMap) -> Result<(), RelayError> {
    let declared = header_str(headers, header::CONTENT_LENGTH)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|len| len.is_finite());

    match declared {
        Some(len) if len > MAX_BODY_BYTES as f64 => Err(RelayError::PayloadTooLarge),
        _ => Ok(()),
    }
}

/// Lenient parse: anything that isn't valid JSON counts as an empty object.
pub fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Default::default()))
}

pub fn validate_chat(body: &Value) -> Result<ChatRequest, RelayError> {
    let message = trimmed_str(body, "message");
    if message.is_empty() {
        return Err(RelayError::MissingMessage);
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(RelayError::MessageTooLong);
    }

    let session_id = trimmed_str(body, "sessionId");
    if !is_valid_session_id(session_id) {
        return Err(RelayError::InvalidSessionId);
    }

    Ok(ChatRequest {
        message: message.to_string(),
        session_id: session_id.to_string(),
    })
}

/// `^[A-Za-z0-9_-]{8,128}$`
pub fn is_valid_session_id(id: &str) -> bool {
    (SESSION_ID_MIN..=SESSION_ID_MAX).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn trimmed_str<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim_matches(is_trimmable)
}

/// Whitespace plus the byte-order mark, which `str::trim` keeps.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}
