// src/error.rs
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{message::ErrorBody, routes::envelope};

/// Every way a relay request can end without an upstream reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("Origin not allowed.")]
    OriginNotAllowed,
    #[error("Content-Type must be application/json.")]
    UnsupportedMediaType,
    #[error("Request body too large.")]
    PayloadTooLarge,
    #[error("Chat service is not configured.")]
    NotConfigured,
    #[error("Message is required.")]
    MissingMessage,
    #[error("Message is too long (max 2000 characters).")]
    MessageTooLong,
    #[error("Invalid sessionId.")]
    InvalidSessionId,
    #[error("Chat service returned an error.")]
    BadGateway { status: u16 },
    #[error("Failed to process chat request.")]
    UpstreamFailure,
    #[error("Request timed out. Please try again.")]
    Timeout,
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::OriginNotAllowed => StatusCode::FORBIDDEN,
            RelayError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RelayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::MissingMessage
            | RelayError::MessageTooLong
            | RelayError::InvalidSessionId => StatusCode::BAD_REQUEST,
            RelayError::BadGateway { .. } | RelayError::UpstreamFailure => StatusCode::BAD_GATEWAY,
            RelayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Client-safe diagnostic. Only the upstream status number is ever exposed.
    pub fn detail(&self) -> Option<String> {
        match self {
            RelayError::BadGateway { status } => {
                Some(format!("Upstream responded with status {status}"))
            }
            _ => None,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = ErrorBody {
            error: &message,
            detail: self.detail(),
        };
        let mut response = envelope::json(self.status_code(), &body);

        if self == RelayError::MethodNotAllowed {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_gateway_detail_names_only_the_status() {
        let err = RelayError::BadGateway { status: 500 };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.detail().as_deref(), Some("Upstream responded with status 500"));
    }

    #[test]
    fn client_errors_carry_no_detail() {
        for err in [
            RelayError::MissingMessage,
            RelayError::MessageTooLong,
            RelayError::InvalidSessionId,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(err.detail().is_none());
        }
    }

    #[test]
    fn method_not_allowed_advertises_post() {
        let response = RelayError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
