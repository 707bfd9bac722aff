// src/services/upstream.rs
use std::{fmt::Debug, time::Duration};

use reqwest::{StatusCode, header::CONTENT_TYPE};
use serde::de::IgnoredAny;
use thiserror::Error;

use crate::{
    config::RelayConfig,
    error::RelayError,
    message::{ChatRequest, UpstreamReply},
};

/// Header carrying the shared secret to the automation webhook.
pub const SECRET_HEADER: &str = "x-webhook-secret";
/// Upstream error bodies are cut to this many characters before logging.
pub const LOG_BODY_LIMIT: usize = 500;

#[derive(Debug, Error)]
enum ExchangeError {
    #[error("upstream responded with {status}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("upstream sent invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Outbound side of the relay. One per process, cheap to share.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    secret: Option<String>,
    timeout: Duration,
}

impl Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("has_secret", &self.secret.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl UpstreamClient {
    pub fn from_config(config: &RelayConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            secret: config.upstream_secret.clone(),
            timeout: config.upstream_timeout,
        })
    }

    /// POST the request upstream and normalize the outcome.
    ///
    /// The whole exchange runs under the timeout. On expiry the exchange
    /// future is dropped, which aborts the connection along with it.
    pub async fn forward(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> Result<UpstreamReply, RelayError> {
        let outcome = tokio::time::timeout(self.timeout, self.exchange(url, request)).await;

        match outcome {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(ExchangeError::Status { status, body })) => {
                tracing::error!(
                    status = status.as_u16(),
                    body = %truncate(&body, LOG_BODY_LIMIT),
                    "chat upstream returned non-success status"
                );
                Err(RelayError::BadGateway {
                    status: status.as_u16(),
                })
            }
            Ok(Err(ExchangeError::Http(err))) if err.is_timeout() => {
                tracing::error!(error = ?err, "chat upstream request timed out");
                Err(RelayError::Timeout)
            }
            Ok(Err(err)) => {
                tracing::error!(error = ?err, "chat upstream request failed");
                Err(RelayError::UpstreamFailure)
            }
            Err(elapsed) => {
                tracing::error!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    error = %elapsed,
                    "chat upstream request cancelled after timeout"
                );
                Err(RelayError::Timeout)
            }
        }
    }

    async fn exchange(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> Result<UpstreamReply, ExchangeError> {
        let mut builder = self.http.post(url).json(request);
        if let Some(secret) = &self.secret {
            builder = builder.header(SECRET_HEADER, secret);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status { status, body });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if is_json {
            let bytes = response.bytes().await?;
            serde_json::from_slice::<IgnoredAny>(&bytes)?;
            Ok(UpstreamReply::Json(bytes.to_vec()))
        } else {
            Ok(UpstreamReply::Text(response.text().await?))
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
