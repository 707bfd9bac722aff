// src/message.rs
use serde::Serialize;

/// A chat request that passed every validation step. Values are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// What the upstream handed back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// Raw JSON bytes, already checked to parse.
    Json(Vec<u8>),
    /// Non-JSON body, wrapped as `{ "output": ... }` for the client.
    Text(String),
}

#[derive(Debug, Serialize)]
pub struct OutputBody<'a> {
    pub output: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
