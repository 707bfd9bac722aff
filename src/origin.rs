// src/origin.rs

use std::collections::HashSet;

use axum::http::{HeaderMap, header};
use reqwest::Url;

/// Normalize to `scheme://host[:port]`, lowercase host, default port elided.
/// Opaque origins (`null`, `file:`) resolve to `None`.
pub fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Protocol the client used to reach us, as far as the proxy headers tell.
pub fn inferred_protocol(host: &str, forwarded_proto: Option<&str>) -> String {
    let host = host.to_ascii_lowercase();
    if host.starts_with("localhost") || host.starts_with("127.0.0.1") {
        return "http".to_string();
    }

    forwarded_proto
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|proto| !proto.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "https".to_string())
}

/// Origin computed from `Host` and the inferred protocol.
pub fn same_origin(host: Option<&str>, forwarded_proto: Option<&str>) -> Option<String> {
    let host = host.map(str::trim).filter(|h| !h.is_empty())?;
    let proto = inferred_protocol(host, forwarded_proto);
    normalize_origin(&format!("{proto}://{host}"))
}

/// Check the request's `Origin` against same-origin and the configured allow-list.
pub fn is_origin_allowed(headers: &HeaderMap, allowed: &HashSet<String>) -> bool {
    let Some(origin) = header_str(headers, header::ORIGIN).and_then(normalize_origin) else {
        return false;
    };

    let own = same_origin(
        header_str(headers, header::HOST),
        header_str(headers, "x-forwarded-proto"),
    );

    own.as_deref() == Some(origin.as_str()) || allowed.contains(&origin)
}

pub(crate) fn header_str<K>(headers: &HeaderMap, key: K) -> Option<&str>
where
    K: header::AsHeaderName,
{
    headers.get(key).and_then(|v| v.to_str().ok())
}
