//! Shared HTTP client, SSE parsing, and header helpers.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::HowdahError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = api_key {
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
            headers.insert(AUTHORIZATION, val);
        }
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map a non-success HTTP status to this crate's taxonomy.
pub fn status_to_error(backend: &str, status: u16, body: &str) -> HowdahError {
    match status {
        401 | 403 => HowdahError::Credential(format!(
            "{backend} rejected the credential (status {status}): {body}"
        )),
        _ => HowdahError::sdk(backend, format!("status {status}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sse_data_strips_prefix_and_filters_done() {
        assert_eq!(parse_sse_data("data: {\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(parse_sse_data("data: [DONE]"), None);
        assert_eq!(parse_sse_data(": keepalive"), None);
    }

    #[test]
    fn bearer_headers_omit_authorization_without_key() {
        let headers = bearer_headers(None);
        assert!(headers.get(AUTHORIZATION).is_none());
        let headers = bearer_headers(Some("k"));
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer k");
    }

    #[test]
    fn unauthorized_status_maps_to_credential_error() {
        assert!(status_to_error("toolkit", 401, "nope").is_credential());
        assert!(matches!(
            status_to_error("toolkit", 500, "oops"),
            HowdahError::Sdk { .. }
        ));
    }
}
