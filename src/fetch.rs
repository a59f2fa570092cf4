//! Remote document retrieval.
//!
//! A single blocking GET, optionally authenticated with a bearer token. Any
//! non-success status fails the whole operation.
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("json2sdl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// GET `url` and return the raw body.
pub fn fetch(url: &str, token: Option<&str>, config: &FetchConfig) -> Result<Vec<u8>, FetchError> {
    let client = Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()?;

    let mut request = client.get(url).header(ACCEPT, "application/json");
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    debug!(url, authenticated = token.is_some(), "fetching document");
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
    }
    let body = response.bytes()?;
    debug!(url, bytes = body.len(), "document fetched");
    Ok(body.to_vec())
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_server::serve_once;

    #[test]
    fn sends_bearer_token_and_returns_body() {
        let (url, server) = serve_once("doc.json", "HTTP/1.1 200 OK", r#"{"a":1}"#);
        let body = fetch(&url, Some("s3cret"), &FetchConfig::default()).unwrap();
        assert_eq!(body, br#"{"a":1}"#);
        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.contains("authorization: bearer s3cret"), "{request}");
    }

    #[test]
    fn omits_authorization_without_token() {
        let (url, server) = serve_once("doc.json", "HTTP/1.1 200 OK", "{}");
        fetch(&url, None, &FetchConfig::default()).unwrap();
        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(!request.contains("authorization:"));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (url, server) = serve_once("doc.json", "HTTP/1.1 404 Not Found", "{}");
        let err = fetch(&url, None, &FetchConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        server.join().unwrap();
    }
}
