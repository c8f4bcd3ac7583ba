//! Shared transport handle for the REST adapter family.
//!
//! One [`RestBackend`] owns the reqwest client, endpoint joining, and the
//! session bearer token. The per-port adapters borrow the handle through an
//! [`std::sync::Arc`], so a sign-in performed by the identity adapter is
//! immediately visible to the recipe and blob adapters.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const API_KEY_HEADER: &str = "x-api-key";

/// Connection settings for the hosted REST backend.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestBackendConfig {
    /// Base URL every endpoint path is joined onto. A trailing slash is
    /// added when missing so paths land below the base rather than beside
    /// it.
    pub base_url: Url,
    /// Project API key sent with every request.
    pub api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    /// Session token persisted from an earlier run, if any.
    #[serde(default)]
    pub session_token: Option<String>,
}

fn default_request_timeout_seconds() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

/// Transport handle shared by the REST adapters.
pub struct RestBackend {
    http: Client,
    base_url: Url,
    api_key: String,
    session_token: RwLock<Option<String>>,
}

impl RestBackend {
    /// Build a handle using a reqwest client with the configured timeout.
    ///
    /// ```rust,ignore
    /// let backend = Arc::new(RestBackend::new(config)?);
    /// let gateway = RestIdentityGateway::new(Arc::clone(&backend));
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: RestBackendConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            http,
            base_url: ensure_trailing_slash(config.base_url),
            api_key: config.api_key,
            session_token: RwLock::new(config.session_token),
        })
    }

    /// Base URL endpoint paths are joined onto.
    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replace the bearer token attached to subsequent requests.
    pub(crate) fn set_session_token(&self, token: Option<String>) {
        // The guard wraps a single Option write, so a poisoned lock still
        // holds consistent data.
        *self
            .session_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Bearer token currently attached to requests, if any.
    pub(crate) fn session_token(&self) -> Option<String> {
        self.session_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Absolute URL for an endpoint path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the path cannot be joined onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    /// Request builder carrying the API key and any session bearer token.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.as_str());
        if let Some(token) = self.session_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

fn ensure_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// Status line with a compacted body excerpt, for error messages.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network transport helpers.

    use serde_json::json;

    use super::*;

    fn config() -> RestBackendConfig {
        serde_json::from_value(json!({
            "baseUrl": "https://api.example.com/v1",
            "apiKey": "test-key",
        }))
        .expect("minimal config deserialises")
    }

    #[test]
    fn config_fills_defaults_for_omitted_fields() {
        let config = config();
        assert_eq!(config.request_timeout_seconds, 30);
        assert!(config.session_token.is_none());
    }

    #[test]
    fn base_urls_gain_a_trailing_slash() {
        let base = Url::parse("https://api.example.com/v1").expect("url");
        assert_eq!(ensure_trailing_slash(base).path(), "/v1/");

        let already = Url::parse("https://api.example.com/v1/").expect("url");
        assert_eq!(ensure_trailing_slash(already).path(), "/v1/");
    }

    #[test]
    fn endpoints_join_below_the_base_path() {
        let backend = RestBackend::new(config()).expect("backend builds");
        let url = backend.endpoint("recipes").expect("endpoint joins");
        assert_eq!(url.as_str(), "https://api.example.com/v1/recipes");
    }

    #[test]
    fn session_token_round_trips_and_clears() {
        let backend = RestBackend::new(config()).expect("backend builds");
        assert!(backend.session_token().is_none());

        backend.set_session_token(Some("token-1".into()));
        assert_eq!(backend.session_token().as_deref(), Some("token-1"));

        backend.set_session_token(None);
        assert!(backend.session_token().is_none());
    }

    #[test]
    fn status_messages_compact_and_truncate_bodies() {
        let message = status_message(StatusCode::BAD_GATEWAY, b"upstream\n  unavailable");
        assert_eq!(message, "status 502: upstream unavailable");

        let long = "x".repeat(200);
        let message = status_message(StatusCode::BAD_GATEWAY, long.as_bytes());
        assert!(message.ends_with("..."));

        assert_eq!(status_message(StatusCode::NOT_FOUND, b""), "status 404");
    }
}
