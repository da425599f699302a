//! Client configuration

use shared::Session;

use crate::{ClientResult, HttpClient, HttpRecordStore};

/// Default collection resource URL
pub const DEFAULT_API_URL: &str = "http://localhost:3000/orders";

/// Client configuration for connecting to the record store
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BILLBOOK_API_URL | http://localhost:3000/orders | Order collection resource URL |
/// | BILLBOOK_TIMEOUT_SECS | 30 | Request timeout (seconds) |
/// | BILLBOOK_DELETE_CONCURRENCY | unset | Max deletes in flight during bulk delete |
/// | BILLBOOK_SESSION_TOKEN | unset | Marks the session as logged in |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Collection resource URL (e.g., "https://example.mockapi.io/orders")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Bulk delete fan-out cap; `None` fires every delete at once
    pub delete_concurrency: Option<usize>,

    /// Login token; only its presence is checked
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            delete_concurrency: None,
            token: None,
        }
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BILLBOOK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            timeout: std::env::var("BILLBOOK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            delete_concurrency: std::env::var("BILLBOOK_DELETE_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0),
            token: std::env::var("BILLBOOK_SESSION_TOKEN").ok(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Cap concurrent deletes during bulk delete
    pub fn with_delete_concurrency(mut self, limit: Option<usize>) -> Self {
        self.delete_concurrency = limit.filter(|n| *n > 0);
        self
    }

    /// Set the login token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Session derived from the configured token
    pub fn session(&self) -> Session {
        Session::from_token(self.token.as_deref())
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }

    /// Create a record store client from this configuration
    pub fn build_record_store(&self) -> ClientResult<HttpRecordStore> {
        Ok(HttpRecordStore::new(self.build_http_client()?))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
