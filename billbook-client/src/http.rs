//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// JSON-over-HTTP client rooted at one collection resource URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self { client, base_url })
    }

    /// Collection resource URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// URL of one record, or of the collection when `id` is empty.
    ///
    /// The id is pushed as a single percent-encoded path segment.
    pub fn url(&self, id: &str) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        if id.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> ClientResult<T> {
        let url = self.url(id)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, id: &str, body: &B) -> ClientResult<T> {
        let url = self.url(id)?;
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, id: &str, body: &B) -> ClientResult<T> {
        let url = self.url(id)?;
        tracing::debug!(%url, "PUT");
        let response = self.client.put(url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request; any response body is ignored
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let url = self.url(id)?;
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(url).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Map non-success statuses to errors
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
            _ => Err(ClientError::Status { status, body: text }),
        }
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ClientError::InvalidResponse("empty body".to_string()));
        }
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}
