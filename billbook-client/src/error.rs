//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level error of a single HTTP call
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Base URL cannot address records
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of one record store operation, classified by operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to fetch orders: {0}")]
    Fetch(#[source] ClientError),

    #[error("Order {id} not found or could not be loaded: {source}")]
    NotFoundOrFetch { id: String, source: ClientError },

    #[error("Failed to create order: {0}")]
    Create(#[source] ClientError),

    #[error("Failed to update order {id}: {source}")]
    Update { id: String, source: ClientError },

    #[error("Failed to delete order {id}: {source}")]
    Delete { id: String, source: ClientError },

    /// The order could not be turned into a record to send
    #[error("Order cannot be persisted: {0}")]
    InvalidRecord(#[from] shared::OrderError),
}

/// Error surfaced by the collection controller
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One or more of a bulk delete's calls failed; the local collection
    /// was left as it was
    #[error("Some orders could not be deleted ({failed} of {total} failed)")]
    PartialBulkDelete { failed: usize, total: usize },

    #[error("Order not in collection: {0}")]
    UnknownOrder(String),

    #[error("Order has not been saved yet")]
    MissingId,

    #[error(transparent)]
    Order(#[from] shared::OrderError),
}
