//! Record store gateway
//!
//! Five operations against the remote order collection. The store keeps no
//! local cache; reconciliation belongs to the caller.

use async_trait::async_trait;
use shared::OrderAggregate;

use crate::{HttpClient, StoreError};

/// CRUD access to the remote order collection.
///
/// Writes follow last-writer-wins: updates replace the whole record and
/// carry no revision, so the call that completes last determines what is
/// stored. Implementations must not add version checks the remote store
/// does not have.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every stored order, in whatever order the store returns them
    async fn list_all(&self) -> Result<Vec<OrderAggregate>, StoreError>;

    async fn get_one(&self, id: &str) -> Result<OrderAggregate, StoreError>;

    /// Persist a draft; the store assigns the id
    async fn create(&self, draft: &OrderAggregate) -> Result<OrderAggregate, StoreError>;

    /// Replace the stored record with `order` (whole-record replace, not a patch)
    async fn update(&self, id: &str, order: &OrderAggregate) -> Result<OrderAggregate, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// [`RecordStore`] over the REST collection resource
///
/// - `GET /` lists, `GET /{id}` reads
/// - `POST /` creates, `PUT /{id}` replaces
/// - `DELETE /{id}` deletes
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http: HttpClient,
}

impl HttpRecordStore {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_all(&self) -> Result<Vec<OrderAggregate>, StoreError> {
        self.http.get("").await.map_err(StoreError::Fetch)
    }

    async fn get_one(&self, id: &str) -> Result<OrderAggregate, StoreError> {
        self.http
            .get(id)
            .await
            .map_err(|source| StoreError::NotFoundOrFetch {
                id: id.to_string(),
                source,
            })
    }

    async fn create(&self, draft: &OrderAggregate) -> Result<OrderAggregate, StoreError> {
        // Totals and payment normalization are applied right before sending
        let record = draft.persistable()?;
        self.http.post("", &record).await.map_err(StoreError::Create)
    }

    async fn update(&self, id: &str, order: &OrderAggregate) -> Result<OrderAggregate, StoreError> {
        let record = order.persistable()?;
        self.http
            .put(id, &record)
            .await
            .map_err(|source| StoreError::Update {
                id: id.to_string(),
                source,
            })
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.http
            .delete(id)
            .await
            .map_err(|source| StoreError::Delete {
                id: id.to_string(),
                source,
            })
    }
}
