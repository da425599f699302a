//! Billbook Client - record store client for client orders
//!
//! Provides the HTTP gateway to the remote order collection and the
//! controller that keeps a local copy of that collection in sync.

pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod store;

pub use config::ClientConfig;
pub use controller::OrderCollectionController;
pub use error::{ClientError, ClientResult, StoreError, SyncError};
pub use http::HttpClient;
pub use store::{HttpRecordStore, RecordStore};

// Re-export shared types for convenience
pub use shared::order::{
    BillMode, LineItem, LineItemField, OrderAggregate, OrderStats, PaymentStatus, StatusFilter,
};
