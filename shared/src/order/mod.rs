//! Order aggregate, line items and payment rules

mod aggregate;
mod error;
mod line_item;
pub mod payment;
pub mod stats;
mod wire;

pub use aggregate::{OrderAggregate, OrderBuilder, UNNAMED_CLIENT};
pub use error::OrderError;
pub use line_item::{LineItem, LineItemField};
pub use payment::{BillMode, PaymentStatus};
pub use stats::{OrderStats, StatusFilter, aggregate_stats, filter_by_status, sort_newest_first};
