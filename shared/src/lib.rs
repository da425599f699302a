//! Shared types for Billbook
//!
//! Order domain model (line items, order aggregate, payment rules),
//! money arithmetic and the session gate. No I/O lives here.

pub mod money;
pub mod order;
pub mod session;
pub mod util;

// Re-exports
pub use order::{
    BillMode, LineItem, LineItemField, OrderAggregate, OrderError, OrderStats, PaymentStatus,
    StatusFilter,
};
pub use session::{Session, SessionError};
