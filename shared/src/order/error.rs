use thiserror::Error;

/// Errors raised while editing an order locally
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("Line item not found: {0}")]
    LineItemNotFound(u32),

    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("{field} exceeds maximum allowed ({max}), got {value}")]
    AmountTooLarge { field: &'static str, value: f64, max: f64 },

    #[error("{field} overflowed")]
    AmountOverflow { field: &'static str },

    #[error("{field} is not a number: {input:?}")]
    InvalidInput { field: &'static str, input: String },
}
