//! Validation errors for operator input.

use circuit_cart_core::{OrderStatus, PriceError};
use thiserror::Error;

/// Operator input rejected before any gateway call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Category is not one of the catalog categories.
    #[error("unknown category: {0}")]
    InvalidCategory(String),

    /// Price did not parse to a non-negative number.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// Stock did not parse to a non-negative whole number.
    #[error("stock must be a whole number of units, got {0:?}")]
    InvalidStock(String),

    /// Discount is not a percentage between 0 and 100.
    #[error("discount must be a percentage between 0 and 100, got {0:?}")]
    InvalidDiscount(String),

    /// Delivery date is not a `YYYY-MM-DD` date.
    #[error("delivery date must be YYYY-MM-DD, got {0:?}")]
    InvalidDeliveryDate(String),

    /// The requested status change leaves the order lifecycle.
    #[error("order cannot move from {from} to {to}")]
    IllegalTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}
