//! Orders placed through the storefront and the status updates the operator
//! can apply to them.

use chrono::{DateTime, NaiveDate, Utc};
use circuit_cart_core::{OrderId, OrderStatus, Price, UserId};
use serde::{Deserialize, Serialize};

use super::{LineItem, ValidationError, lenient, lenient_text, null_as_default};

/// Shipping and payment details captured at checkout.
///
/// Immutable from the admin surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pincode: Option<String>,
    /// Payment transaction reference typed in by the customer (unverified).
    #[serde(default, deserialize_with = "lenient_text")]
    pub utr: Option<String>,
    /// Uploaded payment receipt.
    #[serde(default, deserialize_with = "lenient_text")]
    pub receipt_url: Option<String>,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<Price>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_info: CustomerInfo,
}

impl Order {
    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.qty).sum()
    }

    /// Recorded total, zero when the store has none.
    #[must_use]
    pub fn total_or_zero(&self) -> Price {
        self.total.unwrap_or(Price::ZERO)
    }

    /// Apply a status update to the local copy.
    pub fn apply(&mut self, update: &OrderStatusUpdate) {
        self.status = update.new_status;
        self.delivery_date = update.new_date;
    }
}

/// Arguments of the `update_order_status` call.
///
/// The delivery date is normalized on construction: a blank entry becomes
/// `None` and is sent as JSON `null`, never as `""`, which the backend
/// rejects as a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatusUpdate {
    pub target_id: OrderId,
    pub new_status: OrderStatus,
    pub new_date: Option<NaiveDate>,
}

impl OrderStatusUpdate {
    /// Build an update from the raw date field of the manifest form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDeliveryDate`] if a non-blank date is
    /// not `YYYY-MM-DD`.
    pub fn new(
        target_id: OrderId,
        new_status: OrderStatus,
        raw_date: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let new_date = match raw_date.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| ValidationError::InvalidDeliveryDate(raw.to_owned()))?,
            ),
        };

        Ok(Self {
            target_id,
            new_status,
            new_date,
        })
    }
}
