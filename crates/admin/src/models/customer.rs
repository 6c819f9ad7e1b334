//! Customer profiles and the cart snapshots the storefront saves for them.

use chrono::{DateTime, Utc};
use circuit_cart_core::{Price, UserId};
use serde::{Deserialize, Serialize};

use super::{lenient, lenient_text, null_as_default};

/// Shown in place of a blank display name.
pub const NO_NAME: &str = "No Name Provided";

/// Product data copied into a cart or order line when it was added.
///
/// Every field is optional: the storefront has written several shapes over
/// time and some lines reference products that no longer exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Price>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
}

/// One line of a cart or order: a product snapshot and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient")]
    pub product: Option<ProductSnapshot>,
    pub qty: u32,
}

impl LineItem {
    /// Build a line for `product` at `price`.
    #[must_use]
    pub fn new(name: &str, price: Price, qty: u32) -> Self {
        Self {
            product: Some(ProductSnapshot {
                name: Some(name.to_owned()),
                price: Some(price),
                ..ProductSnapshot::default()
            }),
            qty,
        }
    }

    /// Unit price, zero when the product or its price is missing.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.product
            .as_ref()
            .and_then(|p| p.price)
            .unwrap_or(Price::ZERO)
    }

    /// `unit_price x qty`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price().times(self.qty)
    }

    /// Product name, or a placeholder for lines whose product is gone.
    #[must_use]
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("Unknown product")
    }
}

/// A registered customer joined with their saved cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "uid")]
    pub user_id: UserId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, alias = "displayName", deserialize_with = "lenient_text")]
    pub display_name: Option<String>,
    /// Saved cart; a customer without a cart record has an empty one.
    #[serde(default, alias = "cart", deserialize_with = "null_as_default")]
    pub cart_data: Vec<LineItem>,
    /// Last time the cart was written.
    #[serde(default, alias = "updatedAt", deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Display name, falling back to [`NO_NAME`].
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_NAME)
    }

    /// Whether the cart holds at least one line.
    #[must_use]
    pub fn has_active_cart(&self) -> bool {
        !self.cart_data.is_empty()
    }
}
