//! Catalog rows and the operator form that creates them.

use chrono::{DateTime, Utc};
use circuit_cart_core::{Category, Price, ProductId};
use serde::{Deserialize, Serialize};

use super::{ValidationError, lenient, lenient_text, null_as_default};

/// A product row in the live catalog.
///
/// Items are only ever created or deleted ("scrapped"); there is no edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Store-assigned identifier.
    pub id: ProductId,
    /// Product name, e.g. "Arduino Uno R3".
    pub name: String,
    /// Catalog category.
    pub category: Category,
    /// Unit price in rupees.
    pub price: Price,
    /// Units on hand.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock: u32,
    /// Hosted image URL, empty when the product has no picture.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    /// Short description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
    /// Discount percentage, string-encoded as stored.
    #[serde(default, deserialize_with = "lenient_text")]
    pub discount: Option<String>,
    /// Creation timestamp assigned by the store.
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Local copy of a row the store just accepted, used until the next
    /// refresh replaces it.
    #[must_use]
    pub fn from_insert(id: ProductId, item: NewInventoryItem) -> Self {
        Self {
            id,
            name: item.name,
            category: item.category,
            price: item.price,
            stock: item.stock,
            image: item.image,
            desc: item.desc,
            discount: item.discount,
            created_at: Some(Utc::now()),
        }
    }

    /// Discount rendered for the catalog table, e.g. `-20% OFF`.
    #[must_use]
    pub fn discount_label(&self) -> Option<String> {
        self.discount
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!("-{d}% OFF"))
    }
}

/// Insert payload for a new catalog row.
///
/// Built only through [`ProductDraft::validate`], so every value in here has
/// already been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: Category,
    pub price: Price,
    pub stock: u32,
    pub image: String,
    pub desc: String,
    pub discount: Option<String>,
}

/// Raw "Add New Component" form input, exactly as the operator typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: String,
    /// Manually entered image URL; also the fallback when an upload fails.
    pub image_url: String,
    pub desc: String,
    pub discount: String,
}

impl ProductDraft {
    /// Check the form and turn it into an insert payload.
    ///
    /// `image` is the URL that will be stored (an uploaded image or the
    /// manual fallback); pass an empty string for no picture.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for the first field that fails: name and
    /// category are required, price must be a non-negative decimal, stock a
    /// non-negative whole number, and discount (optional) a percentage.
    pub fn validate(&self, image: String) -> Result<NewInventoryItem, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        let category: Category = category
            .parse()
            .map_err(|_| ValidationError::InvalidCategory(category.to_owned()))?;

        let price = Price::parse(&self.price)?;

        let stock = self.stock.trim();
        let stock: u32 = stock
            .parse()
            .map_err(|_| ValidationError::InvalidStock(stock.to_owned()))?;

        let discount = match self.discount.trim() {
            "" => None,
            raw => Some(
                parse_discount(raw)
                    .ok_or_else(|| ValidationError::InvalidDiscount(raw.to_owned()))?,
            ),
        };

        Ok(NewInventoryItem {
            name: name.to_owned(),
            category,
            price,
            stock,
            image,
            desc: self.desc.trim().to_owned(),
            discount,
        })
    }
}

/// Accept a percentage in `0..=100`, returning it unchanged as text.
fn parse_discount(raw: &str) -> Option<String> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && (0.0..=100.0).contains(&value)).then(|| raw.to_owned())
}
