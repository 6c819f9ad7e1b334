//! Domain models for the admin dashboard.
//!
//! Rows coming back from the backend store are produced by other
//! applications (the storefront writes carts and orders), so decoding is
//! null-safe throughout: optional fields fall back to "absent", and a row
//! whose required fields (id, name, category, price, status) cannot be read
//! is skipped by [`decode_rows`] instead of failing the whole list.

pub mod customer;
pub mod inventory;
pub mod order;
pub mod session;
pub mod validation;

pub use customer::{LineItem, ProductSnapshot, UserProfile};
pub use inventory::{InventoryItem, NewInventoryItem, ProductDraft};
pub use order::{CustomerInfo, Order, OrderStatusUpdate};
pub use session::{FederatedCredential, Identity};
pub use validation::ValidationError;

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

/// Decode a list fetched from the store one row at a time.
///
/// Rows that do not decode are logged and dropped so the rest of the list
/// still shows.
pub fn decode_rows<T: DeserializeOwned>(
    collection: &'static str,
    rows: Vec<serde_json::Value>,
) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(collection, index, error = %e, "Skipping malformed row");
                None
            }
        })
        .collect();
    if decoded.len() < total {
        tracing::warn!(
            collection,
            skipped = total - decoded.len(),
            total,
            "Some rows could not be decoded"
        );
    }
    decoded
}

/// Decode a field that may be `null`, treating `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a field that may be `null`, missing, or malformed.
///
/// Anything that does not decode as `T` becomes `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Decode a free-form text field that some writers store as a number.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
