//! Newtype IDs for type-safe entity references.
//!
//! Identifiers are assigned by the backend store. Depending on the table or
//! collection they arrive as JSON strings (`"a1b2"`, UUIDs) or as numbers
//! (`42`), so every id is kept as its canonical string form and accepts both
//! encodings on the way in.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string
/// - `Deserialize` from either a JSON string or a JSON integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `From<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use circuit_cart_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("u-1");
/// let order_id = OrderId::from(7);
/// assert_eq!(order_id.as_str(), "7");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from its string form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                $crate::types::id::deserialize_store_id(deserializer).map(Self)
            }
        }
    };
}

/// Raw shapes a store identifier can take on the wire.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Decode a store identifier from a JSON string or integer.
///
/// Used by [`define_id!`]; not meant to be called directly.
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither a string nor an
/// integer.
#[doc(hidden)]
pub fn deserialize_store_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <RawId as serde::Deserialize>::deserialize(deserializer)?;
    Ok(match raw {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(UserId);
define_id!(OrderId);
