//! Remote data gateway: the single boundary around the backend-as-a-service.
//!
//! The dashboard never talks to the store directly. Everything goes through
//! the [`Gateway`] trait, which has two implementations:
//!
//! - [`RestGateway`] - PostgREST-style tables and RPCs plus federated auth,
//!   with product images delegated to an [`ImageHostClient`]
//! - [`InMemoryGateway`] - a seeded in-process store for demo mode and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use circuit_cart_admin::gateway::{Gateway, RestGateway};
//!
//! let gateway: Arc<dyn Gateway> = Arc::new(RestGateway::new(backend, image_host)?);
//! let inventory = gateway.list_inventory().await?;
//! ```

mod image_host;
mod memory;
mod rest;

pub use image_host::ImageHostClient;
pub use memory::{InMemoryGateway, MemoryProfile};
pub use rest::RestGateway;

use async_trait::async_trait;
use circuit_cart_core::{OrderId, ProductId};
use thiserror::Error;
use url::Url;

use crate::models::{
    FederatedCredential, Identity, InventoryItem, NewInventoryItem, Order, OrderStatusUpdate,
    UserProfile,
};
use crate::session::AuthError;

/// Errors that can occur when talking to the backend store or image host.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Missing or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Image hosting failed or is not configured.
    #[error("Image upload failed: {0}")]
    ImageUpload(String),

    /// Backend could not be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// An image file picked by the operator for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, forwarded to the image host.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Read and write access to the backend store.
///
/// Lists are returned newest first. Implementations do not validate input;
/// callers check operator input before issuing a mutation.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Catalog rows, newest first.
    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, GatewayError>;

    /// Create a catalog row, returning its store-assigned id.
    async fn insert_inventory_item(&self, item: &NewInventoryItem)
    -> Result<ProductId, GatewayError>;

    /// Delete a catalog row. A missing id is [`GatewayError::NotFound`].
    async fn delete_inventory_item(&self, id: &ProductId) -> Result<(), GatewayError>;

    /// Customer profiles joined with their carts; no cart record means an
    /// empty cart.
    async fn list_users_with_carts(&self) -> Result<Vec<UserProfile>, GatewayError>;

    /// Orders, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, GatewayError>;

    /// Set an order's status and delivery date.
    async fn update_order_status(&self, update: &OrderStatusUpdate) -> Result<(), GatewayError>;

    /// Delete an order outright.
    async fn delete_order(&self, id: &OrderId) -> Result<(), GatewayError>;

    /// Upload a product picture to the image host, returning its public URL.
    async fn upload_product_image(&self, image: ImageUpload) -> Result<Url, GatewayError>;

    /// Exchange a federated credential for an authenticated identity.
    async fn sign_in(&self, credential: &FederatedCredential) -> Result<Identity, AuthError>;

    /// Drop the authenticated session.
    async fn sign_out(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::NotFound("order 12".to_string());
        assert_eq!(err.to_string(), "Not found: order 12");

        let err = GatewayError::Api {
            status: 409,
            message: "duplicate key".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 409 - duplicate key");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = GatewayError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
