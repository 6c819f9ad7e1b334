//! PostgREST-style backend client.
//!
//! # API Reference
//!
//! - Tables: `{base}/rest/v1/inventory`, `{base}/rest/v1/orders`
//! - RPCs: `{base}/rest/v1/rpc/get_all_users_and_carts`,
//!   `{base}/rest/v1/rpc/update_order_status`
//! - Auth: `{base}/auth/v1/token?grant_type=id_token`, `{base}/auth/v1/logout`
//! - Authentication: project key in the `apikey` header, plus
//!   `Authorization: Bearer <session token or project key>`

use std::sync::Arc;

use async_trait::async_trait;
use circuit_cart_core::{OrderId, ProductId};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use super::{Gateway, GatewayError, ImageHostClient, ImageUpload};
use crate::config::BackendConfig;
use crate::models::{
    FederatedCredential, Identity, InventoryItem, NewInventoryItem, Order, OrderStatusUpdate,
    UserProfile, decode_rows,
};
use crate::session::AuthError;

/// Ask PostgREST to echo affected rows back.
const RETURN_REPRESENTATION: &str = "return=representation";

/// Backend client for the hosted Postgres API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session
/// token.
#[derive(Clone)]
pub struct RestGateway {
    inner: Arc<RestGatewayInner>,
}

struct RestGatewayInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
    /// Session token from the last successful sign-in.
    access_token: RwLock<Option<SecretString>>,
    images: Option<ImageHostClient>,
}

/// Row returned by an insert with `return=representation`.
#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: ProductId,
}

/// Body of the id-token grant.
#[derive(Serialize)]
struct IdTokenGrant<'a> {
    provider: &'a str,
    id_token: &'a str,
}

/// Session returned by the auth endpoint.
#[derive(Debug, Deserialize)]
struct AuthSession {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: AuthUserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AuthUserMetadata {
    full_name: Option<String>,
}

/// Error body produced by PostgREST and the auth server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "msg", alias = "error_description")]
    message: Option<String>,
}

impl RestGateway {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the project key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(
        config: &BackendConfig,
        images: Option<ImageHostClient>,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| GatewayError::Parse(format!("Invalid project key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestGatewayInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_owned(),
                anon_key: config.anon_key.clone(),
                access_token: RwLock::new(None),
                images,
            }),
        })
    }

    /// Whether a session token is cached.
    pub async fn has_session(&self) -> bool {
        self.inner.access_token.read().await.is_some()
    }

    /// Build `{base}{path}` with optional query pairs.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&format!("{}{path}", self.inner.base_url))
            .map_err(|e| GatewayError::Parse(format!("Invalid endpoint {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Bearer value: the session token when signed in, the project key otherwise.
    async fn bearer(&self) -> String {
        self.inner.access_token.read().await.as_ref().map_or_else(
            || self.inner.anon_key.expose_secret().to_owned(),
            |token| token.expose_secret().to_owned(),
        )
    }

    /// Execute a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.bearer().await)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a POST request with a JSON body and decode the JSON response.
    async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
        prefer: Option<&'static str>,
    ) -> Result<T, GatewayError> {
        let mut request = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.bearer().await)
            .json(body);
        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        handle_response(request.send().await?).await
    }

    /// Execute a DELETE filtered on `id`, failing if no row matched.
    async fn delete_by_id(&self, table: &str, id: &str) -> Result<(), GatewayError> {
        let filter = format!("eq.{id}");
        let url = self.endpoint(&format!("/rest/v1/{table}"), &[("id", &filter)])?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(self.bearer().await)
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;

        let deleted: Vec<serde_json::Value> = handle_response(response).await?;
        if deleted.is_empty() {
            return Err(GatewayError::NotFound(format!("{table} row {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for RestGateway {
    #[instrument(skip(self))]
    async fn list_inventory(&self) -> Result<Vec<InventoryItem>, GatewayError> {
        let url = self.endpoint(
            "/rest/v1/inventory",
            &[("select", "*"), ("order", "created_at.desc")],
        )?;
        let rows: Vec<serde_json::Value> = self.get(url).await?;
        Ok(decode_rows("inventory", rows))
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn insert_inventory_item(
        &self,
        item: &NewInventoryItem,
    ) -> Result<ProductId, GatewayError> {
        let url = self.endpoint("/rest/v1/inventory", &[])?;
        let rows: Vec<InsertedRow> = self
            .post(url, std::slice::from_ref(item), Some(RETURN_REPRESENTATION))
            .await?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| GatewayError::Parse("Insert returned no row".to_string()))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_inventory_item(&self, id: &ProductId) -> Result<(), GatewayError> {
        self.delete_by_id("inventory", id.as_str()).await
    }

    #[instrument(skip(self))]
    async fn list_users_with_carts(&self) -> Result<Vec<UserProfile>, GatewayError> {
        let url = self.endpoint("/rest/v1/rpc/get_all_users_and_carts", &[])?;
        let rows: Option<Vec<serde_json::Value>> =
            self.post(url, &serde_json::json!({}), None).await?;
        Ok(decode_rows("users", rows.unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, GatewayError> {
        let url = self.endpoint(
            "/rest/v1/orders",
            &[("select", "*"), ("order", "created_at.desc")],
        )?;
        let rows: Vec<serde_json::Value> = self.get(url).await?;
        Ok(decode_rows("orders", rows))
    }

    #[instrument(skip(self, update), fields(order_id = %update.target_id, status = %update.new_status))]
    async fn update_order_status(&self, update: &OrderStatusUpdate) -> Result<(), GatewayError> {
        let url = self.endpoint("/rest/v1/rpc/update_order_status", &[])?;
        // A void RPC answers with an empty body or `null`.
        let _: Option<serde_json::Value> = self.post(url, update, None).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn delete_order(&self, id: &OrderId) -> Result<(), GatewayError> {
        self.delete_by_id("orders", id.as_str()).await
    }

    #[instrument(skip(self, image), fields(file_name = %image.file_name, bytes = image.bytes.len()))]
    async fn upload_product_image(&self, image: ImageUpload) -> Result<Url, GatewayError> {
        match &self.inner.images {
            Some(images) => images.upload(image).await,
            None => Err(GatewayError::ImageUpload(
                "image hosting is not configured".to_string(),
            )),
        }
    }

    #[instrument(skip(self, credential), fields(provider = %credential.provider))]
    async fn sign_in(&self, credential: &FederatedCredential) -> Result<Identity, AuthError> {
        let id_token = credential.id_token.expose_secret();
        if id_token.trim().is_empty() {
            return Err(AuthError::Cancelled);
        }

        let url = self
            .endpoint("/auth/v1/token", &[("grant_type", "id_token")])
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        let grant = IdTokenGrant {
            provider: &credential.provider,
            id_token,
        };
        let session: AuthSession = self
            .post(url, &grant, None)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        *self.inner.access_token.write().await = Some(SecretString::from(session.access_token));

        Ok(Identity {
            uid: session.user.id,
            email: session.user.email,
            display_name: session.user.user_metadata.full_name,
        })
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) {
        let Some(token) = self.inner.access_token.write().await.take() else {
            return;
        };

        let result = match self.endpoint("/auth/v1/logout", &[]) {
            Ok(url) => self
                .inner
                .client
                .post(url)
                .bearer_auth(token.expose_secret())
                .send()
                .await
                .map_err(GatewayError::from),
            Err(e) => Err(e),
        };
        // The local token is gone either way; a failed revoke only matters server-side.
        if let Err(e) = result {
            tracing::warn!(error = %e, "Session revoke failed");
        }
    }
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway")
            .field("base_url", &self.inner.base_url)
            .field("images", &self.inner.images)
            .finish_non_exhaustive()
    }
}

/// Decode a successful response, or map the failure status.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    if !response.status().is_success() {
        return Err(parse_error(response).await);
    }

    let body = response.text().await?;
    // Void RPCs and `return=minimal` writes answer 204 with no body.
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    serde_json::from_str(body)
        .map_err(|e| GatewayError::Parse(format!("Failed to parse response: {e}")))
}

/// Map an error response to a [`GatewayError`].
async fn parse_error(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return GatewayError::RateLimited(retry_after);
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = error_message(&text);

    match status {
        401 | 403 => GatewayError::Unauthorized(message),
        404 => GatewayError::NotFound(message),
        _ => GatewayError::Api { status, message },
    }
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gateway() -> RestGateway {
        let config = BackendConfig {
            url: Url::parse("https://demo-project.supabase.co/").unwrap(),
            anon_key: SecretString::from("eyJhbGciOiJIUzI1NiJ9.anon"),
        };
        RestGateway::new(&config, None).unwrap()
    }

    #[test]
    fn test_endpoint_with_filters() {
        let url = gateway()
            .endpoint("/rest/v1/inventory", &[("id", "eq.42")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo-project.supabase.co/rest/v1/inventory?id=eq.42"
        );
    }

    #[test]
    fn test_endpoint_orders_newest_first() {
        let url = gateway()
            .endpoint(
                "/rest/v1/orders",
                &[("select", "*"), ("order", "created_at.desc")],
            )
            .unwrap();
        assert_eq!(url.query(), Some("select=*&order=created_at.desc"));
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"code":"22007","message":"invalid input syntax for type date: \"\""}"#),
            "invalid input syntax for type date: \"\""
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Bad ID token"}"#),
            "Bad ID token"
        );
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }

    #[tokio::test]
    async fn test_blank_id_token_is_cancellation() {
        let result = gateway()
            .sign_in(&FederatedCredential::new("google", "  "))
            .await;
        assert!(matches!(result, Err(AuthError::Cancelled)));
    }

    #[tokio::test]
    async fn test_upload_without_image_host_fails() {
        let image = ImageUpload {
            file_name: "uno.png".to_string(),
            bytes: vec![0x89, 0x50],
        };
        let result = gateway().upload_product_image(image).await;
        assert!(matches!(result, Err(GatewayError::ImageUpload(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let output = format!("{:?}", gateway());
        assert!(output.contains("demo-project.supabase.co"));
        assert!(!output.contains("anon"));
    }
}
