//! Product image hosting.
//!
//! Uploads go to an ImgBB-compatible endpoint as `multipart/form-data` with
//! two parts, `key` (the API key) and `image` (the file). The host answers
//! with `{"success": true, "data": {"url": "..."}}`.

use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{GatewayError, ImageUpload};
use crate::config::ImageHostConfig;

/// Client for the third-party image host.
#[derive(Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    upload_url: Url,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadFailure>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadFailure {
    message: Option<String>,
}

impl ImageHostClient {
    /// Create a client for the configured upload endpoint.
    #[must_use]
    pub fn new(config: &ImageHostConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Whether uploads can be attempted at all.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Upload an image and return its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ImageUpload`] if no API key is configured, the
    /// file is empty, or the host reports a failure.
    #[instrument(skip(self, image), fields(file_name = %image.file_name))]
    pub async fn upload(&self, image: ImageUpload) -> Result<Url, GatewayError> {
        let Some(api_key) = &self.api_key else {
            return Err(GatewayError::ImageUpload(
                "IMAGE_UPLOAD_API_KEY is not set".to_string(),
            ));
        };
        if image.bytes.is_empty() {
            return Err(GatewayError::ImageUpload(format!(
                "{} is empty",
                image.file_name
            )));
        }

        let form = Form::new()
            .text("key", api_key.expose_secret().to_owned())
            .part("image", Part::bytes(image.bytes).file_name(image.file_name));

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let url = parse_upload_response(&body).map_err(|message| {
            if status.is_success() {
                GatewayError::ImageUpload(message)
            } else {
                GatewayError::ImageUpload(format!("{}: {message}", status.as_u16()))
            }
        })?;

        tracing::debug!(url = %url, "Image uploaded");
        Ok(url)
    }
}

impl std::fmt::Debug for ImageHostClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHostClient")
            .field("upload_url", &self.upload_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Extract the hosted URL from an upload response body.
fn parse_upload_response(body: &str) -> Result<Url, String> {
    let parsed: UploadResponse =
        serde_json::from_str(body).map_err(|e| format!("unexpected response: {e}"))?;

    if !parsed.success {
        return Err(parsed
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "host reported failure".to_string()));
    }

    let data = parsed
        .data
        .ok_or_else(|| "response has no data".to_string())?;
    Url::parse(&data.url).map_err(|e| format!("host returned invalid URL {}: {e}", data.url))
}
