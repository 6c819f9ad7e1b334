//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the backend project (not needed in demo mode)
//! - `BACKEND_ANON_KEY` - Project API key sent as `apikey` (not needed in demo mode)
//! - `ADMIN_EMAIL` - The single allow-listed admin address
//!
//! ## Optional
//! - `IMAGE_UPLOAD_URL` - Image host endpoint (default: <https://api.imgbb.com/1/upload>)
//! - `IMAGE_UPLOAD_API_KEY` - Image host API key; uploads are disabled without it
//! - `REFRESH_INTERVAL_SECS` - Polling interval (default: 30)
//! - `NOTIFICATION_TTL_SECS` - Notification auto-dismiss delay (default: 3)
//! - `DASHBOARD_STATE_FILE` - Where the active tab is remembered
//!   (default: `.circuit-cart/state.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use circuit_cart_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_IMAGE_UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";
const DEFAULT_REFRESH_INTERVAL_SECS: &str = "30";
const DEFAULT_NOTIFICATION_TTL_SECS: &str = "3";
const DEFAULT_STATE_FILE: &str = ".circuit-cart/state.json";

/// Admin address used by demo mode when `ADMIN_EMAIL` is unset.
pub const DEMO_ADMIN_EMAIL: &str = "owner@circuitcart.in";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend project; `None` in demo mode.
    pub backend: Option<BackendConfig>,
    /// The only account allowed into the dashboard.
    pub admin_email: Email,
    /// Product image hosting.
    pub image_host: ImageHostConfig,
    /// Delay between background refreshes.
    pub refresh_interval: Duration,
    /// How long a notification stays up.
    pub notification_ttl: Duration,
    /// File remembering the active tab.
    pub state_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

/// Backend project connection.
///
/// Implements `Debug` manually to redact the project key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abcd.supabase.co`
    pub url: Url,
    /// Project API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = parse_url("BACKEND_URL", &get_required_env("BACKEND_URL")?)?;
        let anon_key = get_required_env("BACKEND_ANON_KEY")?;
        // Project keys ship inside public web bundles, so a weak one is only worth a warning.
        if let Err(e) = validate_secret_strength(&anon_key, "BACKEND_ANON_KEY") {
            tracing::warn!("BACKEND_ANON_KEY validation warning: {e}");
        }
        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
        })
    }
}

/// Image host configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ImageHostConfig {
    /// Upload endpoint
    pub upload_url: Url,
    /// API key; `None` disables uploads
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for ImageHostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHostConfig")
            .field("upload_url", &self.upload_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ImageHostConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let upload_url = parse_url(
            "IMAGE_UPLOAD_URL",
            &get_env_or_default("IMAGE_UPLOAD_URL", DEFAULT_IMAGE_UPLOAD_URL),
        )?;
        let api_key = get_optional_env("IMAGE_UPLOAD_API_KEY").map(|key| {
            if let Err(e) = validate_secret_strength(&key, "IMAGE_UPLOAD_API_KEY") {
                tracing::warn!("IMAGE_UPLOAD_API_KEY validation warning: {e}");
            }
            SecretString::from(key)
        });
        Ok(Self {
            upload_url,
            api_key,
        })
    }
}

impl DashboardConfig {
    /// Load configuration for a live backend.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let backend = BackendConfig::from_env()?;
        let admin_email = parse_email("ADMIN_EMAIL", &get_required_env("ADMIN_EMAIL")?)?;
        Self::load(Some(backend), admin_email)
    }

    /// Load configuration for the in-memory demo store.
    ///
    /// Backend variables are ignored and `ADMIN_EMAIL` defaults to
    /// [`DEMO_ADMIN_EMAIL`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional variable is set but invalid.
    pub fn demo_from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let admin_email = parse_email(
            "ADMIN_EMAIL",
            &get_env_or_default("ADMIN_EMAIL", DEMO_ADMIN_EMAIL),
        )?;
        Self::load(None, admin_email)
    }

    fn load(backend: Option<BackendConfig>, admin_email: Email) -> Result<Self, ConfigError> {
        let image_host = ImageHostConfig::from_env()?;
        let refresh_interval = parse_secs(
            "REFRESH_INTERVAL_SECS",
            &get_env_or_default("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS),
        )?;
        let notification_ttl = parse_secs(
            "NOTIFICATION_TTL_SECS",
            &get_env_or_default("NOTIFICATION_TTL_SECS", DEFAULT_NOTIFICATION_TTL_SECS),
        )?;
        let state_file = PathBuf::from(get_env_or_default("DASHBOARD_STATE_FILE", DEFAULT_STATE_FILE));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            backend,
            admin_email,
            image_host,
            refresh_interval,
            notification_ttl,
            state_file,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Defaults for the demo store and tests; reads no environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the default upload URL fails to parse.
    pub fn demo(admin_email: Email) -> Result<Self, ConfigError> {
        Ok(Self {
            backend: None,
            admin_email,
            image_host: ImageHostConfig {
                upload_url: parse_url("IMAGE_UPLOAD_URL", DEFAULT_IMAGE_UPLOAD_URL)?,
                api_key: None,
            },
            refresh_interval: Duration::from_secs(30),
            notification_ttl: Duration::from_secs(3),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        })
    }

    /// Whether the dashboard runs against the in-memory store.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        self.backend.is_none()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating an empty value as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_email(var_name: &str, raw: &str) -> Result<Email, ConfigError> {
    Email::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

/// Parse a whole, non-zero number of seconds.
fn parse_secs(var_name: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string())),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-anon-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("T", "30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_secs("T", " 3 ").unwrap(), Duration::from_secs(3));
        assert!(matches!(parse_secs("T", "0"), Err(ConfigError::InvalidEnvVar(_, _))));
        assert!(matches!(parse_secs("T", "soon"), Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_url_requires_http() {
        assert!(parse_url("BACKEND_URL", "https://abcd.supabase.co").is_ok());
        assert!(parse_url("BACKEND_URL", "ftp://abcd.supabase.co").is_err());
        assert!(parse_url("BACKEND_URL", "abcd.supabase.co").is_err());
    }

    #[test]
    fn test_parse_email_reports_variable() {
        let err = parse_email("ADMIN_EMAIL", "not-an-email").unwrap_err();
        assert!(err.to_string().contains("ADMIN_EMAIL"));
    }

    #[test]
    fn test_demo_defaults() {
        let config = DashboardConfig::demo(Email::parse(DEMO_ADMIN_EMAIL).unwrap()).unwrap();
        assert!(config.is_demo());
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.notification_ttl, Duration::from_secs(3));
        assert_eq!(config.image_host.upload_url.as_str(), DEFAULT_IMAGE_UPLOAD_URL);
    }

    #[test]
    fn test_backend_config_debug_redacts_key() {
        let config = BackendConfig {
            url: Url::parse("https://abcd.supabase.co").unwrap(),
            anon_key: SecretString::from("super_secret_anon_key"),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abcd.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
    }

    #[test]
    fn test_image_host_config_debug_redacts_key() {
        let config = ImageHostConfig {
            upload_url: Url::parse(DEFAULT_IMAGE_UPLOAD_URL).unwrap(),
            api_key: Some(SecretString::from("imgbb_secret_key")),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api.imgbb.com"));
        assert!(!debug_output.contains("imgbb_secret_key"));
    }
}
