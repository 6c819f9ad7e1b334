//! Unified error handling for the dashboard.

use thiserror::Error;

use crate::config::ConfigError;
use crate::dashboard::TabStoreError;
use crate::gateway::GatewayError;
use crate::models::{Identity, ValidationError};
use crate::session::AuthError;

/// Error type returned by dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Backend or image host failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Sign-in failed or the session is not authorized.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Operator input was rejected before reaching the backend.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The active tab could not be remembered.
    #[error(transparent)]
    TabStore(#[from] TabStoreError),

    /// The referenced entity is not in the current view.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DashboardError {
    /// Log the error and send backend failures to Sentry.
    ///
    /// Operator mistakes (validation, refused sign-in) are only logged.
    pub fn report(&self, action: &str) {
        if matches!(self, Self::Gateway(_) | Self::TabStore(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                action,
                sentry_event_id = %event_id,
                "Dashboard operation failed"
            );
        } else {
            tracing::warn!(error = %self, action, "Dashboard operation refused");
        }
    }
}

/// Set the Sentry user context from the admin identity.
pub fn set_sentry_user(identity: &Identity) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity.uid.clone()),
            email: identity.email.clone(),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
