//! Integration tests for the Circuit Cart admin dashboard.
//!
//! Every scenario drives a real [`Dashboard`] against the seeded
//! [`InMemoryGateway`], so no backend or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p circuit-cart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use circuit_cart_admin::config::DashboardConfig;
use circuit_cart_admin::dashboard::{AssumeYes, ConfirmPrompt, Dashboard, FileTabStore};
use circuit_cart_admin::gateway::InMemoryGateway;
use circuit_cart_admin::models::Identity;
use circuit_cart_core::Email;
use tempfile::TempDir;

/// The allow-listed admin used throughout the tests.
pub const ADMIN_EMAIL: &str = "owner@circuitcart.in";

/// A dashboard wired to an in-memory store and a throwaway state file.
pub struct TestContext {
    pub gateway: Arc<InMemoryGateway>,
    pub dashboard: Arc<Dashboard>,
    pub state_file: PathBuf,
    _state_dir: TempDir,
}

impl TestContext {
    /// Seeded store, prompts answered yes, not signed in.
    ///
    /// # Panics
    ///
    /// Panics if the temporary state directory cannot be created.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with(InMemoryGateway::seeded(), Box::new(AssumeYes))
    }

    /// Context over `gateway` with a custom confirmation prompt.
    ///
    /// # Panics
    ///
    /// Panics if the temporary state directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with(gateway: InMemoryGateway, prompt: Box<dyn ConfirmPrompt>) -> Self {
        let state_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let state_file = state_dir.path().join("state.json");
        let gateway = Arc::new(gateway);
        let dashboard = build_dashboard(&gateway, &state_file, prompt);
        Self {
            gateway,
            dashboard,
            state_file,
            _state_dir: state_dir,
        }
    }

    /// Seeded context already signed in as the admin.
    ///
    /// # Panics
    ///
    /// Panics if authorization fails.
    #[allow(clippy::expect_used)]
    pub async fn signed_in() -> Self {
        let ctx = Self::seeded();
        ctx.dashboard
            .authorize(Some(admin()))
            .await
            .expect("admin should be authorized");
        ctx
    }

    /// A fresh dashboard over the same store and state file, as after a
    /// restart.
    #[must_use]
    pub fn reopen(&self) -> Arc<Dashboard> {
        build_dashboard(&self.gateway, &self.state_file, Box::new(AssumeYes))
    }
}

/// The admin identity.
#[must_use]
pub fn admin() -> Identity {
    Identity::with_email("google-admin", ADMIN_EMAIL)
}

/// Serialized form of a collection, for exact before/after comparisons.
///
/// # Panics
///
/// Panics if the rows cannot be serialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn bytes_of<T: serde::Serialize>(rows: &[T]) -> Vec<u8> {
    serde_json::to_vec(rows).expect("rows serialize")
}

#[allow(clippy::expect_used)]
fn build_dashboard(
    gateway: &Arc<InMemoryGateway>,
    state_file: &std::path::Path,
    prompt: Box<dyn ConfirmPrompt>,
) -> Arc<Dashboard> {
    let email = Email::parse(ADMIN_EMAIL).expect("valid admin email");
    let mut config = DashboardConfig::demo(email).expect("demo config");
    config.state_file = state_file.to_path_buf();
    Dashboard::new(
        Arc::clone(gateway) as Arc<dyn circuit_cart_admin::gateway::Gateway>,
        &config,
        Box::new(FileTabStore::new(&config.state_file)),
        prompt,
    )
}
