//! CLI command implementations.

pub mod customers;
pub mod inventory;
pub mod orders;
mod prompt;
mod render;

use std::io::Write;
use std::sync::Arc;

use circuit_cart_admin::Outcome;
use circuit_cart_admin::config::DashboardConfig;
use circuit_cart_admin::dashboard::{AssumeYes, ConfirmPrompt, Dashboard, FileTabStore, NotificationKind, Tab};
use circuit_cart_admin::gateway::{Gateway, ImageHostClient, InMemoryGateway, RestGateway};
use circuit_cart_admin::models::FederatedCredential;

use prompt::StdinPrompt;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// A signed-in dashboard for the duration of one command.
pub struct Session {
    dashboard: Arc<Dashboard>,
}

impl Session {
    /// Load config, build the gateway and sign in as the admin.
    pub async fn open(demo: bool, yes: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let config = if demo {
            DashboardConfig::demo_from_env()?
        } else {
            DashboardConfig::from_env()?
        };

        let (gateway, credential): (Arc<dyn Gateway>, FederatedCredential) =
            match &config.backend {
                Some(backend) => {
                    let images = ImageHostClient::new(&config.image_host);
                    let token = std::env::var("ADMIN_ID_TOKEN")
                        .map_err(|_| "ADMIN_ID_TOKEN is required outside --demo")?;
                    let provider = std::env::var("ADMIN_ID_PROVIDER")
                        .unwrap_or_else(|_| "google".to_string());
                    (
                        Arc::new(RestGateway::new(backend, Some(images))?),
                        FederatedCredential::new(provider, token),
                    )
                }
                None => (
                    Arc::new(InMemoryGateway::seeded()),
                    FederatedCredential::new("demo", config.admin_email.as_str()),
                ),
            };

        let prompt: Box<dyn ConfirmPrompt> = if yes {
            Box::new(AssumeYes)
        } else {
            Box::new(StdinPrompt)
        };

        let dashboard = Dashboard::new(
            gateway,
            &config,
            Box::new(FileTabStore::new(&config.state_file)),
            prompt,
        );
        dashboard.sign_in(&credential).await?;
        Ok(Self { dashboard })
    }

    pub const fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    pub async fn close(self) {
        self.dashboard.sign_out().await;
    }
}

/// Write a rendered view to stdout.
pub fn emit(text: &str) -> CommandResult {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

/// Print what happened to a confirmable action.
pub fn emit_outcome(session: &Session, outcome: Outcome) -> CommandResult {
    match outcome {
        Outcome::Cancelled => emit("Cancelled, nothing was changed."),
        Outcome::Applied => emit_notification(session),
    }
}

/// Print the notification currently on screen, if any.
pub fn emit_notification(session: &Session) -> CommandResult {
    match session.dashboard.notifier().current() {
        Some(n) if n.kind == NotificationKind::Error => emit(&format!("! {}", n.message)),
        Some(n) => emit(&n.message),
        None => Ok(()),
    }
}

/// `cc-cli stats`
pub async fn stats(session: &Session) -> CommandResult {
    emit(&render::stats(&session.dashboard.stats().await))
}

/// `cc-cli tab [name]`
pub async fn tab(session: &Session, name: Option<&str>) -> CommandResult {
    match name {
        None => emit(session.dashboard.active_tab().await.as_str()),
        Some(name) => {
            let tab: Tab = name.parse()?;
            session.dashboard.select_tab(tab).await?;
            emit(&format!("Active tab: {tab}"))
        }
    }
}
