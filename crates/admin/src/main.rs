//! Circuit Cart admin daemon.
//!
//! Headless runner for the dashboard: signs in, performs the initial fetch,
//! keeps polling the backend and logs the headline figures after every
//! refresh until Ctrl+C or SIGTERM.
//!
//! # Usage
//!
//! ```text
//! circuit-cart-admin           # live backend, needs ADMIN_ID_TOKEN
//! circuit-cart-admin --demo    # seeded in-memory store
//! ```
//!
//! `ADMIN_ID_TOKEN` is the id token from the federated sign-in popup;
//! `ADMIN_ID_PROVIDER` names the provider (default: google).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use circuit_cart_admin::config::DashboardConfig;
use circuit_cart_admin::dashboard::{AssumeNo, Dashboard, FileTabStore};
use circuit_cart_admin::gateway::{Gateway, ImageHostClient, InMemoryGateway, RestGateway};
use circuit_cart_admin::models::FederatedCredential;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &DashboardConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "circuit_cart_admin=info".into());

    // JSON for log shippers, text for terminals
    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let demo = std::env::args().skip(1).any(|arg| arg == "--demo");

    let config = if demo {
        DashboardConfig::demo_from_env()
    } else {
        DashboardConfig::from_env()
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be up before the subscriber so the layer has a client.
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (gateway, credential): (Arc<dyn Gateway>, FederatedCredential) = match &config.backend {
        Some(backend) => {
            let images = ImageHostClient::new(&config.image_host);
            let gateway = RestGateway::new(backend, Some(images))?;
            let token = std::env::var("ADMIN_ID_TOKEN")
                .map_err(|_| "ADMIN_ID_TOKEN is required to sign in to the live backend")?;
            let provider =
                std::env::var("ADMIN_ID_PROVIDER").unwrap_or_else(|_| "google".to_string());
            (Arc::new(gateway), FederatedCredential::new(provider, token))
        }
        None => {
            tracing::info!("Running against the seeded in-memory store");
            // The demo provider takes the email as its token.
            let credential = FederatedCredential::new("demo", config.admin_email.as_str());
            (Arc::new(InMemoryGateway::seeded()), credential)
        }
    };

    let dashboard = Dashboard::new(
        gateway,
        &config,
        Box::new(FileTabStore::new(&config.state_file)),
        // Nothing destructive runs unattended.
        Box::new(AssumeNo),
    );

    let identity = dashboard.sign_in(&credential).await?;
    let tab = dashboard.active_tab().await;
    tracing::info!(
        email = identity.email.as_deref().unwrap_or_default(),
        refresh_secs = config.refresh_interval.as_secs(),
        tab = %tab,
        "Dashboard ready"
    );
    log_stats(&dashboard).await;

    let mut refreshes = dashboard.subscribe_refreshes();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            changed = refreshes.changed() => {
                if changed.is_err() {
                    break;
                }
                log_stats(&dashboard).await;
            }
        }
    }

    dashboard.sign_out().await;
    Ok(())
}

async fn log_stats(dashboard: &Dashboard) {
    let stats = dashboard.stats().await;
    tracing::info!(
        registered_users = stats.registered_users,
        active_carts = stats.active_carts,
        potential_revenue = %stats.potential_revenue,
        pending_orders = stats.pending_orders,
        catalog_size = stats.catalog_size,
        "Dashboard stats"
    );
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, signing out");
}
