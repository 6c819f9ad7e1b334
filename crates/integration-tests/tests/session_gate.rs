//! Session gate scenarios: only the allow-listed admin gets a working
//! dashboard, and nothing runs for anyone else.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use circuit_cart_admin::DashboardError;
use circuit_cart_admin::models::{FederatedCredential, Identity};
use circuit_cart_admin::session::{AuthError, SessionState};
use circuit_cart_integration_tests::{ADMIN_EMAIL, TestContext, admin};

#[tokio::test]
async fn test_exact_admin_email_is_authorized() {
    let ctx = TestContext::seeded();
    ctx.dashboard.authorize(Some(admin())).await.unwrap();

    assert!(ctx.dashboard.is_authorized());
    assert!(ctx.dashboard.is_polling().await);
    assert_eq!(ctx.dashboard.inventory().await.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_other_identities_start_nothing() {
    let ctx = TestContext::seeded();

    for identity in [
        Some(Identity::with_email("g-2", "someone@example.in")),
        Some(Identity::with_email("g-3", "OWNER@circuitcart.in")),
        None,
    ] {
        assert!(ctx.dashboard.authorize(identity).await.is_err());
        assert_eq!(ctx.dashboard.session().state(), SessionState::Unauthenticated);
    }

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(ctx.gateway.read_calls(), 0);
    assert!(!ctx.dashboard.is_polling().await);
    assert!(ctx.dashboard.inventory().await.is_empty());
}

#[tokio::test]
async fn test_sign_in_through_provider() {
    let ctx = TestContext::seeded();
    let identity = ctx
        .dashboard
        .sign_in(&FederatedCredential::new("google", ADMIN_EMAIL))
        .await
        .unwrap();
    assert_eq!(identity.email.as_deref(), Some(ADMIN_EMAIL));
    assert!(ctx.dashboard.is_authorized());
}

#[tokio::test]
async fn test_cancelled_popup() {
    let ctx = TestContext::seeded();
    let err = ctx
        .dashboard
        .sign_in(&FederatedCredential::new("google", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Auth(AuthError::Cancelled)));
    assert!(!ctx.dashboard.is_authorized());
}

#[tokio::test]
async fn test_wrong_account_is_told_why() {
    let ctx = TestContext::seeded();
    let err = ctx
        .dashboard
        .sign_in(&FederatedCredential::new("google", "intruder@example.in"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Auth(AuthError::NotAllowed { .. })
    ));
    assert_eq!(ctx.dashboard.notifier().error_count(), 1);
    assert_eq!(ctx.gateway.read_calls(), 0);
}

#[tokio::test]
async fn test_mutations_blocked_after_sign_out() {
    let ctx = TestContext::signed_in().await;
    ctx.dashboard.sign_out().await;

    let writes = ctx.gateway.write_calls();
    let err = ctx
        .dashboard
        .purge_order(&"ord-1001".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Auth(AuthError::NotAuthorized)));
    assert_eq!(ctx.gateway.write_calls(), writes);
}
