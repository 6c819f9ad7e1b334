//! The active tab survives a restart.

#![allow(clippy::unwrap_used)]

use circuit_cart_admin::dashboard::Tab;
use circuit_cart_integration_tests::{TestContext, admin};

#[tokio::test]
async fn test_tab_persists_across_reload() {
    let ctx = TestContext::signed_in().await;
    assert_eq!(ctx.dashboard.active_tab().await, Tab::Inventory);

    ctx.dashboard.select_tab(Tab::Orders).await.unwrap();
    ctx.dashboard.sign_out().await;

    let reloaded = ctx.reopen();
    reloaded.authorize(Some(admin())).await.unwrap();
    assert_eq!(reloaded.active_tab().await, Tab::Orders);
}

#[tokio::test]
async fn test_removed_tab_falls_back_to_inventory() {
    let ctx = TestContext::seeded();
    std::fs::write(&ctx.state_file, r#"{"active_tab": "analytics"}"#).unwrap();

    ctx.dashboard.authorize(Some(admin())).await.unwrap();
    assert_eq!(ctx.dashboard.active_tab().await, Tab::Inventory);
}
