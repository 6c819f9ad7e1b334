//! Aggregates over fetched collections.

#![allow(clippy::unwrap_used)]

use circuit_cart_admin::models::{LineItem, UserProfile};
use circuit_cart_admin::view_model::{
    active_cart_count, cart_total, pending_order_count, potential_revenue,
};
use circuit_cart_core::Price;
use circuit_cart_integration_tests::TestContext;

fn users(json: serde_json::Value) -> Vec<UserProfile> {
    serde_json::from_value(json).unwrap()
}

#[test]
fn test_cart_total_with_missing_product() {
    let cart: Vec<LineItem> = serde_json::from_value(serde_json::json!([
        {"product": {"price": 100}, "qty": 2},
        {"product": null, "qty": 5}
    ]))
    .unwrap();
    assert_eq!(cart_total(&cart), Price::from_rupees(200));
}

#[test]
fn test_cart_total_tolerates_every_partial_shape() {
    let cart: Vec<LineItem> = serde_json::from_value(serde_json::json!([
        {"product": {}, "qty": 3},
        {"product": {"name": "LED", "price": null}, "qty": 1},
        {"product": {"price": "12.5"}, "qty": 2},
        {"qty": 4}
    ]))
    .unwrap();
    assert_eq!(cart_total(&cart), Price::parse("25").unwrap());
}

#[test]
fn test_active_cart_count() {
    let users = users(serde_json::json!([
        {"user_id": "a", "cart_data": []},
        {"user_id": "b", "cart_data": [{"product": {"price": 1}, "qty": 1}]},
        {"user_id": "c", "cart_data": null}
    ]));
    assert_eq!(active_cart_count(&users), 1);
}

#[test]
fn test_potential_revenue() {
    let users = users(serde_json::json!([
        {"user_id": "a", "cart_data": [{"product": {"price": 100}, "qty": 2}]},
        {"user_id": "b", "cart_data": [{"product": {"price": 25}, "qty": 2}]}
    ]));
    assert_eq!(potential_revenue(&users), Price::from_rupees(250));
}

#[tokio::test]
async fn test_stats_track_current_collections() {
    let ctx = TestContext::signed_in().await;
    let stats = ctx.dashboard.stats().await;
    assert_eq!(stats.registered_users, 3);
    assert_eq!(stats.active_carts, 2);
    // 2 x 370 + 149 + 899
    assert_eq!(stats.potential_revenue, Price::from_rupees(1_788));
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.catalog_size, 5);
    assert_eq!(pending_order_count(&ctx.dashboard.orders().await), 1);

    ctx.dashboard
        .confirm_order(&"ord-1001".into(), None)
        .await
        .unwrap();
    assert_eq!(ctx.dashboard.stats().await.pending_orders, 0);
}
