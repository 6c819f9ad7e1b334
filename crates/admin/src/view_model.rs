//! Derived dashboard values.
//!
//! Pure functions over already-fetched collections. Nothing here is cached;
//! callers recompute on every read so the figures always match the current
//! collections.

use circuit_cart_core::{OrderStatus, Price};
use serde::Serialize;

use crate::models::{InventoryItem, LineItem, Order, UserProfile};

/// Sum of `price x qty` over the cart. Lines without a product or price
/// count as zero.
#[must_use]
pub fn cart_total(cart: &[LineItem]) -> Price {
    cart.iter().map(LineItem::subtotal).sum()
}

/// Number of customers with at least one cart line.
#[must_use]
pub fn active_cart_count(users: &[UserProfile]) -> usize {
    users.iter().filter(|user| user.has_active_cart()).count()
}

/// Value of every saved cart combined.
#[must_use]
pub fn potential_revenue(users: &[UserProfile]) -> Price {
    users.iter().map(|user| cart_total(&user.cart_data)).sum()
}

/// Number of orders still awaiting review.
#[must_use]
pub fn pending_order_count(orders: &[Order]) -> usize {
    orders
        .iter()
        .filter(|order| order.status == OrderStatus::Pending)
        .count()
}

/// Headline figures shown above the tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub registered_users: usize,
    pub active_carts: usize,
    pub potential_revenue: Price,
    pub pending_orders: usize,
    pub catalog_size: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn compute(inventory: &[InventoryItem], users: &[UserProfile], orders: &[Order]) -> Self {
        Self {
            registered_users: users.len(),
            active_carts: active_cart_count(users),
            potential_revenue: potential_revenue(users),
            pending_orders: pending_order_count(orders),
            catalog_size: inventory.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use circuit_cart_core::UserId;

    fn user(cart: Vec<LineItem>) -> UserProfile {
        UserProfile {
            user_id: UserId::new("u"),
            email: None,
            display_name: None,
            cart_data: cart,
            updated_at: None,
        }
    }

    fn line(price: u32, qty: u32) -> LineItem {
        LineItem::new("part", Price::from_rupees(price), qty)
    }

    #[test]
    fn test_cart_total_skips_missing_product() {
        let cart: Vec<LineItem> = serde_json::from_value(serde_json::json!([
            {"product": {"price": 100}, "qty": 2},
            {"product": null, "qty": 5}
        ]))
        .unwrap();
        assert_eq!(cart_total(&cart), Price::from_rupees(200));
    }

    #[test]
    fn test_cart_total_saturates_on_huge_stored_price() {
        let cart: Vec<LineItem> = serde_json::from_value(serde_json::json!([
            {"product": {"price": "79228162514264337593543950335"}, "qty": 2},
            {"product": {"price": 10}, "qty": 1}
        ]))
        .unwrap();
        let total = cart_total(&cart);
        assert_eq!(total, Price::parse("79228162514264337593543950335").unwrap());

        let users = [user(cart.clone()), user(cart)];
        assert_eq!(potential_revenue(&users), total);
        assert_eq!(DashboardStats::compute(&[], &users, &[]).potential_revenue, total);
    }

    #[test]
    fn test_cart_total_empty() {
        assert_eq!(cart_total(&[]), Price::ZERO);
    }

    #[test]
    fn test_active_cart_count() {
        let users = [user(vec![]), user(vec![line(5, 1)]), user(vec![])];
        assert_eq!(active_cart_count(&users), 1);
    }

    #[test]
    fn test_potential_revenue() {
        let users = [user(vec![line(100, 2)]), user(vec![line(25, 2)])];
        assert_eq!(potential_revenue(&users), Price::from_rupees(250));
    }

    #[test]
    fn test_pending_order_count() {
        let orders: Vec<Order> = serde_json::from_value(serde_json::json!([
            {"id": 1, "status": "pending"},
            {"id": 2, "status": "confirmed"},
            {"id": 3},
            {"id": 4, "status": "rejected"}
        ]))
        .unwrap();
        assert_eq!(pending_order_count(&orders), 2);
    }

    #[test]
    fn test_stats_compute() {
        let users = [user(vec![line(100, 2)]), user(vec![])];
        let stats = DashboardStats::compute(&[], &users, &[]);
        assert_eq!(
            stats,
            DashboardStats {
                registered_users: 2,
                active_carts: 1,
                potential_revenue: Price::from_rupees(200),
                pending_orders: 0,
                catalog_size: 0,
            }
        );
    }
}
