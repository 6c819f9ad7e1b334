//! Text rendering of dashboard views.

use chrono::{DateTime, Utc};
use circuit_cart_admin::models::{InventoryItem, Order, UserProfile};
use circuit_cart_admin::view_model::{DashboardStats, cart_total};
use tabled::builder::Builder;
use tabled::settings::object::{Columns, Rows};
use tabled::settings::{Alignment, Style};

const NONE: &str = "-";

fn timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| NONE.to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string())
}

fn text(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NONE)
        .to_string()
}

fn finish(builder: Builder, numeric: std::ops::Range<usize>) -> String {
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(numeric), Alignment::right());
    table.modify(Rows::first(), Alignment::left());
    table.to_string()
}

pub fn inventory(items: &[InventoryItem]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Category", "Price", "Stock", "Discount", "Added"]);
    for item in items {
        builder.push_record([
            item.id.to_string(),
            item.name.clone(),
            item.category.to_string(),
            item.price.to_string(),
            item.stock.to_string(),
            item.discount_label().unwrap_or_else(|| NONE.to_string()),
            timestamp(item.created_at),
        ]);
    }
    finish(builder, 3..5)
}

pub fn customers(users: &[UserProfile]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["User", "Name", "Email", "Cart lines", "Cart value", "Last active"]);
    for user in users {
        builder.push_record([
            user.user_id.to_string(),
            user.display_label().to_string(),
            text(user.email.as_deref()),
            user.cart_data.len().to_string(),
            cart_total(&user.cart_data).to_string(),
            timestamp(user.updated_at),
        ]);
    }
    finish(builder, 3..5)
}

pub fn cart(user: &UserProfile) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Product", "Category", "Unit price", "Qty", "Subtotal"]);
    for line in &user.cart_data {
        builder.push_record([
            line.product_name().to_string(),
            text(line.product.as_ref().and_then(|p| p.category.as_deref())),
            line.unit_price().to_string(),
            line.qty.to_string(),
            line.subtotal().to_string(),
        ]);
    }
    builder.push_record([
        "Total".to_string(),
        String::new(),
        String::new(),
        String::new(),
        cart_total(&user.cart_data).to_string(),
    ]);
    format!(
        "{} <{}>\n{}",
        user.display_label(),
        text(user.email.as_deref()),
        finish(builder, 2..5)
    )
}

pub fn orders(orders: &[Order]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Order", "Status", "Customer", "Total", "Items", "Delivery", "Placed"]);
    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.status.to_string(),
            text(order.customer_info.name.as_deref()),
            order.total_or_zero().to_string(),
            order.item_count().to_string(),
            order
                .delivery_date
                .map_or_else(|| NONE.to_string(), |d| d.to_string()),
            timestamp(order.created_at),
        ]);
    }
    finish(builder, 3..5)
}

/// Full detail of one order: shipping, payment proof and lines.
pub fn manifest(order: &Order) -> String {
    let info = &order.customer_info;
    let mut details = Builder::default();
    details.push_record(["Order".to_string(), order.id.to_string()]);
    details.push_record(["Status".to_string(), order.status.to_string()]);
    details.push_record([
        "Delivery".to_string(),
        order
            .delivery_date
            .map_or_else(|| NONE.to_string(), |d| d.to_string()),
    ]);
    details.push_record(["Placed".to_string(), timestamp(order.created_at)]);
    details.push_record(["Recipient".to_string(), text(info.name.as_deref())]);
    details.push_record(["Phone".to_string(), text(info.phone.as_deref())]);
    details.push_record(["Address".to_string(), text(info.address.as_deref())]);
    details.push_record(["Pincode".to_string(), text(info.pincode.as_deref())]);
    details.push_record(["UTR".to_string(), text(info.utr.as_deref())]);
    details.push_record(["Receipt".to_string(), text(info.receipt_url.as_deref())]);
    let mut details = details.build();
    details.with(Style::modern_rounded());

    let mut lines = Builder::default();
    lines.push_record(["Product", "Unit price", "Qty", "Subtotal"]);
    for line in &order.items {
        lines.push_record([
            line.product_name().to_string(),
            line.unit_price().to_string(),
            line.qty.to_string(),
            line.subtotal().to_string(),
        ]);
    }
    lines.push_record([
        "Total".to_string(),
        String::new(),
        order.item_count().to_string(),
        order.total_or_zero().to_string(),
    ]);

    format!("{details}\n{}", finish(lines, 1..4))
}

pub fn stats(stats: &DashboardStats) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Registered users".to_string(), stats.registered_users.to_string()]);
    builder.push_record(["Active carts".to_string(), stats.active_carts.to_string()]);
    builder.push_record([
        "Potential revenue".to_string(),
        stats.potential_revenue.to_string(),
    ]);
    builder.push_record(["Pending orders".to_string(), stats.pending_orders.to_string()]);
    builder.push_record(["Catalog size".to_string(), stats.catalog_size.to_string()]);
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..2), Alignment::right());
    table.to_string()
}
