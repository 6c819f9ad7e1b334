//! `cc-cli orders ...`

use circuit_cart_core::{OrderId, OrderStatus};

use super::{CommandResult, Session, emit, emit_outcome, render};

pub async fn list(session: &Session, status: Option<&str>) -> CommandResult {
    let status: Option<OrderStatus> = status.map(str::parse).transpose()?;
    let orders: Vec<_> = session
        .dashboard()
        .orders()
        .await
        .into_iter()
        .filter(|order| status.is_none_or(|s| order.status == s))
        .collect();
    emit(&render::orders(&orders))
}

pub async fn show(session: &Session, id: &str) -> CommandResult {
    let dashboard = session.dashboard();
    let order = dashboard.open_manifest(&OrderId::from(id)).await?;
    let result = emit(&render::manifest(&order));
    dashboard.close_manifest().await;
    result
}

pub async fn confirm(session: &Session, id: &str, date: Option<&str>) -> CommandResult {
    let outcome = session
        .dashboard()
        .confirm_order(&OrderId::from(id), date)
        .await?;
    emit_outcome(session, outcome)
}

pub async fn ship(session: &Session, id: &str) -> CommandResult {
    let outcome = session.dashboard().ship_order(&OrderId::from(id)).await?;
    emit_outcome(session, outcome)
}

pub async fn deliver(session: &Session, id: &str) -> CommandResult {
    let outcome = session.dashboard().deliver_order(&OrderId::from(id)).await?;
    emit_outcome(session, outcome)
}

pub async fn reject(session: &Session, id: &str) -> CommandResult {
    let outcome = session.dashboard().reject_order(&OrderId::from(id)).await?;
    emit_outcome(session, outcome)
}

pub async fn purge(session: &Session, id: &str) -> CommandResult {
    let outcome = session.dashboard().purge_order(&OrderId::from(id)).await?;
    emit_outcome(session, outcome)
}
