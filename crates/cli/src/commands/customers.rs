//! `cc-cli customers ...`

use circuit_cart_core::UserId;

use super::{CommandResult, Session, emit, render};

pub async fn list(session: &Session) -> CommandResult {
    emit(&render::customers(&session.dashboard().users().await))
}

pub async fn inspect(session: &Session, user_id: &str) -> CommandResult {
    let dashboard = session.dashboard();
    let user = dashboard.inspect_cart(&UserId::from(user_id)).await?;
    let result = if user.has_active_cart() {
        emit(&render::cart(&user))
    } else {
        emit(&format!("{} has an empty cart", user.display_label()))
    };
    dashboard.close_cart().await;
    result
}
