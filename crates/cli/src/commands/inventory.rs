//! `cc-cli inventory ...`

use std::path::Path;

use circuit_cart_admin::gateway::ImageUpload;
use circuit_cart_admin::models::ProductDraft;
use circuit_cart_core::ProductId;

use super::{CommandResult, Session, emit, emit_notification, emit_outcome, render};

pub async fn list(session: &Session) -> CommandResult {
    emit(&render::inventory(&session.dashboard().inventory().await))
}

pub async fn add(session: &Session, draft: &ProductDraft, image: Option<&Path>) -> CommandResult {
    let upload = image.map(read_image).transpose()?;
    let id = session.dashboard().add_product(draft, upload).await?;
    emit_notification(session)?;
    emit(&format!("id: {id}"))
}

pub async fn scrap(session: &Session, id: &str) -> CommandResult {
    let outcome = session.dashboard().scrap_product(&ProductId::from(id)).await?;
    emit_outcome(session, outcome)
}

fn read_image(path: &Path) -> Result<ImageUpload, std::io::Error> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
    Ok(ImageUpload { file_name, bytes })
}
