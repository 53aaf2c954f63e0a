use anyhow::{Context, Result};
use tracing::info;

use super::Session;
use crate::backend::MediaBackend;
use crate::model::{DeleteOutcome, MediaId, Pane};

/// Delete media by id. A refusal from the server is an error.
pub fn run_delete(session: &Session, pane: Pane, ids: &[MediaId]) -> Result<DeleteOutcome> {
    if ids.is_empty() {
        anyhow::bail!("No media ids given");
    }
    let outcome = session
        .runtime
        .block_on(session.backend.delete_media(ids, pane))
        .context("Delete request failed")?;
    if !outcome.success {
        anyhow::bail!("Server refused delete: {}", outcome.message);
    }
    info!(%pane, count = ids.len(), "deleted via cli");
    Ok(outcome)
}
