use anyhow::{Context, Result};

use super::Session;
use crate::backend::MediaBackend;
use crate::model::{DirectoryNode, Pane};

/// Fetch the directory tree of one pane
pub fn run_tree(session: &Session, pane: Pane) -> Result<Vec<DirectoryNode>> {
    session
        .runtime
        .block_on(session.backend.list_directories(pane))
        .with_context(|| format!("Failed to list {} directories", pane))
}
