use anyhow::{Context, Result};

use super::{spinner, Session};
use crate::backend::ServerStatus;

/// Query the media server's status document
pub fn run_status(session: &Session) -> Result<ServerStatus> {
    let spinner = spinner("Contacting server...");
    let status = session
        .runtime
        .block_on(session.backend.fetch_status())
        .with_context(|| format!("Failed to reach {}", session.backend.base_url()));
    spinner.finish_and_clear();
    status
}
