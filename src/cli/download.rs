use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{spinner, Session};
use crate::backend::MediaBackend;
use crate::model::{MediaId, Pane};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Save one media item to disk.
///
/// Without `output` the file is named after the item's file name (or its id)
/// in the current directory.
pub fn run_download(
    session: &Session,
    pane: Pane,
    id: &MediaId,
    output: Option<&Path>,
) -> Result<DownloadSummary> {
    let backend = &session.backend;
    let spinner = spinner(&format!("Downloading {}...", id));

    let result = session.runtime.block_on(async {
        let file_name = match backend.fetch_detail(id, pane).await {
            Ok(detail) => detail.name.unwrap_or_else(|| id.to_string()),
            Err(e) => {
                warn!(%id, error = %e, "no detail for download name");
                id.to_string()
            }
        };
        let url = backend.media_url(id, pane);
        let bytes = backend
            .fetch_bytes(&url)
            .await
            .with_context(|| format!("Failed to download {}", url))?;
        Ok::<_, anyhow::Error>((file_name, bytes))
    });
    spinner.finish_and_clear();
    let (file_name, bytes) = result?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(sanitize_file_name(&file_name)),
    };
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(%id, path = %path.display(), bytes = bytes.len(), "downloaded media");

    Ok(DownloadSummary {
        path,
        bytes: bytes.len(),
    })
}

/// Keep only the last path component and drop separators
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        "download".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("IMG_0001.jpg"), "IMG_0001.jpg");
        assert_eq!(sanitize_file_name("2024/trip/IMG_0001.jpg"), "IMG_0001.jpg");
        assert_eq!(sanitize_file_name("..\\evil.png"), "evil.png");
        assert_eq!(sanitize_file_name(".."), "download");
        assert_eq!(sanitize_file_name("dir/"), "download");
    }
}
