use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, MediaBackend};
use crate::model::{DeleteOutcome, DirectoryNode, MediaDetail, MediaFilter, MediaId, Pane};

/// Status document served by `GET /status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub is_accessible: bool,
    #[serde(default)]
    pub is_running: Option<bool>,
    #[serde(default)]
    pub source_directory: String,
    #[serde(default)]
    pub destination_directory: String,
    #[serde(default)]
    pub source_file_count: u64,
    #[serde(default)]
    pub destination_file_count: u64,
    #[serde(default)]
    pub last_execution_date: Option<String>,
    #[serde(default)]
    pub destination_format: String,
    #[serde(default)]
    pub uptime_seconds: Option<u64>,
}

/// REST client for the media server.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|_| BackendError::InvalidUrl(base_url.clone()))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("dualpane/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| BackendError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn thumbnail_url(&self, id: &MediaId, pane: Pane) -> String {
        self.endpoint("thumbnail", &[("id", id.as_str()), ("position", pane.position())])
    }

    pub async fn fetch_status(&self) -> Result<ServerStatus, BackendError> {
        self.get_json(self.endpoint("status", &[])).await
    }

    /// Download raw bytes of a URL produced by this backend
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        debug!(%url, "GET bytes");
        let response = self.client.get(url).send().await.map_err(|source| {
            BackendError::Transport {
                url: url.to_string(),
                source,
            }
        })?;
        let response = check_status(url, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> String {
        let raw = format!("{}/{}", self.base_url, path);
        if params.is_empty() {
            return raw;
        }
        match reqwest::Url::parse_with_params(&raw, params) {
            Ok(url) => url.to_string(),
            Err(_) => raw,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, BackendError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(&url, response).await
    }
}

async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let response = check_status(url, response).await?;
    response
        .json::<T>()
        .await
        .map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })
}

impl MediaBackend for HttpBackend {
    async fn list_directories(&self, pane: Pane) -> Result<Vec<DirectoryNode>, BackendError> {
        self.get_json(self.endpoint("tree", &[("position", pane.side())]))
            .await
    }

    async fn list_media_ids(
        &self,
        directory: &str,
        pane: Pane,
        filter: MediaFilter,
    ) -> Result<Vec<MediaId>, BackendError> {
        let mut params = vec![("directory", directory), ("position", pane.position())];
        if filter != MediaFilter::All {
            params.push(("filter", filter.as_str()));
        }
        self.get_json(self.endpoint("media", &params)).await
    }

    async fn fetch_detail(&self, id: &MediaId, pane: Pane) -> Result<MediaDetail, BackendError> {
        self.get_json(self.endpoint("info", &[("id", id.as_str()), ("position", pane.position())]))
            .await
    }

    async fn fetch_thumbnail(&self, id: &MediaId, pane: Pane) -> Result<String, BackendError> {
        Ok(self.thumbnail_url(id, pane))
    }

    fn media_url(&self, id: &MediaId, pane: Pane) -> String {
        self.endpoint("media", &[("id", id.as_str()), ("position", pane.position())])
    }

    async fn delete_media(
        &self,
        ids: &[MediaId],
        pane: Pane,
    ) -> Result<DeleteOutcome, BackendError> {
        let url = self.endpoint("images", &[]);
        debug!(%url, count = ids.len(), "DELETE");
        let body = serde_json::json!({
            "imageIds": ids,
            "position": pane.position(),
        });
        let response = self
            .client
            .delete(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(&url, response).await
    }
}
