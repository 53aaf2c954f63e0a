use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque media identifier handed out by the backend.
///
/// Callers must not parse it; the only inspection allowed is the
/// [`looks_like_video`] heuristic used for rendering hints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MediaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One of the two gallery panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pane {
    Source,
    Destination,
}

impl Pane {
    pub const ALL: [Pane; 2] = [Pane::Source, Pane::Destination];

    /// Name used by the media endpoints (`position=source|destination`)
    pub fn position(self) -> &'static str {
        match self {
            Pane::Source => "source",
            Pane::Destination => "destination",
        }
    }

    /// Name used by the tree endpoint and settings keys (`left|right`)
    pub fn side(self) -> &'static str {
        match self {
            Pane::Source => "left",
            Pane::Destination => "right",
        }
    }

    pub fn other(self) -> Pane {
        match self {
            Pane::Source => Pane::Destination,
            Pane::Destination => Pane::Source,
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.position())
    }
}

impl std::str::FromStr for Pane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "source" | "left" | "src" => Ok(Pane::Source),
            "destination" | "right" | "dest" | "dst" => Ok(Pane::Destination),
            other => Err(format!("unknown pane '{}' (expected source or destination)", other)),
        }
    }
}

/// Media list filter, forwarded opaquely to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    #[default]
    All,
    Unique,
    Duplicates,
    Exclusive,
    Common,
}

impl MediaFilter {
    pub const ALL: [MediaFilter; 5] = [
        MediaFilter::All,
        MediaFilter::Unique,
        MediaFilter::Duplicates,
        MediaFilter::Exclusive,
        MediaFilter::Common,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaFilter::All => "all",
            MediaFilter::Unique => "unique",
            MediaFilter::Duplicates => "duplicates",
            MediaFilter::Exclusive => "exclusive",
            MediaFilter::Common => "common",
        }
    }

    /// Next filter in display order, wrapping around
    pub fn next(self) -> MediaFilter {
        let pos = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for MediaFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown filter '{}'", s))
    }
}

/// Metadata for one media item. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetail {
    pub alt: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates_count: Option<u32>,
}

impl MediaDetail {
    /// Stand-in installed when a detail fetch fails or times out
    pub fn placeholder(id: &MediaId) -> Self {
        Self {
            alt: format!("Media {}", id),
            created_at: None,
            name: None,
            path: None,
            size: None,
            camera_model: None,
            hash: None,
            duplicates_count: None,
        }
    }

    pub fn is_video(&self) -> bool {
        looks_like_video(&self.alt)
    }

    /// Best label for display: file name if known, else alt text
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.alt)
    }
}

/// Guess whether a media item is a video from a filename-like suffix.
///
/// A rendering hint only; ids and alt texts carry no such contract.
pub fn looks_like_video(text: &str) -> bool {
    const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "ogg", "mov"];
    text.rsplit_once('.')
        .map(|(_, ext)| VIDEO_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
        .unwrap_or(false)
}

/// Node of the backend's directory tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    /// Depth-first flattening with depth, for list rendering
    pub fn flatten(nodes: &[DirectoryNode]) -> Vec<(usize, &DirectoryNode)> {
        let mut out = Vec::new();
        fn walk<'a>(
            nodes: &'a [DirectoryNode],
            depth: usize,
            out: &mut Vec<(usize, &'a DirectoryNode)>,
        ) {
            for node in nodes {
                out.push((depth, node));
                walk(&node.children, depth + 1, out);
            }
        }
        walk(nodes, 0, &mut out);
        out
    }
}

/// Result document of a bulk delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_heuristic() {
        assert!(looks_like_video("Sample Video 3.mp4"));
        assert!(looks_like_video("clip.MOV"));
        assert!(!looks_like_video("Sample Image 4.jpg"));
        assert!(!looks_like_video("no-extension"));
        assert!(!looks_like_video("mp4"));
    }

    #[test]
    fn test_detail_deserializes_camel_case() {
        let json = r#"{
            "alt": "a.jpg",
            "createdAt": "2024-01-02T03:04:05",
            "cameraModel": "X100",
            "duplicatesCount": 2
        }"#;
        let detail: MediaDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.alt, "a.jpg");
        assert_eq!(detail.created_at.as_deref(), Some("2024-01-02T03:04:05"));
        assert_eq!(detail.camera_model.as_deref(), Some("X100"));
        assert_eq!(detail.duplicates_count, Some(2));
        assert!(detail.hash.is_none());
    }

    #[test]
    fn test_placeholder_detail() {
        let detail = MediaDetail::placeholder(&MediaId::from("42"));
        assert_eq!(detail.alt, "Media 42");
        assert!(detail.created_at.is_none());
    }

    #[test]
    fn test_pane_parsing() {
        assert_eq!("left".parse::<Pane>().unwrap(), Pane::Source);
        assert_eq!("Destination".parse::<Pane>().unwrap(), Pane::Destination);
        assert!("middle".parse::<Pane>().is_err());
    }

    #[test]
    fn test_filter_cycle() {
        let mut filter = MediaFilter::All;
        for _ in 0..MediaFilter::ALL.len() {
            filter = filter.next();
        }
        assert_eq!(filter, MediaFilter::All);
        assert_eq!("duplicates".parse::<MediaFilter>().unwrap(), MediaFilter::Duplicates);
    }

    #[test]
    fn test_flatten_tree() {
        let tree = vec![DirectoryNode {
            id: "1".into(),
            name: "root".into(),
            children: vec![DirectoryNode {
                id: "2".into(),
                name: "child".into(),
                children: vec![],
            }],
        }];
        let flat = DirectoryNode::flatten(&tree);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].0, 1);
        assert_eq!(flat[1].1.name, "child");
    }
}
