//! Daily media items.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of captured media for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// A short video capture
    Video,
    /// A still photo capture
    Image,
}

impl MediaKind {
    /// Resolve a kind from a lowercase file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp4" | "webm" => Some(MediaKind::Video),
            "jpg" | "jpeg" | "png" => Some(MediaKind::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One calendar day's captured content, as found in the remote folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Calendar date the capture belongs to (canonical key)
    pub date: NaiveDate,
    /// Video or image
    pub kind: MediaKind,
    /// Opaque handle in the segment store
    pub remote_id: String,
    /// Remote filename (e.g. "2024-01-01.mp4")
    pub name: String,
    /// Remote modification timestamp, used for duplicate resolution
    pub modified_at: DateTime<Utc>,
}

impl MediaItem {
    /// Local filename for the raw download of this item.
    pub fn raw_file_name(&self) -> String {
        self.name.clone()
    }

    /// Local filename for the normalized 1-second segment of this item.
    pub fn segment_file_name(&self) -> String {
        format!("{}.seg.mp4", self.date.format("%Y-%m-%d"))
    }
}
