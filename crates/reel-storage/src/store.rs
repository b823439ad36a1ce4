//! The segment store trait and its wire models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::StorageResult;

/// Opaque handle to a per-user content folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for one remote file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Opaque handle for download/delete
    pub id: String,
    /// Filename within the folder
    pub name: String,
    /// MIME type
    pub mime_type: String,
    /// Creation timestamp, when the backend reports one
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

/// Narrow interface to the remote content store.
///
/// Implementations paginate internally; `list` always returns the
/// complete folder contents.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// List every file in a folder.
    async fn list(&self, folder: &FolderId) -> StorageResult<Vec<RemoteFile>>;

    /// Download a file into memory.
    async fn download(&self, id: &str) -> StorageResult<Vec<u8>>;

    /// Download a file to a local path, creating parent directories.
    async fn download_to(&self, id: &str, path: &Path) -> StorageResult<()>;

    /// Upload bytes as a named file in a folder.
    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<RemoteFile>;

    /// Delete a file.
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Resolve a folder handle by name, creating it when absent.
    async fn get_or_create_folder(&self, name: &str) -> StorageResult<FolderId>;
}

/// Guess a MIME type from a filename, matching the conventions the
/// capture clients upload with.
pub fn content_type_for_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".mp4") {
        "video/mp4"
    } else if lower.ends_with(".webm") {
        "video/webm"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".mp3") {
        "audio/mpeg"
    } else {
        "application/octet-stream"
    }
}
