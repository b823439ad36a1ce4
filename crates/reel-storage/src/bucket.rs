//! S3-compatible bucket implementation of the segment store.
//!
//! Folders are key prefixes; a folder "exists" once the first object is
//! written under it, so `get_or_create_folder` only normalizes the
//! handle. File ids are full object keys.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::{content_type_for_name, FolderId, RemoteFile, SegmentStore};

/// Configuration for the bucket store.
#[derive(Debug, Clone)]
pub struct BucketConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for R2)
    pub region: String,
}

impl BucketConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("REEL_S3_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("REEL_S3_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("REEL_S3_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("REEL_S3_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("REEL_S3_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("REEL_S3_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("REEL_S3_BUCKET")
                .map_err(|_| StorageError::config_error("REEL_S3_BUCKET not set"))?,
            region: std::env::var("REEL_S3_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Bucket-backed segment store.
#[derive(Clone)]
pub struct BucketStore {
    client: Client,
    bucket: String,
}

impl BucketStore {
    /// Create a new store from configuration.
    pub fn new(config: BucketConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "reel",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(BucketConfig::from_env()?))
    }
}

/// Map an SDK error to the taxonomy the engine understands.
///
/// The SDK's service errors only expose stable codes through their
/// display strings at this API level, so classification matches on them.
fn map_sdk_error(err: impl std::fmt::Display, fallback: fn(String) -> StorageError) -> StorageError {
    let text = err.to_string();
    if text.contains("NoSuchKey") {
        StorageError::not_found(text)
    } else if text.contains("AccessDenied")
        || text.contains("InvalidAccessKeyId")
        || text.contains("SignatureDoesNotMatch")
        || text.contains("403")
    {
        StorageError::PermissionDenied(text)
    } else {
        fallback(text)
    }
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    ts.to_millis()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Utc::now)
}

/// Normalize a folder name to a `name/` key prefix.
fn folder_prefix(name: &str) -> String {
    format!("{}/", name.trim_matches('/'))
}

#[async_trait]
impl SegmentStore for BucketStore {
    async fn list(&self, folder: &FolderId) -> StorageResult<Vec<RemoteFile>> {
        debug!("Listing objects under {}", folder);

        let mut files = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(folder.as_str());

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| map_sdk_error(aws_sdk_s3::error::DisplayErrorContext(e), StorageError::ListFailed))?;

            for obj in response.contents() {
                let key = obj.key().unwrap_or_default().to_string();
                let name = key
                    .rsplit_once('/')
                    .map(|(_, n)| n.to_string())
                    .unwrap_or_else(|| key.clone());
                if name.is_empty() {
                    // Folder placeholder objects carry no content.
                    continue;
                }
                let modified_at = obj
                    .last_modified()
                    .map(to_chrono)
                    .unwrap_or_else(Utc::now);
                files.push(RemoteFile {
                    id: key,
                    mime_type: content_type_for_name(&name).to_string(),
                    name,
                    created_at: None,
                    modified_at,
                });
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(String::from);
            } else {
                break;
            }
        }

        Ok(files)
    }

    async fn download(&self, id: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading {}", id);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(id)
            .send()
            .await
            .map_err(|e| map_sdk_error(aws_sdk_s3::error::DisplayErrorContext(e), StorageError::DownloadFailed))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    async fn download_to(&self, id: &str, path: &Path) -> StorageResult<()> {
        let bytes = self.download(id).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;

        debug!("Downloaded {} to {}", id, path.display());
        Ok(())
    }

    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<RemoteFile> {
        let key = format!("{}{}", folder.as_str(), name);
        debug!("Uploading {} bytes to {}", bytes.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(mime_type)
            .send()
            .await
            .map_err(|e| map_sdk_error(aws_sdk_s3::error::DisplayErrorContext(e), StorageError::UploadFailed))?;

        info!("Uploaded {}", key);
        Ok(RemoteFile {
            id: key,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            created_at: Some(Utc::now()),
            modified_at: Utc::now(),
        })
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        debug!("Deleting {}", id);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(id)
            .send()
            .await
            .map_err(|e| map_sdk_error(aws_sdk_s3::error::DisplayErrorContext(e), StorageError::DeleteFailed))?;

        Ok(())
    }

    async fn get_or_create_folder(&self, name: &str) -> StorageResult<FolderId> {
        // Prefixes need no creation; normalizing the handle is enough.
        Ok(FolderId::new(folder_prefix(name)))
    }
}
