//! Service-level tests against an in-memory segment store.
//!
//! These cover everything up to the first encoder invocation; the
//! FFmpeg command construction itself is unit-tested in `reel-media`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use reel_engine::{AdmitError, CompilationService, EngineConfig};
use reel_media::EncoderPaths;
use reel_models::{CompilationJob, CompilationRequest, JobStatus};
use reel_storage::{FolderId, RemoteFile, SegmentStore, StorageError, StorageResult};

/// How a store call should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailMode {
    None,
    PermissionOnList,
}

/// In-memory segment store recording download traffic.
struct MemoryStore {
    files: Mutex<HashMap<String, (RemoteFile, Vec<u8>)>>,
    downloads: AtomicUsize,
    list_delay: Duration,
    fail_mode: FailMode,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            downloads: AtomicUsize::new(0),
            list_delay: Duration::ZERO,
            fail_mode: FailMode::None,
        }
    }

    fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    fn with_fail_mode(mut self, mode: FailMode) -> Self {
        self.fail_mode = mode;
        self
    }

    async fn seed(&self, folder: &FolderId, name: &str, modified_secs: i64) {
        let id = format!("{}{}", folder.as_str(), name);
        let file = RemoteFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: "application/octet-stream".to_string(),
            created_at: None,
            modified_at: Utc.timestamp_opt(modified_secs, 0).unwrap(),
        };
        self.files.lock().await.insert(id, (file, vec![0u8; 16]));
    }

    fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn list(&self, folder: &FolderId) -> StorageResult<Vec<RemoteFile>> {
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        if self.fail_mode == FailMode::PermissionOnList {
            return Err(StorageError::PermissionDenied("token expired".into()));
        }
        let files = self.files.lock().await;
        let mut listed: Vec<RemoteFile> = files
            .values()
            .filter(|(f, _)| f.id.starts_with(folder.as_str()))
            .map(|(f, _)| f.clone())
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn download(&self, id: &str) -> StorageResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let files = self.files.lock().await;
        files
            .get(id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StorageError::not_found(id))
    }

    async fn download_to(&self, id: &str, path: &Path) -> StorageResult<()> {
        let bytes = self.download(id).await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn upload(
        &self,
        folder: &FolderId,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> StorageResult<RemoteFile> {
        let id = format!("{}{}", folder.as_str(), name);
        let file = RemoteFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            created_at: Some(Utc::now()),
            modified_at: Utc::now(),
        };
        self.files.lock().await.insert(id, (file.clone(), bytes));
        Ok(file)
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.files.lock().await.remove(id);
        Ok(())
    }

    async fn get_or_create_folder(&self, name: &str) -> StorageResult<FolderId> {
        Ok(FolderId::new(format!("{}/", name)))
    }
}

fn test_service(store: Arc<MemoryStore>) -> CompilationService {
    let config = EngineConfig {
        work_dir: std::env::temp_dir()
            .join("reel-tests")
            .to_string_lossy()
            .to_string(),
        min_clips: 2,
        ..EngineConfig::default()
    };
    // Encoder paths are never exercised by these scenarios; every run
    // fails before the first encode.
    let encoder = EncoderPaths::from_paths("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
    CompilationService::with_encoder(store, encoder, config)
}

async fn wait_for_terminal(service: &CompilationService, user: &str) -> CompilationJob {
    for _ in 0..200 {
        if let Some(job) = service.get_status(user).await {
            if job.is_terminal() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job never reached a terminal state");
}

#[tokio::test]
async fn insufficient_clips_fails_before_any_download() {
    let store = Arc::new(MemoryStore::new());
    let folder = FolderId::new("alice/");
    store.seed(&folder, "2024-01-01.mp4", 100).await;

    let service = test_service(store.clone());
    service
        .start_compilation("alice", &folder, CompilationRequest::all_history())
        .await
        .unwrap();

    let job = wait_for_terminal(&service, "alice").await;
    assert_eq!(job.status, JobStatus::Failed);
    let error = job.error.unwrap();
    assert!(error.contains("need at least 2"), "unexpected error: {error}");
    assert_eq!(store.download_count(), 0);
}

#[tokio::test]
async fn empty_range_is_reported_as_such() {
    let store = Arc::new(MemoryStore::new());
    let folder = FolderId::new("alice/");
    store.seed(&folder, "2024-06-01.mp4", 100).await;
    store.seed(&folder, "2024-06-02.jpg", 100).await;

    let service = test_service(store.clone());
    let request = CompilationRequest::for_range(
        chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
    );
    service
        .start_compilation("alice", &folder, request)
        .await
        .unwrap();

    let job = wait_for_terminal(&service, "alice").await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("no media found"));
    assert_eq!(store.download_count(), 0);
}

#[tokio::test]
async fn second_submission_while_running_is_rejected() {
    // A slow listing keeps the first run alive long enough to probe the
    // admission check deterministically.
    let store =
        Arc::new(MemoryStore::new().with_list_delay(Duration::from_millis(500)));
    let folder = FolderId::new("alice/");

    let service = test_service(store.clone());
    let first = service
        .start_compilation("alice", &folder, CompilationRequest::all_history())
        .await
        .unwrap();

    let err = service
        .start_compilation("alice", &folder, CompilationRequest::all_history())
        .await
        .unwrap_err();
    assert!(matches!(err, AdmitError::AlreadyRunning));

    // Still exactly one record, and it is the first job.
    let job = service.get_status("alice").await.unwrap();
    assert_eq!(job.id, first);
}

#[tokio::test]
async fn permission_failure_lands_on_the_job() {
    let store = Arc::new(MemoryStore::new().with_fail_mode(FailMode::PermissionOnList));
    let folder = FolderId::new("alice/");

    let service = test_service(store.clone());
    service
        .start_compilation("alice", &folder, CompilationRequest::all_history())
        .await
        .unwrap();

    let job = wait_for_terminal(&service, "alice").await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("permission denied"));
}

#[tokio::test]
async fn cleared_terminal_job_admits_a_new_run() {
    let store = Arc::new(MemoryStore::new());
    let folder = FolderId::new("alice/");

    let service = test_service(store.clone());
    service
        .start_compilation("alice", &folder, CompilationRequest::all_history())
        .await
        .unwrap();
    wait_for_terminal(&service, "alice").await;

    service.clear_status("alice").await;
    assert!(service.get_status("alice").await.is_none());

    service
        .start_compilation("alice", &folder, CompilationRequest::all_history())
        .await
        .unwrap();
}
