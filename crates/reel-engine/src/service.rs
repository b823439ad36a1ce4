//! Service facade.
//!
//! Wires the store, the engine and the job tracker together and exposes
//! the three operations the surrounding service layer calls:
//! start a compilation, poll its status, clear the record.

use std::sync::Arc;

use tracing::{info, warn};

use reel_media::{EncoderPaths, MediaResult};
use reel_models::{CompilationJob, CompilationRequest, JobId};
use reel_storage::{FolderId, SegmentStore};

use crate::compiler::CompilationEngine;
use crate::config::EngineConfig;
use crate::progress::ProgressSink;
use crate::tracker::{AdmitError, JobTracker};

/// One-compilation-per-user service over a segment store.
pub struct CompilationService {
    engine: Arc<CompilationEngine>,
    tracker: Arc<JobTracker>,
}

impl CompilationService {
    /// Build the service. Encoder binaries are resolved here, once.
    pub fn new(store: Arc<dyn SegmentStore>, config: EngineConfig) -> MediaResult<Self> {
        let encoder = EncoderPaths::resolve()?;
        Ok(Self::with_encoder(store, encoder, config))
    }

    /// Build the service with pre-resolved encoder paths.
    pub fn with_encoder(
        store: Arc<dyn SegmentStore>,
        encoder: EncoderPaths,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine: Arc::new(CompilationEngine::new(store, encoder, config)),
            tracker: Arc::new(JobTracker::new()),
        }
    }

    /// Admit and launch a compilation for a user.
    ///
    /// The caller gets the job id immediately; the run proceeds as a
    /// detached task whose completion handler always lands the terminal
    /// state on the tracker, success or failure.
    pub async fn start_compilation(
        &self,
        user_id: &str,
        folder: &FolderId,
        request: CompilationRequest,
    ) -> Result<JobId, AdmitError> {
        let job_id = self.tracker.admit(user_id, &request).await?;
        info!(user_id, job_id = %job_id, "Compilation admitted");

        let (sink, mut events) = ProgressSink::channel();

        // Latest-event sink: the tracker keeps only the newest line.
        let tracker = Arc::clone(&self.tracker);
        let drain_user = user_id.to_string();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                tracker.set_progress(&drain_user, event.message).await;
            }
        });

        let engine = Arc::clone(&self.engine);
        let tracker = Arc::clone(&self.tracker);
        let run_user = user_id.to_string();
        let folder = folder.clone();
        tokio::spawn(async move {
            match engine.compile(&folder, &request, &sink).await {
                Ok(artifact) => tracker.complete(&run_user, artifact).await,
                Err(err) => {
                    if err.requires_reauth() {
                        // The auth layer watches for this to force re-consent.
                        warn!(user_id = %run_user, "Compilation hit a storage permission failure");
                    }
                    tracker.fail(&run_user, err.to_string()).await;
                }
            }
        });

        Ok(job_id)
    }

    /// Snapshot of the user's current job; `None` means idle.
    pub async fn get_status(&self, user_id: &str) -> Option<CompilationJob> {
        self.tracker.status(user_id).await
    }

    /// Drop the tracked record after the client consumed a terminal result.
    pub async fn clear_status(&self, user_id: &str) {
        self.tracker.clear(user_id).await;
    }
}
