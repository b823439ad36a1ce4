//! In-process job tracking.
//!
//! One tracked job per user identity. The registry is an explicitly
//! owned object injected into the service (and into tests), not ambient
//! global state. A new submission while a run is in flight is rejected;
//! a terminal record stays visible until the client clears it or a new
//! submission replaces it.

use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use reel_models::{CompilationArtifact, CompilationJob, CompilationRequest, JobId, RequestError};

/// Errors rejecting a submission before any work starts.
#[derive(Debug, Error)]
pub enum AdmitError {
    #[error("a compilation is already running for this user")]
    AlreadyRunning,

    #[error(transparent)]
    InvalidRequest(#[from] RequestError),
}

/// Registry of at most one compilation job per user.
#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: Mutex<HashMap<String, CompilationJob>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new job for a user.
    ///
    /// Rejects while an existing job for the same user is running;
    /// otherwise the previous record (terminal or never started) is
    /// replaced. The new job is registered already in the running state,
    /// ready for the detached run to report into.
    pub async fn admit(
        &self,
        user_id: &str,
        request: &CompilationRequest,
    ) -> Result<JobId, AdmitError> {
        request.validate()?;

        let mut jobs = self.jobs.lock().await;

        if let Some(existing) = jobs.get(user_id) {
            if !existing.is_terminal() {
                return Err(AdmitError::AlreadyRunning);
            }
        }

        let mut job = CompilationJob::new(request);
        job.start();
        let id = job.id.clone();
        debug!(user_id, job_id = %id, "Admitted compilation job");
        jobs.insert(user_id.to_string(), job);
        Ok(id)
    }

    /// Snapshot of the user's current job, if any.
    pub async fn status(&self, user_id: &str) -> Option<CompilationJob> {
        self.jobs.lock().await.get(user_id).cloned()
    }

    /// Drop the tracked record regardless of its state.
    pub async fn clear(&self, user_id: &str) {
        self.jobs.lock().await.remove(user_id);
    }

    /// Record a progress line on a live job. Terminal records and
    /// cleared users are left untouched (late events from a finished
    /// run must not resurrect it).
    pub async fn set_progress(&self, user_id: &str, message: impl Into<String>) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(user_id) {
            if !job.is_terminal() {
                job.set_progress(message);
            }
        }
    }

    /// Mark the user's job completed with its artifact.
    pub async fn complete(&self, user_id: &str, artifact: CompilationArtifact) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(user_id) {
            job.complete(artifact);
        }
    }

    /// Mark the user's job failed with the error message, verbatim.
    pub async fn fail(&self, user_id: &str, error: impl Into<String>) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(user_id) {
            job.fail(error);
        }
    }
}
