//! Compilation job lifecycle records.
//!
//! One job per user identity at a time; clients poll the tracked record
//! until it reaches a terminal state, then acknowledge it away.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::request::CompilationRequest;

/// Unique identifier for a compilation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a compilation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Admitted, not yet picked up
    #[default]
    Pending,
    /// Compilation in progress
    Running,
    /// Finished; `result` is set
    Completed,
    /// Aborted; `error` is set
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states receive no further updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the client asked for, minus the raw music bytes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RequestSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub has_music: bool,
}

impl From<&CompilationRequest> for RequestSummary {
    fn from(req: &CompilationRequest) -> Self {
        Self {
            start_date: req.start_date,
            end_date: req.end_date,
            has_music: req.music_track.is_some(),
        }
    }
}

/// Reference to the produced compilation video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompilationArtifact {
    /// Handle of the uploaded file in the segment store
    pub remote_id: String,
    /// Filename as uploaded (see `naming::output_name`)
    pub name: String,
    /// Number of daily segments in the compilation
    pub segment_count: u32,
}

/// The tracked lifecycle record of one compilation run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompilationJob {
    /// Unique job ID
    pub id: JobId,
    /// Lifecycle state
    pub status: JobStatus,
    /// Latest human-readable progress line
    pub progress_message: String,
    /// Originating request
    pub request: RequestSummary,
    /// Produced artifact (Completed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CompilationArtifact>,
    /// Failure description (Failed only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Admission timestamp
    pub started_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl CompilationJob {
    /// Create a freshly admitted job.
    pub fn new(request: &CompilationRequest) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            status: JobStatus::Pending,
            progress_message: "Waiting to start...".to_string(),
            request: RequestSummary::from(request),
            result: None,
            error: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Transition to Running.
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.progress_message = "Starting compilation...".to_string();
        self.updated_at = Utc::now();
    }

    /// Record a progress line.
    pub fn set_progress(&mut self, message: impl Into<String>) {
        self.progress_message = message.into();
        self.updated_at = Utc::now();
    }

    /// Transition to Completed with the produced artifact.
    pub fn complete(&mut self, artifact: CompilationArtifact) {
        self.status = JobStatus::Completed;
        self.progress_message = "Compilation complete".to_string();
        self.result = Some(artifact);
        self.updated_at = Utc::now();
    }

    /// Transition to Failed with the error's display string, verbatim.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
