//! Compilation error taxonomy.
//!
//! Every failure inside a run is caught at the engine's top level,
//! recorded verbatim on the job, and never retried automatically.

use chrono::NaiveDate;
use thiserror::Error;

use reel_media::MediaError;
use reel_storage::StorageError;

/// Result type for compilation runs.
pub type CompileResult<T> = Result<T, CompileError>;

/// Catalog construction failures. Raised before any destructive work;
/// the user recovers by adjusting the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no media found in the requested date range")]
    EmptyRange,

    #[error("found {found} clips, need at least {required} to compile")]
    InsufficientClips { found: usize, required: usize },
}

/// Errors that abort a compilation run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("download failed for {name}: {source}")]
    Download {
        name: String,
        source: StorageError,
    },

    #[error("normalization failed for {date}: {source}")]
    Normalization {
        date: NaiveDate,
        source: MediaError,
    },

    #[error("concatenation failed: {0}")]
    Concatenation(MediaError),

    #[error("upload failed: {0}")]
    Upload(StorageError),

    /// Storage rejected our credentials; the caller must re-authenticate.
    #[error("storage permission denied: {0}")]
    Permission(StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Classify a storage failure during the catalog/download phase.
    pub fn from_fetch(name: impl Into<String>, err: StorageError) -> Self {
        if err.is_permission() {
            Self::Permission(err)
        } else {
            Self::Download {
                name: name.into(),
                source: err,
            }
        }
    }

    /// Classify a storage failure during the upload phase.
    pub fn from_upload(err: StorageError) -> Self {
        if err.is_permission() {
            Self::Permission(err)
        } else {
            Self::Upload(err)
        }
    }

    /// True when the auth layer should force re-consent.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, CompileError::Permission(_))
    }
}
