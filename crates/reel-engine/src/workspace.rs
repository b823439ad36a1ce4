//! Per-run compilation workspace.
//!
//! Each run owns an exclusive scratch directory with a globally unique
//! random name. Removal is tied to ownership: dropping the workspace
//! deletes the directory and everything in it, on success and on every
//! failure path alike.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Isolated local storage scope for one compilation run.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    raw_dir: PathBuf,
    segment_dir: PathBuf,
}

impl Workspace {
    /// Allocate a fresh workspace under `work_dir`.
    pub fn create(work_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let work_dir = work_dir.as_ref();
        std::fs::create_dir_all(work_dir)?;

        let dir = tempfile::Builder::new().prefix("reel-").tempdir_in(work_dir)?;

        let raw_dir = dir.path().join("raw");
        let segment_dir = dir.path().join("segments");
        std::fs::create_dir(&raw_dir)?;
        std::fs::create_dir(&segment_dir)?;

        debug!("Created workspace {}", dir.path().display());
        Ok(Self {
            dir,
            raw_dir,
            segment_dir,
        })
    }

    /// Workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where raw downloads land (deleted item by item after normalization).
    pub fn raw_path(&self, name: &str) -> PathBuf {
        self.raw_dir.join(name)
    }

    /// Where normalized segments land.
    pub fn segment_path(&self, name: &str) -> PathBuf {
        self.segment_dir.join(name)
    }

    /// Where the uploaded music track is persisted.
    pub fn music_path(&self) -> PathBuf {
        self.dir.path().join("music.track")
    }

    /// Where the assembled output is written before upload.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Tear down explicitly, surfacing removal errors.
    ///
    /// Dropping the workspace removes it as well; this exists so the
    /// success path can log the removal outcome.
    pub fn close(self) -> std::io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Removed workspace {}", path.display());
        Ok(())
    }
}
