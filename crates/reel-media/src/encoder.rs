//! Encoder binary resolution.
//!
//! Paths are resolved once when the service is constructed, not per call.
//! An explicit environment override wins over the `PATH` lookup, which
//! covers deployments that bundle their own ffmpeg build.

use std::path::PathBuf;

use crate::error::{MediaError, MediaResult};

/// Environment override for the ffmpeg binary.
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";
/// Environment override for the ffprobe binary.
pub const FFPROBE_PATH_ENV: &str = "FFPROBE_PATH";

/// Resolved locations of the encoder binaries.
#[derive(Debug, Clone)]
pub struct EncoderPaths {
    /// Path to the ffmpeg binary
    pub ffmpeg: PathBuf,
    /// Path to the ffprobe binary
    pub ffprobe: PathBuf,
}

impl EncoderPaths {
    /// Resolve both binaries, env override first, then `PATH`.
    pub fn resolve() -> MediaResult<Self> {
        let ffmpeg = resolve_binary(FFMPEG_PATH_ENV, "ffmpeg").ok_or(MediaError::FfmpegNotFound)?;
        let ffprobe =
            resolve_binary(FFPROBE_PATH_ENV, "ffprobe").ok_or(MediaError::FfprobeNotFound)?;

        tracing::info!(
            ffmpeg = %ffmpeg.display(),
            ffprobe = %ffprobe.display(),
            "Resolved encoder binaries"
        );

        Ok(Self { ffmpeg, ffprobe })
    }

    /// Build from explicit paths. Used by tests and custom deployments.
    pub fn from_paths(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

fn resolve_binary(env_var: &str, name: &str) -> Option<PathBuf> {
    if let Ok(path) = std::env::var(env_var) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        tracing::warn!(
            "{} points at {} which does not exist, falling back to PATH",
            env_var,
            path.display()
        );
    }
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paths() {
        let paths = EncoderPaths::from_paths("/opt/ffmpeg/ffmpeg", "/opt/ffmpeg/ffprobe");
        assert_eq!(paths.ffmpeg, PathBuf::from("/opt/ffmpeg/ffmpeg"));
        assert_eq!(paths.ffprobe, PathBuf::from("/opt/ffmpeg/ffprobe"));
    }
}
