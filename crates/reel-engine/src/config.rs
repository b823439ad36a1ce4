//! Engine configuration.

use std::time::Duration;

/// Compilation engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory compilation workspaces are created under
    pub work_dir: String,
    /// Minimum catalog size a request must match
    pub min_clips: usize,
    /// Wall-clock bound for normalizing a single item
    pub normalize_timeout: Duration,
    /// Prefix for compilation output filenames
    pub output_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/reel".to_string(),
            min_clips: 2,
            normalize_timeout: Duration::from_secs(120),
            output_prefix: "reel".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("REEL_WORK_DIR").unwrap_or_else(|_| "/tmp/reel".to_string()),
            min_clips: std::env::var("REEL_MIN_CLIPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            normalize_timeout: Duration::from_secs(
                std::env::var("REEL_NORMALIZE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            output_prefix: std::env::var("REEL_OUTPUT_PREFIX")
                .unwrap_or_else(|_| "reel".to_string()),
        }
    }
}
