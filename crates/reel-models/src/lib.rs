//! Shared data models for the DayReel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Daily media items and their filename conventions
//! - Compilation requests and job lifecycle records
//! - The fixed segment encoding profile

pub mod encoding;
pub mod job;
pub mod media;
pub mod naming;
pub mod request;

// Re-export common types
pub use encoding::EncodingProfile;
pub use job::{CompilationArtifact, CompilationJob, JobId, JobStatus, RequestSummary};
pub use media::{MediaItem, MediaKind};
pub use naming::{daily_media_name, output_name, parse_daily_media_name, OUTPUT_EXT};
pub use request::{CompilationRequest, RequestError};
