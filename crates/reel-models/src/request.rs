//! Compilation requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating a request on submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// A request to compile the user's daily captures into one video.
///
/// An unset range means "all history". The music track is raw audio bytes as
/// uploaded by the client; it never appears in status snapshots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilationRequest {
    /// Inclusive range start
    pub start_date: Option<NaiveDate>,
    /// Inclusive range end
    pub end_date: Option<NaiveDate>,
    /// Optional background music to lay over the whole compilation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_track: Option<Vec<u8>>,
}

impl CompilationRequest {
    /// Request covering all history, no music.
    pub fn all_history() -> Self {
        Self::default()
    }

    /// Request for an inclusive date range.
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            music_track: None,
        }
    }

    /// Attach a music track.
    pub fn with_music(mut self, bytes: Vec<u8>) -> Self {
        self.music_track = Some(bytes);
        self
    }

    /// The explicit range, when both bounds are set.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    /// Validate bounds. Must pass before any work is admitted.
    pub fn validate(&self) -> Result<(), RequestError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(RequestError::InvertedRange { start, end });
            }
        }
        Ok(())
    }

    /// True when a date falls inside the requested bounds.
    ///
    /// Half-open requests (only one bound set) clamp on that side only.
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }

    /// True when any date bound was given.
    pub fn has_date_filter(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
