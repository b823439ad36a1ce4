//! Progress events.
//!
//! The engine emits ordered events into a single-consumer channel; the
//! job tracker drains it and keeps only the latest message on the job
//! record. Nothing in the engine knows how progress reaches clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Pipeline stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetching,
    Downloading,
    Normalizing,
    Concatenating,
    Uploading,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::Downloading => "downloading",
            Stage::Normalizing => "normalizing",
            Stage::Concatenating => "concatenating",
            Stage::Uploading => "uploading",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ordered progress update from a compilation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub message: String,
}

/// Sending half of the progress channel, held by the engine.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSink {
    /// Create a connected sink/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit one event. A consumer that has gone away is not an error;
    /// the run keeps going.
    pub fn emit(&self, stage: Stage, message: impl Into<String>) {
        let event = ProgressEvent {
            stage,
            message: message.into(),
        };
        tracing::debug!(stage = %event.stage, "{}", event.message);
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut rx) = ProgressSink::channel();
        sink.emit(Stage::Downloading, "Downloading 1/3...");
        sink.emit(Stage::Downloading, "Downloading 2/3...");
        sink.emit(Stage::Normalizing, "Normalizing 1/3...");

        assert_eq!(rx.recv().await.unwrap().message, "Downloading 1/3...");
        assert_eq!(rx.recv().await.unwrap().message, "Downloading 2/3...");
        let third = rx.recv().await.unwrap();
        assert_eq!(third.stage, Stage::Normalizing);
    }

    #[tokio::test]
    async fn test_emit_survives_dropped_receiver() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        sink.emit(Stage::Done, "Compilation complete");
    }
}
