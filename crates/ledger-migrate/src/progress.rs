//! Progress events emitted while the workflow runs.
//!
//! Every event is logged through `tracing` and, when a sink is attached,
//! forwarded to it. Sinks are fire-and-forget: they must never block the
//! workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Severity of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A single progress/log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Sink that forwards events into an mpsc channel.
///
/// Events are dropped when the channel is full or closed.
pub struct ChannelSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.try_send(event);
    }
}

/// Handle used by the engine to report progress.
#[derive(Clone, Default)]
pub struct Progress {
    sink: Option<Arc<dyn ProgressSink>>,
}

impl Progress {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Progress that only logs.
    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Severity::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Severity::Success, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Severity::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Severity::Error, message.into());
    }

    fn emit(&self, severity: Severity, message: String) {
        match severity {
            Severity::Info | Severity::Success => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }

        if let Some(sink) = &self.sink {
            sink.emit(ProgressEvent {
                message,
                severity,
                timestamp: Utc::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_receives_events() {
        let (tx, mut rx) = mpsc::channel(8);
        let progress = Progress::new(Arc::new(ChannelSink::new(tx)));

        progress.info("Fetching owners...");
        progress.warning("Skipping unit 12 - owner not found");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.severity, Severity::Info);
        assert_eq!(first.message, "Fetching owners...");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.severity, Severity::Warning);
    }

    #[test]
    fn test_full_channel_does_not_block() {
        let (tx, mut rx) = mpsc::channel(1);
        let progress = Progress::new(Arc::new(ChannelSink::new(tx)));

        progress.info("one");
        progress.info("two");
        progress.error("three");

        assert_eq!(rx.try_recv().unwrap().message, "one");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let progress = Progress::new(Arc::new(ChannelSink::new(tx)));
        progress.success("done");
    }

    #[test]
    fn test_event_serializes_snake_case_severity() {
        let event = ProgressEvent {
            message: "ok".to_string(),
            severity: Severity::Success,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["severity"], "success");
    }
}
