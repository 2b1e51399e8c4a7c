//! Feedback events for audio/visual cues
//!
//! The sink decides how to present an event (a blip, a flash). The core only
//! says which event happened.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackEvent {
    /// A gesture was recognized or a theme was picked
    Select,
    /// Scene changed by swipe
    Hover,
    /// A grab began
    Engage,
    /// The tracker failed
    Error,
}

/// Receiver of feedback events
pub trait FeedbackSink {
    fn notify(&mut self, event: FeedbackEvent);
}

/// Keeps every event, for tests and replay
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<FeedbackEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<FeedbackEvent> {
        std::mem::take(&mut self.events)
    }
}

impl FeedbackSink for RecordingSink {
    fn notify(&mut self, event: FeedbackEvent) {
        self.events.push(event);
    }
}

/// Writes events to the log and nothing else
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn notify(&mut self, event: FeedbackEvent) {
        log::debug!("Feedback: {:?}", event);
    }
}
